use std::collections::{BTreeSet, HashSet};

use tailotto_db::models::{Draw, Game};

use crate::error::EngineError;

pub const HOT_COUNT: usize = 10;
pub const COLD_COUNT: usize = 10;
pub const OVERDUE_COUNT: usize = 15;
/// Écart-type (échantillon) en dessous duquel un tirage est dit « concentré ».
pub const FOCUS_STD_THRESHOLD: f64 = 10.0;

/// Profil de fréquences dérivé d'un instantané de l'historique.
/// Éphémère : reconstruit à chaque invocation du moteur, jamais persisté.
#[derive(Debug, Clone)]
pub struct FrequencyProfile {
    /// Occurrences par numéro, indice 0 = numéro 1.
    pub counts: Vec<u32>,
    /// Les 10 numéros les plus fréquents (fréquence décroissante,
    /// égalités départagées par numéro croissant).
    pub hot: Vec<u8>,
    /// Les 10 numéros les moins fréquents (même classement, queue basse).
    pub cold: Vec<u8>,
    /// Les 15 numéros au plus long retard (0 = sorti au dernier tirage,
    /// jamais vu = longueur de l'historique).
    pub overdue: Vec<u8>,
    /// Numéros des tirages « concentrés » (écart-type < seuil).
    pub focused: BTreeSet<u8>,
    /// Combinaisons historiques, triées, pour le rejet de répétition exacte.
    pub past_combos: HashSet<Vec<u8>>,
    /// Occurrences des numéros spéciaux, `None` sans donnée historique.
    pub special_counts: Option<Vec<u32>>,
    /// Moyenne et écart-type des moyennes par tirage (règle de somme optionnelle).
    pub mean_of_means: f64,
    pub std_of_means: f64,
}

impl FrequencyProfile {
    pub fn count(&self, number: u8) -> u32 {
        self.counts
            .get((number as usize).wrapping_sub(1))
            .copied()
            .unwrap_or(0)
    }
}

/// Analyse l'historique d'un jeu. Fonction pure de l'instantané : aucune
/// mutation, aucun effet de bord.
pub fn analyze(draws: &[Draw], game: Game) -> Result<FrequencyProfile, EngineError> {
    let n = game.pick_count();
    let r = game.number_range() as usize;

    for draw in draws {
        if draw.numbers.len() != n {
            return Err(EngineError::Configuration(format!(
                "tirage {} : {} numéros au lieu de {}",
                draw.term,
                draw.numbers.len(),
                n
            )));
        }
        if draw.numbers.iter().any(|&num| num < 1 || num as usize > r) {
            return Err(EngineError::Configuration(format!(
                "tirage {} : numéro hors de [1, {}]",
                draw.term, r
            )));
        }
    }

    if draws.is_empty() {
        return Err(EngineError::InsufficientData);
    }

    let mut counts = vec![0u32; r];
    for draw in draws {
        for &num in &draw.numbers {
            counts[(num - 1) as usize] += 1;
        }
    }

    // Classement commun chauds/froids sur tout le domaine [1, R]
    // (numéros jamais sortis comptés à 0), égalités par numéro croissant.
    let mut by_count_desc: Vec<u8> = (1..=r as u8).collect();
    by_count_desc.sort_by(|&a, &b| {
        counts[(b - 1) as usize]
            .cmp(&counts[(a - 1) as usize])
            .then(a.cmp(&b))
    });
    let hot: Vec<u8> = by_count_desc.iter().copied().take(HOT_COUNT).collect();

    let mut by_count_asc: Vec<u8> = (1..=r as u8).collect();
    by_count_asc.sort_by(|&a, &b| {
        counts[(a - 1) as usize]
            .cmp(&counts[(b - 1) as usize])
            .then(a.cmp(&b))
    });
    let cold: Vec<u8> = by_count_asc.iter().copied().take(COLD_COUNT).collect();

    // Retards : balayage du plus récent au plus ancien.
    let mut last_seen: Vec<Option<u32>> = vec![None; r];
    for (gap, draw) in draws.iter().rev().enumerate() {
        for &num in &draw.numbers {
            let idx = (num - 1) as usize;
            if last_seen[idx].is_none() {
                last_seen[idx] = Some(gap as u32);
            }
        }
    }
    let gap_of = |num: u8| last_seen[(num - 1) as usize].unwrap_or(draws.len() as u32);
    let mut by_gap: Vec<u8> = (1..=r as u8).collect();
    by_gap.sort_by(|&a, &b| gap_of(b).cmp(&gap_of(a)).then(a.cmp(&b)));
    let overdue: Vec<u8> = by_gap.iter().copied().take(OVERDUE_COUNT).collect();

    let mut focused = BTreeSet::new();
    let mut means = Vec::with_capacity(draws.len());
    for draw in draws {
        let values: Vec<f64> = draw.numbers.iter().map(|&num| num as f64).collect();
        means.push(mean(&values));
        if sample_std(&values) < FOCUS_STD_THRESHOLD {
            focused.extend(draw.numbers.iter().copied());
        }
    }

    let past_combos: HashSet<Vec<u8>> = draws
        .iter()
        .map(|draw| {
            let mut combo = draw.numbers.clone();
            combo.sort_unstable();
            combo
        })
        .collect();

    let special_counts = game.special_range().and_then(|s| {
        let mut tally = vec![0u32; s as usize];
        let mut seen = false;
        for draw in draws {
            if let Some(sp) = draw.special {
                if (1..=s).contains(&sp) {
                    tally[(sp - 1) as usize] += 1;
                    seen = true;
                }
            }
        }
        seen.then_some(tally)
    });

    let mean_of_means = mean(&means);
    let std_of_means = sample_std(&means);

    Ok(FrequencyProfile {
        counts,
        hot,
        cold,
        overdue,
        focused,
        past_combos,
        special_counts,
        mean_of_means,
        std_of_means,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Écart-type d'échantillon (dénominateur n-1).
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
