use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::Rng;

use tailotto_db::models::Game;

use crate::profile::FrequencyProfile;
use crate::strategy::Strategy;

/// Budget d'essais du chemin pondéré-validé avant repli uniforme.
pub const MAX_ATTEMPTS: u32 = 5000;

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub max_attempts: u32,
    /// Restreint les bassins à [3, R-2] (voir `Strategy::candidate_pool`).
    pub exclude_edges: bool,
    /// Exige que la moyenne de la combinaison tombe dans la bande
    /// moyenne ± écart-type des moyennes historiques.
    pub enforce_sum_band: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            max_attempts: MAX_ATTEMPTS,
            exclude_edges: false,
            enforce_sum_band: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    /// N numéros distincts, triés croissants.
    pub numbers: Vec<u8>,
    pub special: Option<u8>,
}

/// Tire une combinaison pour une stratégie donnée. N'échoue jamais : si le
/// bassin est inutilisable ou le budget épuisé, le repli uniforme (non
/// validé, toujours terminant) prend le relais.
pub fn sample(
    profile: &FrequencyProfile,
    strategy: Strategy,
    game: Game,
    cfg: &SamplerConfig,
    rng: &mut StdRng,
) -> Pick {
    let n = game.pick_count();
    let r = game.number_range();

    let pool = strategy.candidate_pool(profile, game, cfg.exclude_edges);
    let numbers = sample_constrained(&pool, profile, strategy, n, cfg, rng)
        .unwrap_or_else(|| uniform_pick(n, r, rng));

    let special = game
        .special_range()
        .map(|s| pick_special(&numbers, s, profile.special_counts.as_deref(), rng));

    Pick { numbers, special }
}

fn sample_constrained(
    pool: &[(u8, f64)],
    profile: &FrequencyProfile,
    strategy: Strategy,
    n: usize,
    cfg: &SamplerConfig,
    rng: &mut StdRng,
) -> Option<Vec<u8>> {
    if pool.len() < n {
        return None;
    }

    for _ in 0..cfg.max_attempts {
        let mut numbers = weighted_pick(pool, n, rng)?;
        numbers.sort_unstable();

        if !is_valid_combination(&numbers, n) {
            continue;
        }
        if strategy.requires_novelty() && profile.past_combos.contains(&numbers) {
            continue;
        }
        if cfg.enforce_sum_band && !within_sum_band(&numbers, profile) {
            continue;
        }
        return Some(numbers);
    }
    None
}

/// Tirage pondéré sans remise : à chaque étape, `WeightedIndex` sur les
/// candidats restants puis retrait du numéro choisi.
fn weighted_pick(pool: &[(u8, f64)], n: usize, rng: &mut StdRng) -> Option<Vec<u8>> {
    let mut available = pool.to_vec();
    let mut selected = Vec::with_capacity(n);

    for _ in 0..n {
        let weights: Vec<f64> = available.iter().map(|&(_, w)| w).collect();
        let dist = WeightedIndex::new(&weights).ok()?;
        let idx = dist.sample(rng);
        let (number, _) = available.remove(idx);
        selected.push(number);
    }
    Some(selected)
}

/// Règles combinatoires communes : pas de suite de trois entiers
/// consécutifs (une paire est tolérée), et un compte d'impairs dans
/// [2, N-2].
pub fn is_valid_combination(sorted: &[u8], n: usize) -> bool {
    for w in sorted.windows(3) {
        if w[1] == w[0] + 1 && w[2] == w[1] + 1 {
            return false;
        }
    }
    let odd = sorted.iter().filter(|&&num| num % 2 == 1).count();
    odd >= 2 && odd + 2 <= n
}

fn within_sum_band(sorted: &[u8], profile: &FrequencyProfile) -> bool {
    let mean = sorted.iter().map(|&num| num as f64).sum::<f64>() / sorted.len() as f64;
    let lo = profile.mean_of_means - profile.std_of_means;
    let hi = profile.mean_of_means + profile.std_of_means;
    (lo..=hi).contains(&mean)
}

/// Dernier recours documenté : N numéros distincts uniformes dans [1, R],
/// sans validation. Termine toujours.
pub fn uniform_pick(n: usize, range: u8, rng: &mut StdRng) -> Vec<u8> {
    let mut numbers: Vec<u8> = rand::seq::index::sample(rng, range as usize, n)
        .into_iter()
        .map(|idx| (idx + 1) as u8)
        .collect();
    numbers.sort_unstable();
    numbers
}

/// Choix du numéro spécial dans [1, S] : on écarte les valeurs déjà prises
/// par les numéros principaux tant qu'il reste un candidat ; avec un
/// historique de spéciaux, on préfère les candidats à distance ≥ 2 de tout
/// numéro principal, pondérés par leurs occurrences ; sans historique,
/// tirage uniforme.
pub fn pick_special(
    main_numbers: &[u8],
    special_range: u8,
    special_counts: Option<&[u32]>,
    rng: &mut StdRng,
) -> u8 {
    let mut eligible: Vec<u8> = (1..=special_range)
        .filter(|num| !main_numbers.contains(num))
        .collect();
    if eligible.is_empty() {
        eligible = (1..=special_range).collect();
    }

    match special_counts {
        Some(counts) => {
            let distant: Vec<u8> = eligible
                .iter()
                .copied()
                .filter(|&num| {
                    main_numbers
                        .iter()
                        .all(|&m| (num as i16 - m as i16).abs() >= 2)
                })
                .collect();
            let candidates = if distant.is_empty() { eligible } else { distant };
            let weights: Vec<f64> = candidates
                .iter()
                .map(|&num| counts.get((num - 1) as usize).copied().unwrap_or(0).max(1) as f64)
                .collect();
            match WeightedIndex::new(&weights) {
                Ok(dist) => candidates[dist.sample(rng)],
                Err(_) => candidates[rng.random_range(0..candidates.len())],
            }
        }
        None => eligible[rng.random_range(0..eligible.len())],
    }
}
