use std::collections::BTreeSet;

use tailotto_db::models::Game;

use crate::profile::FrequencyProfile;

/// Les quatre politiques de sélection nommées. Chacune fixe le bassin de
/// candidats et sa pondération ; l'échantillonnage et la validation sont
/// communs (voir `sampler`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// A : penche vers les numéros chauds et les tirages concentrés.
    Hot,
    /// B : penche vers les froids et le complément des chauds.
    Cold,
    /// C : base neutre, tout le domaine [1, R].
    Balanced,
    /// D : tout le domaine, rejette toute combinaison déjà tirée.
    Novelty,
}

impl Strategy {
    pub fn all() -> [Strategy; 4] {
        [
            Strategy::Hot,
            Strategy::Cold,
            Strategy::Balanced,
            Strategy::Novelty,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Hot => "A",
            Strategy::Cold => "B",
            Strategy::Balanced => "C",
            Strategy::Novelty => "D",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Hot => "numéros chauds et tirages concentrés",
            Strategy::Cold => "numéros froids et délaissés",
            Strategy::Balanced => "base neutre sur tout le domaine",
            Strategy::Novelty => "combinaison jamais tirée",
        }
    }

    /// La stratégie D rejette les répétitions exactes de l'historique.
    pub fn requires_novelty(&self) -> bool {
        matches!(self, Strategy::Novelty)
    }

    /// Bassin de candidats pondéré, trié par numéro croissant (ordre
    /// stable, nécessaire au déterminisme sous graine fixe). Poids =
    /// occurrences historiques, minimum 1 pour les numéros jamais vus.
    ///
    /// `exclude_edges` restreint le bassin à [3, R-2] : règle instable
    /// d'une révision à l'autre de la source, donc jamais implicite.
    pub fn candidate_pool(
        &self,
        profile: &FrequencyProfile,
        game: Game,
        exclude_edges: bool,
    ) -> Vec<(u8, f64)> {
        let r = game.number_range();
        let members: BTreeSet<u8> = match self {
            Strategy::Hot => profile
                .hot
                .iter()
                .copied()
                .chain(profile.focused.iter().copied())
                .collect(),
            Strategy::Cold => profile
                .cold
                .iter()
                .copied()
                .chain((1..=r).filter(|num| !profile.hot.contains(num)))
                .collect(),
            Strategy::Balanced | Strategy::Novelty => (1..=r).collect(),
        };

        members
            .into_iter()
            .filter(|&num| !exclude_edges || (num >= 3 && num <= r - 2))
            .map(|num| (num, profile.count(num).max(1) as f64))
            .collect()
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::analyze;
    use tailotto_db::models::Draw;

    fn history() -> Vec<Draw> {
        let rows: [&[u8]; 6] = [
            &[1, 2, 3, 4, 5, 7],
            &[6, 7, 8, 9, 10, 11],
            &[7, 12, 13, 14, 15, 16],
            &[7, 17, 18, 19, 20, 21],
            &[7, 22, 23, 24, 25, 26],
            &[7, 27, 28, 29, 30, 31],
        ];
        rows.iter()
            .enumerate()
            .map(|(i, numbers)| Draw {
                game: Game::Lotto649,
                term: format!("{:02}", i + 1),
                date: format!("2024-01-{:02}", i + 1),
                numbers: numbers.to_vec(),
                special: None,
            })
            .collect()
    }

    #[test]
    fn test_hot_pool_is_hot_union_focused() {
        let profile = analyze(&history(), Game::Lotto649).unwrap();
        let pool = Strategy::Hot.candidate_pool(&profile, Game::Lotto649, false);
        for &(num, _) in &pool {
            assert!(
                profile.hot.contains(&num) || profile.focused.contains(&num),
                "{} n'est ni chaud ni concentré",
                num
            );
        }
        assert!(pool.iter().any(|&(num, _)| num == 7));
    }

    #[test]
    fn test_cold_pool_excludes_hot() {
        let profile = analyze(&history(), Game::Lotto649).unwrap();
        let pool = Strategy::Cold.candidate_pool(&profile, Game::Lotto649, false);
        assert!(
            pool.iter().all(|&(num, _)| num != 7),
            "le numéro le plus chaud n'a rien à faire dans le bassin froid"
        );
        // Le complément des chauds couvre notamment tous les jamais-vus.
        assert!(pool.iter().any(|&(num, _)| num == 42));
    }

    #[test]
    fn test_balanced_pool_is_full_domain() {
        let profile = analyze(&history(), Game::Lotto649).unwrap();
        let pool = Strategy::Balanced.candidate_pool(&profile, Game::Lotto649, false);
        assert_eq!(pool.len(), 49);
        assert_eq!(pool.first().map(|&(num, _)| num), Some(1));
        assert_eq!(pool.last().map(|&(num, _)| num), Some(49));
    }

    #[test]
    fn test_weights_are_counts_with_floor() {
        let profile = analyze(&history(), Game::Lotto649).unwrap();
        let pool = Strategy::Balanced.candidate_pool(&profile, Game::Lotto649, false);
        let weight = |n: u8| pool.iter().find(|&&(num, _)| num == n).map(|&(_, w)| w);
        assert_eq!(weight(7), Some(6.0));
        assert_eq!(weight(12), Some(1.0));
        // Jamais vu : plancher à 1 pour rester tirable.
        assert_eq!(weight(42), Some(1.0));
    }

    #[test]
    fn test_edge_exclusion_toggle() {
        let profile = analyze(&history(), Game::Lotto649).unwrap();
        let pool = Strategy::Balanced.candidate_pool(&profile, Game::Lotto649, true);
        assert!(pool.iter().all(|&(num, _)| (3..=47).contains(&num)));
        assert_eq!(pool.len(), 45);
    }

    #[test]
    fn test_pool_sorted_ascending() {
        let profile = analyze(&history(), Game::Lotto649).unwrap();
        for strategy in Strategy::all() {
            let pool = strategy.candidate_pool(&profile, Game::Lotto649, false);
            assert!(
                pool.windows(2).all(|w| w[0].0 < w[1].0),
                "bassin {} non trié",
                strategy
            );
        }
    }

    #[test]
    fn test_labels() {
        let labels: Vec<&str> = Strategy::all().iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
    }
}
