pub mod error;
pub mod ingest;
pub mod profile;
pub mod sampler;
pub mod strategy;

use chrono::Datelike;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tailotto_db::models::{Draw, Game, Recommendation};

pub use error::EngineError;
pub use sampler::{Pick, SamplerConfig};
pub use strategy::Strategy;

/// Recommandations d'un jeu pour une invocation. `degraded` signale que
/// l'historique était inexploitable et que le repli uniforme a servi ;
/// c'est à la couche opérationnelle d'en rendre compte, pas au cœur.
#[derive(Debug, Clone)]
pub struct GameReport {
    pub game: Game,
    pub recommendations: Vec<Recommendation>,
    pub degraded: bool,
}

/// Graine déterministe basée sur la date du jour (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

pub fn today_string() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(date_seed))
}

/// Pipeline complet d'un jeu : analyse de l'instantané puis une
/// combinaison par stratégie. Un historique insuffisant dégrade en repli
/// uniforme (jamais d'échec) ; seule une configuration incohérente avec la
/// table remonte, et elle ne condamne que ce jeu.
pub fn recommend(
    draws: &[Draw],
    game: Game,
    strategies: &[Strategy],
    cfg: &SamplerConfig,
    rng: &mut StdRng,
) -> Result<GameReport, EngineError> {
    let date = today_string();

    match profile::analyze(draws, game) {
        Ok(profile) => {
            let recommendations = strategies
                .iter()
                .map(|&strategy| {
                    let pick = sampler::sample(&profile, strategy, game, cfg, rng);
                    to_recommendation(&date, game, strategy, pick)
                })
                .collect();
            Ok(GameReport {
                game,
                recommendations,
                degraded: false,
            })
        }
        Err(EngineError::InsufficientData) => {
            let n = game.pick_count();
            let r = game.number_range();
            let recommendations = strategies
                .iter()
                .map(|&strategy| {
                    let numbers = sampler::uniform_pick(n, r, rng);
                    let special = game
                        .special_range()
                        .map(|s| sampler::pick_special(&numbers, s, None, rng));
                    to_recommendation(&date, game, strategy, Pick { numbers, special })
                })
                .collect();
            Ok(GameReport {
                game,
                recommendations,
                degraded: true,
            })
        }
        Err(err) => Err(err),
    }
}

fn to_recommendation(date: &str, game: Game, strategy: Strategy, pick: Pick) -> Recommendation {
    Recommendation {
        date: date.to_string(),
        game,
        strategy: strategy.label().to_string(),
        numbers: pick.numbers,
        special: pick.special,
    }
}
