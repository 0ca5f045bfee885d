mod display;
mod import;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use tailotto_db::db::{
    count_draws, db_path, fetch_draws, insert_recommendations, migrate, open_db,
};
use tailotto_db::models::{Draw, Game, Recommendation};
use tailotto_db::rusqlite::Connection;
use tailotto_engine::{profile, rng_from_seed, SamplerConfig, Strategy};

use crate::display::{display_draws, display_import_summary, display_profile, display_reports};

#[derive(Parser)]
#[command(name = "tailotto", about = "Recommandations statistiques pour les loteries taïwanaises")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer l'historique d'un jeu depuis un fichier CSV
    Import {
        /// Jeu cible (lotto649, powerlotto, dailycash)
        #[arg(short, long)]
        game: String,

        /// Chemin vers le fichier CSV (date,term,num1..numN[,special])
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages d'un jeu
    List {
        /// Jeu (lotto649, powerlotto, dailycash)
        #[arg(short, long)]
        game: String,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Afficher le profil de fréquences d'un jeu
    Stats {
        /// Jeu (lotto649, powerlotto, dailycash)
        #[arg(short, long)]
        game: String,

        /// Limiter l'analyse aux N tirages les plus récents (défaut : tout)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Produire les recommandations (une par stratégie et par jeu)
    Recommend {
        /// Limiter à un seul jeu (défaut : les trois)
        #[arg(short, long)]
        game: Option<String>,

        /// Graine pour la reproductibilité (défaut : date du jour YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,

        /// Restreindre les bassins de candidats à [3, R-2]
        #[arg(long)]
        exclude_edges: bool,

        /// Exiger la bande de somme historique (moyenne ± écart-type)
        #[arg(long)]
        sum_band: bool,

        /// Sortie JSON plutôt que tableau
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { game, file } => cmd_import(&conn, parse_game(&game)?, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { game, last } => cmd_list(&conn, parse_game(&game)?, last),
        Command::Stats { game, window } => cmd_stats(&conn, parse_game(&game)?, window),
        Command::Recommend {
            game,
            seed,
            exclude_edges,
            sum_band,
            json,
        } => {
            let games = match game {
                Some(g) => vec![parse_game(&g)?],
                None => Game::all().to_vec(),
            };
            cmd_recommend(&conn, &games, seed, exclude_edges, sum_band, json)
        }
    }
}

fn parse_game(slug: &str) -> Result<Game> {
    match Game::from_slug(slug) {
        Some(game) => Ok(game),
        None => bail!(
            "Jeu inconnu : '{}' (attendu : lotto649, powerlotto ou dailycash)",
            slug
        ),
    }
}

fn cmd_import(conn: &Connection, game: Game, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, game, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, game: Game, last: usize) -> Result<()> {
    let draws = fetch_draws(conn, game)?;
    if draws.is_empty() {
        println!("Base vide pour {}. Lancez d'abord : tailotto import", game);
        return Ok(());
    }
    let start = draws.len().saturating_sub(last);
    display_draws(&draws[start..]);
    Ok(())
}

fn cmd_stats(conn: &Connection, game: Game, window: Option<usize>) -> Result<()> {
    let n = count_draws(conn, game)?;
    if n == 0 {
        println!("Base vide pour {}. Lancez d'abord : tailotto import", game);
        return Ok(());
    }
    let draws = fetch_draws(conn, game)?;
    let window = recent_window(&draws, window);
    let profile = profile::analyze(window, game)
        .with_context(|| format!("Analyse impossible pour {}", game))?;
    display_profile(game, &profile, window.len());
    Ok(())
}

/// Les `window` tirages les plus récents (l'historique est trié en ordre
/// chronologique ascendant). `None` couvre tout l'historique.
fn recent_window(draws: &[Draw], window: Option<usize>) -> &[Draw] {
    match window {
        Some(n) => &draws[draws.len().saturating_sub(n)..],
        None => draws,
    }
}

/// Traite les jeux séquentiellement, chacun sur son propre instantané.
/// Une erreur de configuration ne condamne que son jeu ; le reste du lot
/// continue.
fn cmd_recommend(
    conn: &Connection,
    games: &[Game],
    seed: Option<u64>,
    exclude_edges: bool,
    sum_band: bool,
    json: bool,
) -> Result<()> {
    let cfg = SamplerConfig {
        exclude_edges,
        enforce_sum_band: sum_band,
        ..SamplerConfig::default()
    };
    let mut rng = rng_from_seed(seed);
    let mut reports = Vec::new();

    for &game in games {
        let draws = fetch_draws(conn, game)?;
        match tailotto_engine::recommend(&draws, game, &Strategy::all(), &cfg, &mut rng) {
            Ok(report) => {
                if report.degraded {
                    eprintln!("⚠️  {} : historique insuffisant, repli uniforme.", game);
                }
                insert_recommendations(conn, &report.recommendations)?;
                reports.push(report);
            }
            Err(err) => {
                // EngineError::Configuration : fatal pour ce jeu seulement.
                eprintln!("❌ {} ignoré : {}", game, err);
            }
        }
    }

    if json {
        let data: Vec<&Recommendation> = reports
            .iter()
            .flat_map(|r| r.recommendations.iter())
            .collect();
        let out = serde_json::json!({ "status": "ok", "data": data });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        display_reports(&reports);
    }
    Ok(())
}
