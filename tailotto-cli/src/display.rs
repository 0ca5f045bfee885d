use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use tailotto_db::models::{Draw, Game};
use tailotto_engine::profile::FrequencyProfile;
use tailotto_engine::{GameReport, Strategy};

fn numbers_join(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|num| format!("{:2}", num))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Période", "Numéros", "Spécial"]);

    for draw in draws {
        let mut sorted = draw.numbers.clone();
        sorted.sort_unstable();
        let special = match draw.special {
            Some(sp) => format!("{:2}", sp),
            None => "—".to_string(),
        };
        table.add_row(vec![&draw.date, &draw.term, &numbers_join(&sorted), &special]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    println!("  Lignes illisibles : {}", result.dropped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_profile(game: Game, profile: &FrequencyProfile, draw_count: usize) {
    println!(
        "\n📊 {} — profil de fréquences sur {} tirages\n",
        game, draw_count
    );

    println!("── Numéros chauds (top 10) ──");
    display_count_table(profile, &profile.hot);

    println!("\n── Numéros froids (queue 10) ──");
    display_count_table(profile, &profile.cold);

    println!("\n── Retards (top 15) ──");
    println!("{}", numbers_join(&profile.overdue));

    let focused: Vec<u8> = profile.focused.iter().copied().collect();
    println!("\n── Bassin concentré (écart-type < 10) ──");
    if focused.is_empty() {
        println!("(vide)");
    } else {
        println!("{}", numbers_join(&focused));
    }
}

fn display_count_table(profile: &FrequencyProfile, numbers: &[u8]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Fréquence"]);

    for &num in numbers {
        table.add_row(vec![
            Cell::new(format!("{:2}", num)),
            Cell::new(profile.count(num).to_string()),
        ]);
    }
    println!("{table}");
}

pub fn display_reports(reports: &[GameReport]) {
    println!("\n🎲 Recommandations\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Jeu", "Stratégie", "Numéros", "Spécial"]);

    for report in reports {
        for rec in &report.recommendations {
            let description = Strategy::all()
                .iter()
                .find(|s| s.label() == rec.strategy)
                .map(|s| s.description())
                .unwrap_or("");
            let strategy_cell = format!("{} ({})", rec.strategy, description);
            let special = match rec.special {
                Some(sp) => format!("{:2}", sp),
                None => "—".to_string(),
            };
            let game_cell = if report.degraded {
                Cell::new(format!("{} (repli uniforme)", report.game)).fg(Color::Yellow)
            } else {
                Cell::new(report.game.to_string())
            };
            table.add_row(vec![
                game_cell,
                Cell::new(strategy_cell),
                Cell::new(numbers_join(&rec.numbers)),
                Cell::new(special),
            ]);
        }
    }
    println!("{table}");
}
