use tailotto_db::models::{validate_draw, Draw, Game};

use crate::error::EngineError;

/// Ligne brute telle que fournie par la source d'historique : date, numéro
/// de période, puis les colonnes numériques sous forme de chaînes
/// (num1..numN, suivies du spécial si le jeu en déclare un).
#[derive(Debug, Clone)]
pub struct RawRow {
    pub date: String,
    pub term: String,
    pub fields: Vec<String>,
}

/// Filtre tolérant : une ligne est conservée si et seulement si ses N
/// colonnes principales se parsent en entiers distincts dans [1, R]. Les
/// lignes illisibles sont abandonnées en silence (qualité de données, pas
/// une erreur). Un spécial illisible ou hors bornes ne coûte que le
/// spécial, jamais la ligne.
///
/// Erreur de configuration si la table ne peut structurellement pas
/// contenir N colonnes principales.
pub fn filter_rows(rows: &[RawRow], game: Game) -> Result<Vec<Draw>, EngineError> {
    let n = game.pick_count();

    let max_width = rows.iter().map(|r| r.fields.len()).max().unwrap_or(n);
    if max_width < n {
        return Err(EngineError::Configuration(format!(
            "{} attend {} colonnes de numéros, la table n'en fournit que {}",
            game, n, max_width
        )));
    }

    let draws = rows
        .iter()
        .filter_map(|row| parse_row(row, game))
        .collect();
    Ok(draws)
}

fn parse_row(row: &RawRow, game: Game) -> Option<Draw> {
    let n = game.pick_count();
    if row.fields.len() < n {
        return None;
    }

    let mut numbers = Vec::with_capacity(n);
    for field in &row.fields[..n] {
        numbers.push(field.trim().parse::<u8>().ok()?);
    }
    if validate_draw(game, &numbers, None).is_err() {
        return None;
    }

    let special = if game.has_special() {
        row.fields
            .get(n)
            .and_then(|f| f.trim().parse::<u8>().ok())
            .filter(|&sp| validate_draw(game, &numbers, Some(sp)).is_ok())
    } else {
        None
    };

    Some(Draw {
        game,
        term: row.term.clone(),
        date: row.date.clone(),
        numbers,
        special,
    })
}
