use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use tailotto_db::db::insert_draw;
use tailotto_db::models::Game;
use tailotto_db::rusqlite::Connection;
use tailotto_engine::ingest::{filter_rows, RawRow};

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    /// Lignes abandonnées par le filtre tolérant (colonnes illisibles).
    pub dropped: u32,
    pub errors: u32,
}

/// Normalise "AAAA/MM/JJ" vers la forme stockée "AAAA-MM-JJ".
pub fn parse_date(raw: &str) -> Result<String> {
    let parts: Vec<&str> = raw.trim().split(['/', '-']).collect();
    if parts.len() != 3 || parts[0].len() != 4 {
        bail!("Format de date invalide : '{}'", raw);
    }
    Ok(format!("{}-{:0>2}-{:0>2}", parts[0], parts[1], parts[2]))
}

/// Importe un CSV `date,term,num1..numN[,special]` pour un jeu donné.
/// Les colonnes numériques passent par le filtre tolérant du moteur :
/// une ligne illisible est comptée puis oubliée, jamais fatale.
pub fn import_csv(conn: &Connection, game: Game, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        dropped: 0,
        errors: 0,
    };

    let mut rows = Vec::new();
    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match record_to_row(&record) {
                Some(row) => rows.push(row),
                None => result.dropped += 1,
            },
            Err(e) => {
                eprintln!("Erreur lecture ligne {} : {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    let draws = filter_rows(&rows, game)
        .with_context(|| format!("Table incompatible avec {}", game))?;
    result.dropped += (rows.len() - draws.len()) as u32;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let bar = ProgressBar::new(draws.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} tirages")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for draw in &draws {
        match insert_draw(&tx, draw) {
            Ok(true) => result.inserted += 1,
            Ok(false) => result.skipped += 1,
            Err(e) => {
                eprintln!("Erreur insertion période {} : {}", draw.term, e);
                result.errors += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

fn record_to_row(record: &csv::StringRecord) -> Option<RawRow> {
    let date_raw = record.get(0)?.trim();
    let term = record.get(1)?.trim();
    if term.is_empty() {
        return None;
    }
    let date = parse_date(date_raw).ok()?;
    let fields = record
        .iter()
        .skip(2)
        .map(|f| f.trim().to_string())
        .collect();
    Some(RawRow {
        date,
        term: term.to_string(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailotto_db::db::{count_draws, fetch_draws, migrate};

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024/01/02").unwrap(), "2024-01-02");
        assert_eq!(parse_date("2024-1-2").unwrap(), "2024-01-02");
        assert!(parse_date("02/01/2024").is_err());
        assert!(parse_date("pas une date").is_err());
    }

    #[test]
    fn test_import_csv_lenient() {
        let dir = std::env::temp_dir().join("tailotto_test_import");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lotto649.csv");
        std::fs::write(
            &path,
            "date,term,num1,num2,num3,num4,num5,num6,special\n\
             2024/01/02,113001,1,5,9,14,30,49,7\n\
             2024/01/05,113002,2,8,dix-sept,25,33,41,12\n\
             2024/01/09,113003,3,10,19,26,34,42,1\n\
             2024/01/09,113003,3,10,19,26,34,42,1\n",
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let result = import_csv(&conn, Game::Lotto649, &path).unwrap();

        assert_eq!(result.total_records, 4);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, 1, "doublon de période ignoré");
        assert_eq!(result.dropped, 1, "ligne illisible abandonnée");
        assert_eq!(result.errors, 0);
        assert_eq!(count_draws(&conn, Game::Lotto649).unwrap(), 2);

        let draws = fetch_draws(&conn, Game::Lotto649).unwrap();
        assert_eq!(draws[0].date, "2024-01-02");
        assert_eq!(draws[0].special, Some(7));
    }
}
