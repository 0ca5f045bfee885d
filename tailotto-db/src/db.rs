use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{Draw, Game, Recommendation};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    game     TEXT NOT NULL,
    term     TEXT NOT NULL,
    date     TEXT NOT NULL,
    num_1    INTEGER NOT NULL,
    num_2    INTEGER NOT NULL,
    num_3    INTEGER NOT NULL,
    num_4    INTEGER NOT NULL,
    num_5    INTEGER NOT NULL,
    num_6    INTEGER,
    special  INTEGER,
    PRIMARY KEY (game, term)
);

CREATE TABLE IF NOT EXISTS recommendations (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    date      TEXT NOT NULL,
    game      TEXT NOT NULL,
    strategy  TEXT NOT NULL,
    num_1     INTEGER NOT NULL,
    num_2     INTEGER NOT NULL,
    num_3     INTEGER NOT NULL,
    num_4     INTEGER NOT NULL,
    num_5     INTEGER NOT NULL,
    num_6     INTEGER,
    special   INTEGER
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("tailotto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let num = |i: usize| draw.numbers.get(i).copied();
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (game, term, date, num_1, num_2, num_3, num_4, num_5, num_6, special)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            draw.game.slug(),
            draw.term,
            draw.date,
            num(0),
            num(1),
            num(2),
            num(3),
            num(4),
            num(5),
            draw.special,
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

/// Historique complet d'un jeu, en ordre chronologique (le plus ancien
/// d'abord). L'appelant prend ainsi un instantané immuable par invocation.
pub fn fetch_draws(conn: &Connection, game: Game) -> Result<Vec<Draw>> {
    let n = game.pick_count();
    let mut stmt = conn.prepare(
        "SELECT term, date, num_1, num_2, num_3, num_4, num_5, num_6, special
         FROM draws WHERE game = ?1 ORDER BY date ASC, term ASC",
    )?;
    let draws = stmt
        .query_map([game.slug()], |row| {
            let mut numbers = Vec::with_capacity(n);
            for i in 0..n {
                numbers.push(row.get::<_, u8>(2 + i)?);
            }
            Ok(Draw {
                game,
                term: row.get(0)?,
                date: row.get(1)?,
                numbers,
                special: row.get::<_, Option<u8>>(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection, game: Game) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE game = ?1",
        [game.slug()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn insert_recommendations(conn: &Connection, recs: &[Recommendation]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO recommendations (date, game, strategy, num_1, num_2, num_3, num_4, num_5, num_6, special)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for rec in recs {
        let num = |i: usize| rec.numbers.get(i).copied();
        stmt.execute(rusqlite::params![
            rec.date,
            rec.game.slug(),
            rec.strategy,
            num(0),
            num(1),
            num(2),
            num(3),
            num(4),
            num(5),
            rec.special,
        ])
        .context("Échec de l'insertion de la recommandation")?;
    }
    Ok(())
}

/// Relit le puits de recommandations d'un jeu, en ordre d'insertion.
pub fn fetch_recommendations(conn: &Connection, game: Game) -> Result<Vec<Recommendation>> {
    let n = game.pick_count();
    let mut stmt = conn.prepare(
        "SELECT date, strategy, num_1, num_2, num_3, num_4, num_5, num_6, special
         FROM recommendations WHERE game = ?1 ORDER BY id ASC",
    )?;
    let recs = stmt
        .query_map([game.slug()], |row| {
            let mut numbers = Vec::with_capacity(n);
            for i in 0..n {
                numbers.push(row.get::<_, u8>(2 + i)?);
            }
            Ok(Recommendation {
                date: row.get(0)?,
                game,
                strategy: row.get(1)?,
                numbers,
                special: row.get::<_, Option<u8>>(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(recs)
}

pub fn count_recommendations(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM recommendations", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(game: Game, term: &str, date: &str, numbers: &[u8]) -> Draw {
        Draw {
            game,
            term: term.to_string(),
            date: date.to_string(),
            numbers: numbers.to_vec(),
            special: game.special_range().map(|_| 1),
        }
    }

    #[test]
    fn test_insert_and_count() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(count_draws(&conn, Game::Lotto649).unwrap(), 0);

        let draw = test_draw(Game::Lotto649, "113001", "2024-01-02", &[1, 5, 9, 14, 30, 49]);
        insert_draw(&conn, &draw).unwrap();
        assert_eq!(count_draws(&conn, Game::Lotto649).unwrap(), 1);
        // Les compteurs sont par jeu.
        assert_eq!(count_draws(&conn, Game::DailyCash).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_term_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let draw = test_draw(Game::Lotto649, "113001", "2024-01-02", &[1, 5, 9, 14, 30, 49]);
        assert!(insert_draw(&conn, &draw).unwrap());
        assert!(!insert_draw(&conn, &draw).unwrap());
        assert_eq!(count_draws(&conn, Game::Lotto649).unwrap(), 1);
    }

    #[test]
    fn test_fetch_ascending_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw(Game::DailyCash, "002", "2024-01-05", &[2, 8, 17, 25, 39])).unwrap();
        insert_draw(&conn, &test_draw(Game::DailyCash, "001", "2024-01-01", &[1, 9, 16, 24, 38])).unwrap();
        insert_draw(&conn, &test_draw(Game::DailyCash, "003", "2024-01-09", &[3, 7, 18, 26, 37])).unwrap();

        let draws = fetch_draws(&conn, Game::DailyCash).unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].date, "2024-01-01");
        assert_eq!(draws[1].date, "2024-01-05");
        assert_eq!(draws[2].date, "2024-01-09");
        assert_eq!(draws[0].numbers.len(), 5);
        assert_eq!(draws[0].special, None);
    }

    #[test]
    fn test_fetch_preserves_special() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let mut draw = test_draw(Game::PowerLotto, "113010", "2024-02-01", &[3, 8, 15, 22, 30, 38]);
        draw.special = Some(5);
        insert_draw(&conn, &draw).unwrap();

        let draws = fetch_draws(&conn, Game::PowerLotto).unwrap();
        assert_eq!(draws[0].numbers, vec![3, 8, 15, 22, 30, 38]);
        assert_eq!(draws[0].special, Some(5));
    }

    #[test]
    fn test_insert_recommendations() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let recs = vec![
            Recommendation {
                date: "2024-03-01".to_string(),
                game: Game::Lotto649,
                strategy: "A".to_string(),
                numbers: vec![2, 9, 14, 21, 33, 45],
                special: Some(7),
            },
            Recommendation {
                date: "2024-03-01".to_string(),
                game: Game::DailyCash,
                strategy: "C".to_string(),
                numbers: vec![4, 11, 20, 27, 36],
                special: None,
            },
        ];
        insert_recommendations(&conn, &recs).unwrap();
        assert_eq!(count_recommendations(&conn).unwrap(), 2);
    }

    #[test]
    fn test_fetch_recommendations_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let recs = vec![
            Recommendation {
                date: "2024-03-01".to_string(),
                game: Game::DailyCash,
                strategy: "A".to_string(),
                numbers: vec![4, 11, 20, 27, 36],
                special: None,
            },
            Recommendation {
                date: "2024-03-01".to_string(),
                game: Game::DailyCash,
                strategy: "B".to_string(),
                numbers: vec![1, 6, 13, 22, 35],
                special: None,
            },
            Recommendation {
                date: "2024-03-01".to_string(),
                game: Game::PowerLotto,
                strategy: "A".to_string(),
                numbers: vec![3, 8, 15, 22, 30, 38],
                special: Some(5),
            },
        ];
        insert_recommendations(&conn, &recs).unwrap();

        // Filtrage par jeu, ordre d'insertion conservé.
        let daily = fetch_recommendations(&conn, Game::DailyCash).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].strategy, "A");
        assert_eq!(daily[0].numbers, vec![4, 11, 20, 27, 36]);
        assert_eq!(daily[0].special, None);
        assert_eq!(daily[1].strategy, "B");

        let power = fetch_recommendations(&conn, Game::PowerLotto).unwrap();
        assert_eq!(power.len(), 1);
        assert_eq!(power[0].numbers.len(), 6);
        assert_eq!(power[0].special, Some(5));
    }
}
