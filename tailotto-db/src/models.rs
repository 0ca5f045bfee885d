use anyhow::{bail, Result};
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    Lotto649,
    PowerLotto,
    DailyCash,
}

impl Game {
    pub fn all() -> [Game; 3] {
        [Game::Lotto649, Game::PowerLotto, Game::DailyCash]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Game::Lotto649 => "Lotto 6/49",
            Game::PowerLotto => "Power Lotto",
            Game::DailyCash => "Daily Cash",
        }
    }

    /// Identifiant stable (clé en base, valeur CLI).
    pub fn slug(&self) -> &'static str {
        match self {
            Game::Lotto649 => "lotto649",
            Game::PowerLotto => "powerlotto",
            Game::DailyCash => "dailycash",
        }
    }

    pub fn from_slug(s: &str) -> Option<Game> {
        match s {
            "lotto649" => Some(Game::Lotto649),
            "powerlotto" => Some(Game::PowerLotto),
            "dailycash" => Some(Game::DailyCash),
            _ => None,
        }
    }

    /// Nombre de numéros principaux tirés (N).
    pub fn pick_count(&self) -> usize {
        match self {
            Game::Lotto649 => 6,
            Game::PowerLotto => 6,
            Game::DailyCash => 5,
        }
    }

    /// Borne supérieure des numéros principaux (R), tirage dans [1, R].
    pub fn number_range(&self) -> u8 {
        match self {
            Game::Lotto649 => 49,
            Game::PowerLotto => 38,
            Game::DailyCash => 39,
        }
    }

    /// Borne supérieure du numéro spécial (S), `None` si le jeu n'en a pas.
    /// Le champ est explicite : la présence d'une colonne spéciale ne se
    /// déduit jamais de la largeur des lignes.
    pub fn special_range(&self) -> Option<u8> {
        match self {
            Game::Lotto649 => Some(49),
            Game::PowerLotto => Some(8),
            Game::DailyCash => None,
        }
    }

    pub fn has_special(&self) -> bool {
        self.special_range().is_some()
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl Serialize for Game {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

#[derive(Debug, Clone)]
pub struct Draw {
    pub game: Game,
    pub term: String,
    pub date: String,
    pub numbers: Vec<u8>,
    pub special: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub date: String,
    pub game: Game,
    pub strategy: String,
    pub numbers: Vec<u8>,
    pub special: Option<u8>,
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Recommendation", 5)?;
        s.serialize_field("date", &self.date)?;
        s.serialize_field("game", &self.game)?;
        s.serialize_field("strategy", &self.strategy)?;
        s.serialize_field("numbers", &self.numbers)?;
        s.serialize_field("special", &self.special)?;
        s.end()
    }
}

pub fn validate_draw(game: Game, numbers: &[u8], special: Option<u8>) -> Result<()> {
    let n = game.pick_count();
    let r = game.number_range();

    if numbers.len() != n {
        bail!("Attendu {} numéros pour {}, reçu {}", n, game, numbers.len());
    }
    for &num in numbers {
        if num < 1 || num > r {
            bail!("Numéro {} hors limites (1-{})", num, r);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    match (special, game.special_range()) {
        (Some(sp), Some(s)) => {
            if sp < 1 || sp > s {
                bail!("Numéro spécial {} hors limites (1-{})", sp, s);
            }
        }
        (Some(sp), None) => {
            bail!("{} n'a pas de numéro spécial (reçu {})", game, sp);
        }
        (None, _) => {}
    }
    Ok(())
}
