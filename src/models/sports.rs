use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HomeAway {
    Home,
    Away,
}

impl HomeAway {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" | "h" | "vs" => Some(Self::Home),
            "away" | "a" | "@" => Some(Self::Away),
            _ => None,
        }
    }
}

/// A game or a meet from the content platform's sports ticker. Meets have a
/// finishing place and no opponent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub opponent: Option<String>,
    pub location: Option<HomeAway>,
    pub scs_score: Option<String>,
    pub opponent_score: Option<String>,
    pub date: String,
    pub place: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub games: Vec<Game>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportsTicker {
    pub id: String,
    pub teams: Vec<Team>,
}
