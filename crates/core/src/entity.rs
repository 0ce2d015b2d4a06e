use serde::{Deserialize, Serialize};

use crate::error::ScoutError;

pub type TeamId = String;
pub type PlayerId = String;
pub type MapId = String;

/// Game title a telemetry log was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Title {
    Valorant,
    Cs2,
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Title::Valorant => write!(f, "valorant"),
            Title::Cs2 => write!(f, "cs2"),
        }
    }
}

impl std::str::FromStr for Title {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "valorant" | "val" => Ok(Title::Valorant),
            "cs2" | "csgo" | "counter-strike" => Ok(Title::Cs2),
            other => Err(ScoutError::UnknownTitle(other.to_string())),
        }
    }
}

/// Role a team holds for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    /// Parse a provider side string. Valorant reports `attacker`/`defender`,
    /// CS2 reports `terrorists`/`counter-terrorists`.
    pub fn from_provider(raw: &str) -> Option<Side> {
        match raw.to_ascii_lowercase().as_str() {
            "attacker" | "attackers" | "attacking" | "terrorists" | "terrorist" | "t" => {
                Some(Side::Attacker)
            }
            "defender" | "defenders" | "defending" | "counter-terrorists"
            | "counter-terrorist" | "counterterrorists" | "ct" => Some(Side::Defender),
            _ => None,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Attacker => write!(f, "attacker"),
            Side::Defender => write!(f, "defender"),
        }
    }
}

/// One step of the map veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VetoKind {
    Ban,
    Pick,
    Decider,
}

/// How a round was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinType {
    Elimination,
    Detonate,
    Defuse,
    Time,
}
