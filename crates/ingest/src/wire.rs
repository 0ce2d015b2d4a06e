//! Provider wire shapes for one log line.
//!
//! Every field the provider may omit is optional or defaulted; the decoder
//! only rejects lines missing `occurredAt`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Upper bound on one inventory entry's quantity; larger values are clamped.
pub const MAX_ITEM_QUANTITY: u32 = 16;

/// One decoded log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBatch {
    #[serde(default)]
    pub id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// One state change as the provider emits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub actor: Option<EntityRef>,
    #[serde(default)]
    pub target: Option<EntityRef>,
    #[serde(default)]
    pub series_state: Option<SeriesState>,
}

impl RawEvent {
    pub fn actor_id(&self) -> Option<&str> {
        self.actor.as_ref().map(|a| a.id.as_str()).filter(|s| !s.is_empty())
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.id.as_str()).filter(|s| !s.is_empty())
    }
}

/// Actor or target of an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub state: Option<Value>,
    #[serde(default)]
    pub state_delta: Option<Value>,
}

impl EntityRef {
    /// String field from the delta, falling back to the full state.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.state_delta
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .or_else(|| self.state.as_ref().and_then(|v| v.get(key)).and_then(Value::as_str))
    }

    pub fn u32_field(&self, key: &str) -> Option<u32> {
        self.state_delta
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_u64)
            .or_else(|| self.state.as_ref().and_then(|v| v.get(key)).and_then(Value::as_u64))
            .and_then(|n| u32::try_from(n).ok())
    }
}

/// Full series snapshot embedded in an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesState {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub teams: Vec<SeriesTeam>,
    #[serde(default)]
    pub games: Vec<GameState>,
}

impl SeriesState {
    /// The game in progress: last started game, else the last listed game.
    pub fn current_game(&self) -> Option<&GameState> {
        self.games
            .iter()
            .rev()
            .find(|g| g.started)
            .or_else(|| self.games.last())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTeam {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<u32>,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub map: Option<MapRef>,
    #[serde(default)]
    pub teams: Vec<TeamState>,
}

impl GameState {
    pub fn map_id(&self) -> Option<&str> {
        self.map
            .as_ref()
            .and_then(|m| m.name.as_deref().or(m.id.as_deref()))
            .filter(|s| !s.is_empty())
    }

    pub fn players(&self) -> impl Iterator<Item = (&TeamState, &PlayerState)> {
        self.teams
            .iter()
            .flat_map(|t| t.players.iter().map(move |p| (t, p)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamState {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub players: Vec<PlayerState>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub character: Option<CharacterRef>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub alive: Option<bool>,
    #[serde(default)]
    pub inventory: Option<Inventory>,
}

impl PlayerState {
    pub fn character_id(&self) -> Option<&str> {
        self.character
            .as_ref()
            .and_then(|c| c.id.as_deref().or(c.name.as_deref()))
            .filter(|s| !s.is_empty())
    }

    /// Inventory as a flat item list, repeating items by quantity (at most
    /// [`MAX_ITEM_QUANTITY`] each).
    pub fn item_ids(&self) -> Vec<String> {
        self.inventory
            .as_ref()
            .map(|inv| {
                inv.items
                    .iter()
                    .flat_map(|item| {
                        let quantity = item.quantity.unwrap_or(1);
                        if quantity > MAX_ITEM_QUANTITY {
                            warn!(
                                player = %self.id,
                                item = %item.id,
                                quantity,
                                "inventory quantity clamped"
                            );
                        }
                        std::iter::repeat(item.id.clone())
                            .take(quantity.min(MAX_ITEM_QUANTITY) as usize)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}
