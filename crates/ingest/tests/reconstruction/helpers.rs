use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(secs)
}

/// Builds a line-delimited log, one batch per `push`.
#[derive(Default)]
pub struct LogBuilder {
    lines: Vec<String>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, secs: i64, events: Vec<Value>) -> &mut Self {
        let line = json!({
            "id": format!("batch-{}", self.lines.len() + 1),
            "occurredAt": ts(secs).to_rfc3339(),
            "events": events,
        });
        self.lines.push(line.to_string());
        self
    }

    pub fn raw_line(&mut self, line: &str) -> &mut Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Build one event value.
pub fn event(
    kind: &str,
    actor: Option<(&str, &str)>,
    target: Option<(&str, &str)>,
    state: Option<Value>,
) -> Value {
    let mut ev = json!({ "type": kind });
    if let Some((actor_kind, id)) = actor {
        ev["actor"] = json!({ "type": actor_kind, "id": id });
    }
    if let Some((target_kind, id)) = target {
        ev["target"] = json!({ "type": target_kind, "id": id });
    }
    if let Some(state) = state {
        ev["seriesState"] = state;
    }
    ev
}

#[derive(Clone)]
pub struct SimPlayer {
    pub id: String,
    pub name: String,
    pub team: String,
    pub agent: Option<String>,
    pub x: f64,
    pub y: f64,
    pub items: Vec<String>,
}

/// Mutable world that renders embedded series states.
#[derive(Clone)]
pub struct World {
    pub map: String,
    pub game_number: u32,
    /// Provider side strings for t1 and t2.
    pub sides: [String; 2],
    pub players: Vec<SimPlayer>,
}

impl World {
    /// Two teams (`t1`, `t2`) of `per_team` players each.
    pub fn new(map: &str, sides: [&str; 2], per_team: usize) -> Self {
        let mut players = Vec::new();
        for (team_idx, team) in ["t1", "t2"].iter().enumerate() {
            for i in 0..per_team {
                players.push(SimPlayer {
                    id: format!("{team}p{i}"),
                    name: format!("{}-player-{i}", team.to_uppercase()),
                    team: team.to_string(),
                    agent: Some(format!("agent{i}")),
                    x: (team_idx * 1000 + i * 10) as f64,
                    y: 0.0,
                    items: vec!["classic".to_string()],
                });
            }
        }
        Self {
            map: map.to_string(),
            game_number: 1,
            sides: [sides[0].to_string(), sides[1].to_string()],
            players,
        }
    }

    pub fn player_mut(&mut self, id: &str) -> &mut SimPlayer {
        self.players.iter_mut().find(|p| p.id == id).unwrap()
    }

    pub fn swap_sides(&mut self) {
        self.sides.swap(0, 1);
    }

    pub fn state(&self) -> Value {
        let teams: Vec<Value> = ["t1", "t2"]
            .iter()
            .enumerate()
            .map(|(idx, team)| {
                let players: Vec<Value> = self
                    .players
                    .iter()
                    .filter(|p| p.team == *team)
                    .map(|p| {
                        let items: Vec<Value> =
                            p.items.iter().map(|i| json!({ "id": i })).collect();
                        let mut v = json!({
                            "id": p.id,
                            "name": p.name,
                            "position": {"x": p.x, "y": p.y},
                            "alive": true,
                            "inventory": {"items": items},
                        });
                        if let Some(agent) = &p.agent {
                            v["character"] = json!({"id": agent, "name": agent});
                        }
                        v
                    })
                    .collect();
                let name = if *team == "t1" { "Alpha" } else { "Bravo" };
                json!({
                    "id": team,
                    "name": name,
                    "side": self.sides[idx],
                    "players": players,
                })
            })
            .collect();

        json!({
            "id": "series-1",
            "teams": [{"id": "t1", "name": "Alpha"}, {"id": "t2", "name": "Bravo"}],
            "games": [{
                "sequenceNumber": self.game_number,
                "started": true,
                "finished": false,
                "map": {"name": self.map},
                "teams": teams,
            }]
        })
    }
}
