use chrono::{DateTime, Duration, TimeZone, Utc};
use scout_core::{CalloutTable, MatchDocument};
use serde_json::{json, Value};

pub const CALLOUTS: &str = r#"
maps:
  Ascent:
    regions:
      - name: A Main
        superRegion: A Site
        points: [[0.0, 0.0]]
      - name: B Main
        superRegion: B Site
        points: [[5000.0, 0.0]]
      - name: Mid Courtyard
        superRegion: Mid
        points: [[2500.0, 2500.0]]
  de_mirage:
    regions:
      - name: Palace
        superRegion: A Site
        points: [[-500.0, -2000.0]]
      - name: Apartments
        superRegion: B Site
        points: [[-2000.0, 500.0]]
"#;

pub fn callouts() -> CalloutTable {
    CalloutTable::from_yaml_str(CALLOUTS).unwrap()
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 2, 18, 0, 0).unwrap() + Duration::seconds(secs)
}

pub fn stamp(secs: i64) -> String {
    at(secs).to_rfc3339()
}

fn roster(team: &str, characters: &[&str]) -> Vec<Value> {
    characters
        .iter()
        .enumerate()
        .map(|(i, character)| {
            json!({
                "id": format!("{team}p{i}"),
                "name": format!("{team}-{i}"),
                "teamId": team,
                "characterId": if character.is_empty() { Value::Null } else { json!(character) },
                "stats": {
                    "kills": 0, "deaths": 0,
                    "attackerKills": 0, "attackerDeaths": 0,
                    "defenderKills": 0, "defenderDeaths": 0,
                    "firstKills": 0, "firstDeaths": 0
                }
            })
        })
        .collect()
}

/// A round where `t1` holds `t1_side`; freezetime ends at `at(0)`.
/// `extra` is merged over the empty round (purchases, snapshots, ...).
pub fn round(number: u32, t1_side: &str, winner: &str, extra: Value) -> Value {
    let t2_side = if t1_side == "attacker" { "defender" } else { "attacker" };
    let mut r = json!({
        "roundNumber": number,
        "winnerTeamId": winner,
        "winType": "elimination",
        "teamSides": { "t1": t1_side, "t2": t2_side },
        "freezetimeEndedAt": stamp(0),
        "purchases": [],
        "abilityUsages": [],
        "kills": [],
        "coordinateTracking": []
    });
    if let (Some(base), Value::Object(extra)) = (r.as_object_mut(), extra) {
        base.extend(extra);
    }
    r
}

pub fn snapshot(secs: i64, positions: &[(&str, f64, f64)]) -> Value {
    json!({
        "timestamp": stamp(secs),
        "positions": positions
            .iter()
            .map(|(id, x, y)| json!({ "playerId": id, "x": x, "y": y }))
            .collect::<Vec<_>>()
    })
}

pub fn ability(player: &str, agent: &str, ability: &str, x: f64, y: f64) -> Value {
    json!({
        "timestamp": stamp(3),
        "playerId": player,
        "playerName": null,
        "teamId": "t1",
        "characterId": agent,
        "abilityId": ability,
        "position": { "x": x, "y": y }
    })
}

pub fn purchase(player: &str, item: &str) -> Value {
    json!({ "playerId": player, "playerName": player, "teamId": "t1", "itemId": item })
}

/// One-game match document between `t1` and `t2`. An empty character
/// leaves `characterId` null.
pub fn document(
    match_id: &str,
    title: &str,
    map: &str,
    characters: &[&str],
    winner: &str,
    rounds: Vec<Value>,
) -> MatchDocument {
    let mut players = roster("t1", characters);
    players.extend(roster("t2", characters));
    let value = json!({
        "matchId": match_id,
        "title": title,
        "startedAt": stamp(-600),
        "teams": [
            { "id": "t1", "name": "Tigers", "players": [] },
            { "id": "t2", "name": "Wolves", "players": [] }
        ],
        "games": [{
            "gameNumber": 1,
            "mapId": map,
            "winnerTeamId": winner,
            "players": players,
            "rounds": rounds
        }]
    });
    serde_json::from_value(value).unwrap()
}
