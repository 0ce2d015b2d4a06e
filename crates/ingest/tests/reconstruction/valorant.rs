use scout_core::{Point, Side, Title, VetoKind, WinType};
use scout_ingest::{convert_log, decode_str, reconstruct};

use crate::helpers::{event, ts, LogBuilder, World};

const SIDES: [&str; 2] = ["attacker", "defender"];

fn round_start(w: &World) -> serde_json::Value {
    event("round-started-freezetime", Some(("round", "r")), None, Some(w.state()))
}

fn freeze_end(w: &World) -> serde_json::Value {
    event("round-ended-freezetime", Some(("round", "r")), None, Some(w.state()))
}

fn round_won(w: &World, team: &str) -> serde_json::Value {
    event("team-won-round", Some(("team", team)), None, Some(w.state()))
}

fn round_ended(w: &World) -> serde_json::Value {
    event("game-ended-round", Some(("game", "g")), None, Some(w.state()))
}

fn kill(w: &World, killer: &str, victim: &str) -> serde_json::Value {
    event("player-killed-player", Some(("player", killer)), Some(("player", victim)), Some(w.state()))
}

#[test]
fn single_round_from_two_events() {
    let w = World::new("Ascent", SIDES, 2);
    let mut log = LogBuilder::new();
    log.push(0, vec![round_start(&w)]);
    log.push(90, vec![round_won(&w, "t1")]);

    let (doc, _) = convert_log(Title::Valorant, "m1", &log.text());
    assert_eq!(doc.games.len(), 1);
    let game = &doc.games[0];
    assert_eq!(game.rounds.len(), 1);

    let round = &game.rounds[0];
    assert_eq!(round.round_number, 1);
    assert_eq!(round.winner_team_id.as_deref(), Some("t1"));
    assert!(round.purchases.is_empty());
    assert!(round.kills.is_empty());
    assert!(round.ability_usages.is_empty());
    assert_eq!(round.coordinate_tracking.len(), 1);
    assert_eq!(round.coordinate_tracking[0].timestamp, ts(0));
    assert_eq!(round.win_type, Some(WinType::Time));
}

#[test]
fn malformed_lines_do_not_disturb_reconstruction() {
    let w = World::new("Ascent", SIDES, 2);
    let mut log = LogBuilder::new();
    log.push(0, vec![round_start(&w)]);
    log.raw_line("{\"occurredAt\": \"2024-05-01T12:00:01Z\", \"events\": [");
    log.raw_line("");
    log.push(90, vec![round_won(&w, "t1")]);

    let (doc, stats) = convert_log(Title::Valorant, "m1", &log.text());
    assert_eq!(stats.lines_skipped, 1);
    assert_eq!(doc.games[0].rounds.len(), 1);
}

#[test]
fn full_series_flow() {
    let mut w = World::new("Ascent", SIDES, 3);
    let mut log = LogBuilder::new();

    log.push(0, vec![event("series-started-game", Some(("series", "s1")), Some(("game", "g1")), Some(w.state()))]);
    log.push(1, vec![event("game-started-clock", Some(("game", "g1")), None, Some(w.state()))]);

    // Round 1: t1 attacks, buys, plants and wins by detonation.
    log.push(2, vec![round_start(&w)]);
    w.player_mut("t1p0").items.push("ghost".to_string());
    log.push(30, vec![freeze_end(&w)]);
    w.player_mut("t1p0").x = 50.0;
    log.push(35, vec![event("player-used-ability", Some(("player", "t1p0")), Some(("ability", "ability-q")), Some(w.state()))]);
    log.push(40, vec![kill(&w, "t1p0", "t2p0")]);
    log.push(45, vec![event("player-completed-plantBomb", Some(("player", "t1p1")), None, Some(w.state()))]);
    log.push(60, vec![round_won(&w, "t1")]);
    log.push(61, vec![round_ended(&w)]);

    // Round 2: nothing bought, t2 wipes t1.
    log.push(70, vec![round_start(&w)]);
    log.push(95, vec![freeze_end(&w)]);
    log.push(100, vec![kill(&w, "t2p1", "t1p0")]);
    log.push(101, vec![kill(&w, "t2p1", "t1p1")]);
    log.push(102, vec![kill(&w, "t2p1", "t1p2")]);
    log.push(110, vec![round_won(&w, "t2")]);
    log.push(111, vec![round_ended(&w)]);
    log.push(112, vec![event("team-won-game", Some(("team", "t2")), None, Some(w.state()))]);

    // Game 2 on a new map with swapped sides.
    w.game_number = 2;
    w.map = "Bind".to_string();
    w.swap_sides();
    log.push(200, vec![event("series-started-game", Some(("series", "s1")), Some(("game", "g2")), Some(w.state()))]);
    log.push(201, vec![event("game-started-clock", Some(("game", "g2")), None, Some(w.state()))]);
    log.push(202, vec![round_start(&w)]);
    log.push(230, vec![freeze_end(&w)]);
    log.push(240, vec![round_won(&w, "t1")]);

    let (batches, _) = decode_str(&log.text());
    let doc = reconstruct(Title::Valorant, "m42", &batches);

    assert_eq!(doc.match_id, "m42");
    assert_eq!(doc.started_at, Some(ts(0)));
    assert_eq!(doc.teams.len(), 2);
    assert_eq!(doc.team("t1").unwrap().players.len(), 3);
    assert_eq!(doc.map_veto.as_ref().map(Vec::len), Some(0));
    assert_eq!(doc.games.len(), 2);

    let g1 = &doc.games[0];
    assert_eq!(g1.game_number, 1);
    assert_eq!(g1.map_id, "Ascent");
    assert_eq!(g1.winner_team_id.as_deref(), Some("t2"));
    assert_eq!(g1.players.len(), 6);
    let numbers: Vec<u32> = g1.rounds.iter().map(|r| r.round_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    let r1 = &g1.rounds[0];
    assert_eq!(r1.side_of("t1"), Some(Side::Attacker));
    assert_eq!(r1.side_of("t2"), Some(Side::Defender));
    assert_eq!(r1.freezetime_ended_at, Some(ts(30)));
    assert_eq!(r1.purchases.len(), 7);
    assert_eq!(r1.purchases.iter().filter(|p| p.item_id == "ghost").count(), 1);
    assert_eq!(r1.ability_usages.len(), 1);
    assert_eq!(r1.ability_usages[0].character_id.as_deref(), Some("agent0"));
    assert_eq!(r1.ability_usages[0].position, Some(Point::new(50.0, 0.0)));
    assert_eq!(r1.kills.len(), 1);
    assert_eq!(r1.kills[0].killer_name.as_deref(), Some("T1-player-0"));
    assert_eq!(r1.kills[0].victim_team_id.as_deref(), Some("t2"));
    assert_eq!(r1.kills[0].killer_position, Some(Point::new(50.0, 0.0)));
    assert_eq!(r1.bomb_plant.as_ref().and_then(|b| b.player_id.as_deref()), Some("t1p1"));
    assert_eq!(r1.win_type, Some(WinType::Detonate));
    let stamps: Vec<_> = r1.coordinate_tracking.iter().map(|s| s.timestamp).collect();
    assert_eq!(stamps, vec![ts(2), ts(30), ts(35), ts(40), ts(45)]);

    let r2 = &g1.rounds[1];
    assert!(r2.purchases.is_empty(), "unchanged inventory means no purchases");
    assert_eq!(r2.kills.len(), 3);
    assert_eq!(r2.win_type, Some(WinType::Elimination));

    let t1p0 = g1.player("t1p0").unwrap().stats;
    assert_eq!(t1p0.kills, 1);
    assert_eq!(t1p0.attacker_kills, 1);
    assert_eq!(t1p0.deaths, 1);
    assert_eq!(t1p0.attacker_deaths, 1);
    assert_eq!(t1p0.first_kills, 1);
    assert_eq!(t1p0.first_deaths, 1);
    let t2p1 = g1.player("t2p1").unwrap().stats;
    assert_eq!(t2p1.kills, 3);
    assert_eq!(t2p1.defender_kills, 3);

    let g2 = &doc.games[1];
    assert_eq!(g2.game_number, 2);
    assert_eq!(g2.map_id, "Bind");
    assert_eq!(g2.rounds.len(), 1);
    assert_eq!(g2.rounds[0].side_of("t1"), Some(Side::Defender));
    assert_eq!(g2.winner_team_id, None);
}

#[test]
fn combat_facts_before_freezetime_end_are_ignored() {
    let w = World::new("Ascent", SIDES, 2);
    let mut log = LogBuilder::new();
    log.push(0, vec![round_start(&w)]);
    log.push(5, vec![kill(&w, "t1p0", "t2p0")]);
    log.push(30, vec![freeze_end(&w)]);
    log.push(60, vec![round_won(&w, "t2")]);

    let (doc, _) = convert_log(Title::Valorant, "m1", &log.text());
    let round = &doc.games[0].rounds[0];
    assert!(round.kills.is_empty());
    assert_eq!(doc.games[0].player("t1p0").unwrap().stats.kills, 0);
}

#[test]
fn characters_are_back_filled() {
    let mut w = World::new("Ascent", SIDES, 2);
    for p in &mut w.players {
        p.agent = None;
    }
    let mut log = LogBuilder::new();
    log.push(0, vec![event("series-started-game", None, None, Some(w.state()))]);
    w.player_mut("t1p1").agent = Some("jett".to_string());
    log.push(10, vec![round_start(&w)]);
    log.push(90, vec![round_won(&w, "t1")]);

    let (doc, _) = convert_log(Title::Valorant, "m1", &log.text());
    let game = &doc.games[0];
    assert_eq!(game.player("t1p1").unwrap().character_id.as_deref(), Some("jett"));
    assert_eq!(game.player("t1p0").unwrap().character_id, None);
}

#[test]
fn snapshots_are_deduplicated_by_timestamp() {
    let w = World::new("Ascent", SIDES, 2);
    let mut log = LogBuilder::new();
    log.push(0, vec![round_start(&w)]);
    log.push(1, vec![event("game-started-clock", None, None, Some(w.state()))]);
    log.push(30, vec![freeze_end(&w)]);
    log.push(40, vec![kill(&w, "t1p0", "t2p0"), kill(&w, "t1p0", "t2p1")]);
    log.push(60, vec![round_won(&w, "t1")]);

    let (doc, _) = convert_log(Title::Valorant, "m1", &log.text());
    let round = &doc.games[0].rounds[0];
    assert_eq!(round.coordinate_tracking.len(), 3);
    assert_eq!(round.kills.len(), 2);
    assert_eq!(round.win_type, Some(WinType::Elimination));
}

#[test]
fn unfinished_round_is_sealed_when_next_starts() {
    let w = World::new("Ascent", SIDES, 2);
    let mut log = LogBuilder::new();
    log.push(0, vec![round_start(&w)]);
    log.push(30, vec![freeze_end(&w)]);
    log.push(100, vec![round_start(&w)]);
    log.push(190, vec![round_won(&w, "t2")]);

    let (doc, _) = convert_log(Title::Valorant, "m1", &log.text());
    let rounds = &doc.games[0].rounds;
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0].round_number, 1);
    assert_eq!(rounds[0].winner_team_id, None);
    assert_eq!(rounds[1].round_number, 2);
}

#[test]
fn veto_is_resequenced_by_time() {
    let mut log = LogBuilder::new();
    log.push(0, vec![event("team-banned-map", Some(("team", "tx")), Some(("map", "mapA")), None)]);
    log.push(10, vec![event("team-picked-map", Some(("team", "tx")), Some(("map", "mapC")), None)]);
    // Written late but happened before the pick.
    log.push(5, vec![event("team-banned-map", Some(("team", "ty")), Some(("map", "mapB")), None)]);
    log.push(20, vec![event("series-picked-map", Some(("series", "s1")), Some(("map", "mapE")), None)]);
    log.push(21, vec![event("some-future-event", None, None, None)]);

    let (doc, _) = convert_log(Title::Valorant, "m1", &log.text());
    let veto = doc.map_veto.unwrap();
    let seq: Vec<(u32, VetoKind, &str, Option<&str>)> = veto
        .iter()
        .map(|v| (v.sequence_number, v.action, v.map_id.as_str(), v.team_id.as_deref()))
        .collect();
    assert_eq!(
        seq,
        vec![
            (1, VetoKind::Ban, "mapA", Some("tx")),
            (2, VetoKind::Ban, "mapB", Some("ty")),
            (3, VetoKind::Pick, "mapC", Some("tx")),
            (4, VetoKind::Decider, "mapE", None),
        ]
    );
    assert!(doc.games.is_empty());
}

#[test]
fn empty_log_gives_empty_document() {
    let (doc, stats) = convert_log(Title::Valorant, "m1", "");
    assert!(doc.games.is_empty());
    assert!(doc.teams.is_empty());
    assert_eq!(stats.batches_decoded, 0);
}

#[test]
fn substitute_for_next_game_stays_out_of_sealed_roster() {
    let mut w = World::new("Ascent", SIDES, 2);
    let mut log = LogBuilder::new();
    log.push(0, vec![event("series-started-game", Some(("series", "s1")), Some(("game", "g1")), Some(w.state()))]);
    log.push(2, vec![round_start(&w)]);
    log.push(30, vec![freeze_end(&w)]);
    log.push(60, vec![round_won(&w, "t1")]);
    log.push(62, vec![event("team-won-game", Some(("team", "t1")), None, Some(w.state()))]);

    let mut sub = w.player_mut("t1p1").clone();
    sub.id = "t1p9".to_string();
    sub.name = "T1-sub".to_string();
    w.players.push(sub);
    w.game_number = 2;
    w.map = "Bind".to_string();
    log.push(200, vec![event("series-started-game", Some(("series", "s1")), Some(("game", "g2")), Some(w.state()))]);
    log.push(202, vec![round_start(&w)]);
    log.push(240, vec![round_won(&w, "t2")]);

    let (doc, _) = convert_log(Title::Valorant, "m1", &log.text());
    assert_eq!(doc.games.len(), 2);

    let first: Vec<&str> = doc.games[0].players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(first, vec!["t1p0", "t1p1", "t2p0", "t2p1"]);
    assert_eq!(doc.games[0].rounds.len(), 1);

    assert!(doc.games[1].players.iter().any(|p| p.id == "t1p9"));
    assert_eq!(doc.games[1].map_id, "Bind");
}

#[test]
fn positions_are_tracked_only_after_the_clock_starts() {
    let w = World::new("Ascent", SIDES, 2);
    let mut log = LogBuilder::new();
    log.push(0, vec![round_start(&w)]);
    log.push(30, vec![freeze_end(&w)]);
    log.push(40, vec![kill(&w, "t1p0", "t2p0")]);
    log.push(45, vec![event("game-started-clock", None, None, Some(w.state()))]);
    log.push(50, vec![kill(&w, "t1p0", "t2p1")]);
    log.push(60, vec![round_won(&w, "t1")]);

    let (doc, _) = convert_log(Title::Valorant, "m1", &log.text());
    let round = &doc.games[0].rounds[0];
    let stamps: Vec<_> = round.coordinate_tracking.iter().map(|s| s.timestamp).collect();
    assert_eq!(stamps, vec![ts(0), ts(45), ts(50)]);
    assert_eq!(round.kills.len(), 2);
}
