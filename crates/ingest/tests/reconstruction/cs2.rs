use scout_core::{Side, Title, WinType};
use scout_ingest::convert_log;

use crate::helpers::{event, ts, LogBuilder, World};

fn cs2_world() -> World {
    let mut w = World::new("de_mirage", ["terrorists", "counter-terrorists"], 2);
    for p in &mut w.players {
        p.agent = None;
        p.items = vec!["glock".to_string()];
    }
    w
}

#[test]
fn provider_sides_map_to_attacker_and_defender() {
    let w = cs2_world();
    let mut log = LogBuilder::new();
    log.push(0, vec![event("series-started-game", None, None, Some(w.state()))]);
    log.push(1, vec![event("round-started-freezetime", None, None, Some(w.state()))]);
    log.push(90, vec![event("team-won-round", Some(("team", "t2")), None, Some(w.state()))]);

    let (doc, _) = convert_log(Title::Cs2, "c1", &log.text());
    assert_eq!(doc.map_veto, None);
    let game = &doc.games[0];
    assert_eq!(game.map_id, "de_mirage");
    let round = &game.rounds[0];
    assert_eq!(round.side_of("t1"), Some(Side::Attacker));
    assert_eq!(round.side_of("t2"), Some(Side::Defender));
    assert_eq!(round.team_on(Side::Defender), Some("t2"));
}

#[test]
fn utility_and_defuse_after_resume() {
    let mut w = cs2_world();
    let mut log = LogBuilder::new();
    log.push(0, vec![event("series-started-game", None, None, Some(w.state()))]);
    log.push(1, vec![event("game-started-clock", None, None, Some(w.state()))]);
    log.push(2, vec![event("round-started-freezetime", None, None, Some(w.state()))]);
    w.player_mut("t2p0").items.push("defuser".to_string());
    log.push(20, vec![event("round-ended-freezetime", None, None, Some(w.state()))]);
    log.push(25, vec![event("player-threw-item", Some(("player", "t1p0")), Some(("item", "smokegrenade")), Some(w.state()))]);
    log.push(30, vec![event("player-completed-plantBomb", Some(("player", "t1p1")), None, Some(w.state()))]);
    // Tactical pause mid-round.
    log.push(40, vec![event("game-resumed-clock", None, None, Some(w.state()))]);
    w.player_mut("t2p0").x = 700.0;
    log.push(55, vec![event("player-completed-defuseBomb", Some(("player", "t2p0")), None, Some(w.state()))]);
    log.push(56, vec![event("team-won-round", Some(("team", "t2")), None, Some(w.state()))]);
    log.push(57, vec![event("team-won-game", Some(("team", "t2")), None, None)]);

    let (doc, _) = convert_log(Title::Cs2, "c2", &log.text());
    let game = &doc.games[0];
    assert_eq!(game.winner_team_id.as_deref(), Some("t2"));
    assert!(game.players.iter().all(|p| p.character_id.is_none()));

    let round = &game.rounds[0];
    assert_eq!(round.purchases.len(), 5);
    assert!(round.purchases.iter().any(|p| p.item_id == "defuser" && p.player_id == "t2p0"));

    assert_eq!(round.ability_usages.len(), 1);
    let smoke = &round.ability_usages[0];
    assert_eq!(smoke.ability_id, "smokegrenade");
    assert_eq!(smoke.team_id.as_deref(), Some("t1"));
    assert_eq!(smoke.character_id, None);

    let defuse = round.bomb_defuse.as_ref().unwrap();
    assert_eq!(defuse.timestamp, ts(55));
    assert_eq!(defuse.position.map(|p| p.x), Some(700.0));
    assert_eq!(round.win_type, Some(WinType::Defuse));

    let stamps: Vec<_> = round.coordinate_tracking.iter().map(|s| s.timestamp).collect();
    assert_eq!(stamps, vec![ts(2), ts(20), ts(25), ts(30), ts(40), ts(55)]);
}

#[test]
fn veto_tags_are_not_part_of_cs2() {
    let mut log = LogBuilder::new();
    log.push(0, vec![event("team-banned-map", Some(("team", "t1")), Some(("map", "de_nuke")), None)]);

    let (doc, _) = convert_log(Title::Cs2, "c3", &log.text());
    assert_eq!(doc.map_veto, None);
}
