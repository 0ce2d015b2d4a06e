use scout_compute::ScoutEngine;
use scout_core::MatchDocument;
use serde_json::{json, Value};

use crate::helpers::*;

fn valorant_match(match_id: &str, shift: f64, winner: &str) -> MatchDocument {
    let defense = |number: u32, x: f64| {
        round(
            number,
            "defender",
            winner,
            json!({
                "coordinateTracking": [
                    snapshot(0, &[("t1p0", x, 0.0), ("t1p1", 5000.0, 0.0), ("t1p2", 2500.0, 2400.0)])
                ],
                "abilityUsages": [
                    ability("t1p0", "omen", "paranoia", x, 0.0),
                    ability("t1p1", "sova", "recon", 5000.0 + 700.0 * number as f64, 0.0)
                ]
            }),
        )
    };
    document(
        match_id,
        "valorant",
        "ascent",
        &["omen", "sova", "killjoy"],
        winner,
        vec![defense(1, shift), defense(2, shift + 100.0)],
    )
}

fn without_timestamps(report: &scout_compute::ScoutingReport) -> Value {
    let mut value = serde_json::to_value(report).unwrap();
    value["generatedAt"] = Value::Null;
    value["seriesBreakdown"] = Value::Null;
    value
}

#[test]
fn report_sections_use_contract_names() {
    let engine = ScoutEngine::new(callouts());
    let docs = [
        valorant_match("m-a", 0.0, "t1"),
        valorant_match("m-b", 40.0, "t2"),
    ];
    let report = serde_json::to_value(engine.report(&docs, "t1")).unwrap();

    assert_eq!(report["teamId"], "t1");
    assert_eq!(report["teamName"], "Tigers");
    assert_eq!(report["seriesAnalyzed"], 2);
    assert_eq!(report["mapsPlayed"], 2);
    assert!(report["vetoStats"].is_null());

    let ascent = &report["mapStats"][0];
    assert_eq!(ascent["mapId"], "ascent");
    assert_eq!(ascent["playRate"], 100.0);
    assert_eq!(ascent["winRate"], 50.0);

    let defense = &report["defensiveFormations"][0];
    assert_eq!(defense["rounds"], 4);
    assert_eq!(defense["formations"][0]["key"], "1 A Site, 1 B Site, 1 Mid");
    assert_eq!(defense["formations"][0]["percentage"], 100.0);

    let breakdown = report["seriesBreakdown"].as_array().unwrap();
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0]["matchId"], "m-a");
    assert_eq!(breakdown[0]["opponent"], "Wolves");
    assert_eq!(breakdown[1]["games"][0]["roundsLost"], 2);
}

#[test]
fn position_clusters_merge_across_matches() {
    let engine = ScoutEngine::new(callouts());
    let docs = [
        valorant_match("m-a", 0.0, "t1"),
        valorant_match("m-b", 40.0, "t1"),
    ];
    let report = engine.report(&docs, "t1");

    let map = &report.position_clusters.as_ref().unwrap()[0];
    let p0 = map.players.iter().find(|p| p.player_id == "t1p0").unwrap();
    assert_eq!(p0.player_name, "t1-0");
    assert_eq!(p0.rounds, 4);
    assert_eq!(p0.clusters.len(), 1);
    let cluster = &p0.clusters[0];
    assert_eq!(cluster.cluster.label.as_deref(), Some("A Main"));
    assert_eq!(cluster.cluster.count, 4);
    assert_eq!(cluster.cluster.centroid.x, 70.0);
    assert_eq!(cluster.percentage, 100.0);
}

#[test]
fn ability_hotspots_keep_discriminators_and_drop_noise() {
    let engine = ScoutEngine::new(callouts());
    let docs = [
        valorant_match("m-a", 0.0, "t1"),
        valorant_match("m-b", 40.0, "t1"),
    ];
    let report = engine.report(&docs, "t1");

    let map = &report.ability_hotspots.as_ref().unwrap()[0];
    let p0 = map.players.iter().find(|p| p.player_id == "t1p0").unwrap();
    assert_eq!(p0.clusters.len(), 1);
    let cluster = &p0.clusters[0].cluster;
    assert_eq!(cluster.discriminator.ability_id.as_deref(), Some("paranoia"));
    assert_eq!(cluster.discriminator.agent_id.as_deref(), Some("omen"));
    assert_eq!(cluster.count, 4);
    assert_eq!(p0.clusters[0].percentage, 100.0);

    // Recon darts land 700 units apart: never a cluster of two.
    let p1 = map.players.iter().find(|p| p.player_id == "t1p1").unwrap();
    assert!(p1.clusters.is_empty());
    assert_eq!(p1.rounds, 4);
}

#[test]
fn match_order_does_not_change_numbers() {
    let engine = ScoutEngine::new(callouts());
    let a = valorant_match("m-a", 0.0, "t1");
    let b = valorant_match("m-b", 40.0, "t2");
    let c = valorant_match("m-c", 350.0, "t1");

    let forward = engine.report(&[a.clone(), b.clone(), c.clone()], "t1");
    let shuffled = engine.report(&[c, a, b], "t1");
    assert_eq!(without_timestamps(&forward), without_timestamps(&shuffled));
}

#[test]
fn cs2_economy_split_by_previous_round_and_rifles() {
    let positions = [("t1p0", -500.0, -2000.0), ("t1p1", -2000.0, 500.0)];
    let ct_round = |number: u32, winner: &str, purchases: Vec<Value>| {
        round(
            number,
            "defender",
            winner,
            json!({
                "coordinateTracking": [snapshot(0, &positions)],
                "purchases": purchases
            }),
        )
    };
    let doc = document(
        "cs-1",
        "cs2",
        "de_mirage",
        &["", ""],
        "t2",
        vec![
            ct_round(1, "t2", vec![purchase("t1p0", "weapon_ak47")]),
            ct_round(2, "t1", vec![purchase("t1p0", "weapon_AK47")]),
            ct_round(3, "t2", vec![]),
            ct_round(4, "t2", vec![purchase("t1p1", "weapon_glock")]),
        ],
    );

    let report = ScoutEngine::new(callouts()).report(&[doc], "t1");
    let economy = &report.economy_formations.as_ref().unwrap()[0];
    assert_eq!(economy.map_id, "de_mirage");
    assert_eq!(economy.buy.rounds, 2);
    assert_eq!(economy.eco.rounds, 1);
    assert_eq!(economy.buy.formations[0].key, "1 A Site, 1 B Site");
    assert_eq!(economy.buy.formations[0].count, 2);
    assert!(report.lurk_stats.is_none());
    assert!(report.post_plant_positions.is_none());
}
