//! Map veto tendencies.
//!
//! A team's bans are split at the first pick of either team into phase 1
//! and phase 2. Availability is judged against every map mentioned anywhere
//! in the veto: a map is available for the team's ban (pick) when nobody had
//! acted on it before the team's first ban (pick).

use std::collections::{BTreeMap, BTreeSet};

use scout_core::{MapId, MatchDocument, VetoAction, VetoKind};
use serde::{Deserialize, Serialize};

use super::{AnalysisContext, Analyzer, AnalyzerPayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetoPayload {
    pub ban_phase1: Vec<MapId>,
    pub ban_phase2: Vec<MapId>,
    pub picks: Vec<MapId>,
    pub decider: Option<MapId>,
    /// Opponent bans made before the first pick.
    pub opponent_phase1_bans: Vec<MapId>,
    pub availability: BTreeMap<MapId, MapAvailability>,
}

/// Available-versus-acted counters for one map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAvailability {
    pub ban_available: u32,
    pub banned: u32,
    pub pick_available: u32,
    pub picked: u32,
}

impl MapAvailability {
    pub fn add(&mut self, other: &MapAvailability) {
        self.ban_available += other.ban_available;
        self.banned += other.banned;
        self.pick_available += other.pick_available;
        self.picked += other.picked;
    }
}

pub struct VetoAnalyzer;

impl Analyzer for VetoAnalyzer {
    fn name(&self) -> &'static str {
        "veto"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        _ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let veto = doc.map_veto.as_ref()?;
        analyze_veto(veto, team_id).map(AnalyzerPayload::Veto)
    }
}

pub fn analyze_veto(veto: &[VetoAction], team_id: &str) -> Option<VetoPayload> {
    let mut actions: Vec<&VetoAction> = veto.iter().collect();
    actions.sort_by_key(|a| a.sequence_number);

    if !actions.iter().any(|a| acted_by(a, team_id)) {
        return None;
    }

    let first_pick = actions
        .iter()
        .find(|a| a.action == VetoKind::Pick)
        .map(|a| a.sequence_number);

    let mut payload = VetoPayload::default();
    for action in &actions {
        match action.action {
            VetoKind::Ban => {
                let phase1 = first_pick.map_or(true, |p| action.sequence_number < p);
                if acted_by(action, team_id) {
                    if phase1 {
                        payload.ban_phase1.push(action.map_id.clone());
                    } else {
                        payload.ban_phase2.push(action.map_id.clone());
                    }
                } else if phase1 && action.team_id.is_some() {
                    payload.opponent_phase1_bans.push(action.map_id.clone());
                }
            }
            VetoKind::Pick => {
                if acted_by(action, team_id) {
                    payload.picks.push(action.map_id.clone());
                }
            }
            VetoKind::Decider => payload.decider = Some(action.map_id.clone()),
        }
    }

    let universe: BTreeSet<String> = actions.iter().map(|a| a.map_id.clone()).collect();
    for map in &universe {
        payload.availability.entry(map.clone()).or_default();
    }

    if let Some(seq) = first_action_of(&actions, team_id, VetoKind::Ban) {
        let removed = removed_before(&actions, seq);
        for map in universe.iter().filter(|m| !removed.contains(m.as_str())) {
            let acted = payload
                .ban_phase1
                .iter()
                .chain(&payload.ban_phase2)
                .any(|b| b == map);
            let entry = payload.availability.entry(map.clone()).or_default();
            entry.ban_available += 1;
            if acted {
                entry.banned += 1;
            }
        }
    }
    if let Some(seq) = first_action_of(&actions, team_id, VetoKind::Pick) {
        let removed = removed_before(&actions, seq);
        for map in universe.iter().filter(|m| !removed.contains(m.as_str())) {
            let acted = payload.picks.iter().any(|p| p == map);
            let entry = payload.availability.entry(map.clone()).or_default();
            entry.pick_available += 1;
            if acted {
                entry.picked += 1;
            }
        }
    }

    Some(payload)
}

fn acted_by(action: &VetoAction, team_id: &str) -> bool {
    action.team_id.as_deref() == Some(team_id)
}

fn first_action_of(actions: &[&VetoAction], team_id: &str, kind: VetoKind) -> Option<u32> {
    actions
        .iter()
        .find(|a| a.action == kind && acted_by(a, team_id))
        .map(|a| a.sequence_number)
}

/// Maps already banned, picked or decided before sequence number `seq`.
fn removed_before<'a>(actions: &[&'a VetoAction], seq: u32) -> BTreeSet<&'a str> {
    actions
        .iter()
        .filter(|a| a.sequence_number < seq)
        .map(|a| a.map_id.as_str())
        .collect()
}
