//! One autonomous simulation cycle over the aggregate.
//!
//! The tick is a pure function of the snapshot, the random source and the
//! clock. Persistence is the caller's job; see the orchestration agent.

use crate::model::{AgentName, EventStatus, LogType};
use crate::money::{format_usd, parse_usd};
use crate::seed::SPEND_METRIC;
use crate::state::Snapshot;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

/// Spend increment per tick, whole dollars, half-open.
pub const SPEND_INCREMENT: std::ops::Range<u64> = 100..600;
pub const ESCALATION_PROBABILITY: f64 = 0.1;
pub const MAX_PENDING_ESCALATIONS: usize = 3;

pub const ACTIVITY_POOL: [&str; 4] = [
    "Analyzed prospect data",
    "Optimized outreach sequence",
    "Calculated pipeline velocity",
    "Monitored customer health score",
];

pub const NOMINAL_OBSERVATION: &str = "System health nominal. Continuing operations.";

pub const SPEND_ESCALATION_AGENT: AgentName = AgentName::FinOps;
pub const SPEND_ESCALATION_REASON: &str = "UNUSUAL SPEND DETECTED";
pub const SPEND_ESCALATION_DETAILS: &str =
    "Marketing spend on Campaign \"X\" increased by 30% in the last hour. Requesting review.";

/// What a single tick changed, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    pub spend: Option<u64>,
    pub agent: Option<AgentName>,
    pub event_id: Option<String>,
    pub log_id: Option<String>,
    pub escalation_id: Option<String>,
}

/// Run steps 1–4 of a simulation tick against `snapshot`.
///
/// 1. bump SPEND by a bounded random increment
/// 2. append an INFO event for a random configured agent
/// 3. append an OBSERVATION log for the same agent
/// 4. maybe open an "unusual spend" escalation
pub fn tick<R: Rng + ?Sized>(
    snapshot: &mut Snapshot,
    rng: &mut R,
    now: DateTime<Utc>,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    match snapshot.state.metric_mut(SPEND_METRIC) {
        Some(metric) => match parse_usd(&metric.value) {
            Some(current) => {
                let spend = current.saturating_add(rng.gen_range(SPEND_INCREMENT));
                metric.value = format_usd(spend);
                outcome.spend = Some(spend);
            }
            None => tracing::warn!(value = %metric.value, "SPEND metric unparsable, skipping"),
        },
        None => tracing::warn!("SPEND metric missing, skipping"),
    }

    let configs = &snapshot.state.agent_configs;
    if configs.is_empty() {
        tracing::warn!("no agent configs, skipping activity");
    } else {
        let agent = configs[rng.gen_range(0..configs.len())].name;
        let activity = ACTIVITY_POOL[rng.gen_range(0..ACTIVITY_POOL.len())];
        outcome.event_id = Some(snapshot.record_event(agent, activity, EventStatus::Info, now));
        outcome.log_id =
            Some(snapshot.record_log(agent, LogType::Observation, NOMINAL_OBSERVATION, now));
        outcome.agent = Some(agent);
    }

    if rng.gen_bool(ESCALATION_PROBABILITY)
        && snapshot.state.escalations.len() < MAX_PENDING_ESCALATIONS
    {
        outcome.escalation_id = Some(snapshot.open_escalation(
            SPEND_ESCALATION_AGENT,
            SPEND_ESCALATION_REASON,
            SPEND_ESCALATION_DETAILS,
            now,
        ));
    }

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
