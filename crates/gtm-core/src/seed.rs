//! Baseline state used on the very first activation.
//!
//! Timestamps are placed relative to `now` so a fresh dashboard shows a
//! plausible recent history. The headline metrics agree with the latest
//! analytics point and the mission parameters.

use crate::model::{
    AgentConfig, AgentLog, AgentName, AnalyticsDataPoint, Escalation, Event, EventStatus, LogType,
    Metric, MissionParameter, RiskThreshold, SystemState,
};
use chrono::{DateTime, Duration, Utc};

pub const SPEND_METRIC: &str = "SPEND";
pub const CURRENT_CAC_METRIC: &str = "CURRENT CAC";
pub const PIPELINE_METRIC: &str = "PIPELINE";
pub const BUDGET_METRIC: &str = "BUDGET";
pub const TOTAL_BUDGET_PARAMETER: &str = "TOTAL BUDGET";

/// Next free numeric suffixes after the baseline ids.
pub const NEXT_EVENT_SEQ: u64 = 3458;
pub const NEXT_LOG_SEQ: u64 = 3;
pub const NEXT_ESCALATION_SEQ: u64 = 2;

fn metric(label: &str, value: &str) -> Metric {
    Metric {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn parameter(label: &str, value: &str) -> MissionParameter {
    MissionParameter {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn agent_config(
    id: &str,
    name: AgentName,
    enabled: bool,
    api_quota_per_day: u32,
    risk_threshold: RiskThreshold,
) -> AgentConfig {
    AgentConfig {
        id: id.to_string(),
        name,
        enabled,
        api_quota_per_day,
        risk_threshold,
    }
}

fn point(month: &str, pipeline: u64, cac: u64, ltv: u64) -> AnalyticsDataPoint {
    AnalyticsDataPoint {
        month: month.to_string(),
        pipeline,
        cac,
        ltv,
    }
}

pub fn analytics_series() -> Vec<AnalyticsDataPoint> {
    vec![
        point("Jan", 120_000, 18_000, 90_000),
        point("Feb", 150_000, 17_500, 92_000),
        point("Mar", 220_000, 16_000, 110_000),
        point("Apr", 200_000, 15_500, 115_000),
        point("May", 280_000, 14_000, 130_000),
        point("Jun", 350_000, 13_500, 150_000),
        point("Jul", 450_000, 12_831, 165_000),
    ]
}

pub fn baseline_state(now: DateTime<Utc>) -> SystemState {
    let mission_start = now - Duration::minutes(30);

    let events = [
        Event {
            id: "EVT-3456".into(),
            timestamp: mission_start,
            agent: AgentName::Orchestrator,
            action: "Mission Start: Q4 Enterprise Acquisition".into(),
            status: EventStatus::Ok,
        },
        Event {
            id: "EVT-3457".into(),
            timestamp: mission_start + Duration::seconds(1),
            agent: AgentName::FinOps,
            action: "Budget of $200,000 allocated.".into(),
            status: EventStatus::Info,
        },
    ];

    let agent_logs = [
        AgentLog {
            id: "LOG-001".into(),
            timestamp: mission_start + Duration::seconds(68),
            agent: AgentName::Sdo,
            log_type: LogType::Reasoning,
            content: "Mission goal requires enterprise SaaS leads. Querying Crunchbase for \
                      companies with >$20M funding in the SaaS sector."
                .into(),
        },
        AgentLog {
            id: "LOG-002".into(),
            timestamp: mission_start + Duration::seconds(223),
            agent: AgentName::Sdo,
            log_type: LogType::Observation,
            content: "API returned 250 companies. Filtering to match ICP criteria \
                      (US-based, >100 employees)."
                .into(),
        },
    ];

    SystemState {
        metrics: vec![
            metric(BUDGET_METRIC, "$200,000"),
            metric(SPEND_METRIC, "$76,591"),
            metric("CAC TARGET", "$15,000"),
            metric(CURRENT_CAC_METRIC, "$12,831"),
            metric(PIPELINE_METRIC, "$450,000"),
            metric("CLOSED WON", "6"),
        ],
        mission_parameters: vec![
            parameter("MISSION GOAL", "Acquire 10 enterprise SaaS customers in Q4"),
            parameter(TOTAL_BUDGET_PARAMETER, "$200,000"),
            parameter("RISK TOLERANCE", "MEDIUM"),
            parameter("BRAND VOICE", "Professional, Innovative"),
        ],
        escalations: vec![Escalation {
            id: "ESC-001".into(),
            agent: AgentName::DealDesk,
            reason: "DISCOUNT > 20%".into(),
            details: "Prospect \"Innovate Inc.\" requests a 25% discount on a $150k annual \
                      contract. Standard policy allows for 20%."
                .into(),
            created_at: now - Duration::minutes(2),
        }],
        events: events.into_iter().collect(),
        agent_logs: agent_logs.into_iter().collect(),
        agent_configs: vec![
            agent_config("sdo-agent", AgentName::Sdo, true, 500, RiskThreshold::Low),
            agent_config(
                "engagement-agent",
                AgentName::Engagement,
                true,
                2000,
                RiskThreshold::Low,
            ),
            agent_config(
                "deal-desk-agent",
                AgentName::DealDesk,
                true,
                100,
                RiskThreshold::Medium,
            ),
            agent_config("finops-agent", AgentName::FinOps, true, 1000, RiskThreshold::High),
            agent_config(
                "expansion-agent",
                AgentName::Expansion,
                false,
                500,
                RiskThreshold::Medium,
            ),
        ],
        analytics_data: analytics_series(),
    }
}
