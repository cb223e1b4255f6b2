//! Entities of the GTM system aggregate.
//!
//! Field names serialize in camelCase; the closed vocabularies (agent names,
//! event status, log type, risk threshold) serialize as the upper-case
//! display strings the dashboard renders.

use crate::rolling::RollingLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum retained entries in the event feed and in the agent log.
pub const ROLLING_CAP: usize = 50;

pub type EventLog = RollingLog<Event, ROLLING_CAP>;
pub type AgentLogBook = RollingLog<AgentLog, ROLLING_CAP>;

// ---------------------------------------------------------------------------
// Closed vocabularies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentName {
    #[serde(rename = "ORCHESTRATOR")]
    Orchestrator,
    #[serde(rename = "SDO AGENT")]
    Sdo,
    #[serde(rename = "ENGAGEMENT AGENT")]
    Engagement,
    #[serde(rename = "DEAL DESK AGENT")]
    DealDesk,
    #[serde(rename = "FINOPS AGENT")]
    FinOps,
    #[serde(rename = "EXPANSION AGENT")]
    Expansion,
}

impl AgentName {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentName::Orchestrator => "ORCHESTRATOR",
            AgentName::Sdo => "SDO AGENT",
            AgentName::Engagement => "ENGAGEMENT AGENT",
            AgentName::DealDesk => "DEAL DESK AGENT",
            AgentName::FinOps => "FINOPS AGENT",
            AgentName::Expansion => "EXPANSION AGENT",
        }
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Ok,
    Warn,
    Fail,
    Info,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventStatus::Ok => "OK",
            EventStatus::Warn => "WARN",
            EventStatus::Fail => "FAIL",
            EventStatus::Info => "INFO",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogType {
    Reasoning,
    Observation,
    Action,
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogType::Reasoning => "REASONING",
            LogType::Observation => "OBSERVATION",
            LogType::Action => "ACTION",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskThreshold {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskThreshold::Low => "LOW",
            RiskThreshold::Medium => "MEDIUM",
            RiskThreshold::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// Operator decision on a pending escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationAction {
    Approve,
    Deny,
}

impl EscalationAction {
    /// Past tense used in confirmations: "approved" / "denied".
    pub fn past_tense(self) -> &'static str {
        match self {
            EscalationAction::Approve => "approved",
            EscalationAction::Deny => "denied",
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionParameter {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escalation {
    pub id: String,
    pub agent: AgentName,
    pub reason: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub agent: AgentName,
    pub action: String,
    pub status: EventStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub agent: AgentName,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub id: String,
    pub name: AgentName,
    pub enabled: bool,
    pub api_quota_per_day: u32,
    pub risk_threshold: RiskThreshold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsDataPoint {
    pub month: String,
    pub pipeline: u64,
    pub cac: u64,
    pub ltv: u64,
}

// ---------------------------------------------------------------------------
// SystemState
// ---------------------------------------------------------------------------

/// The whole GTM aggregate. Owned exclusively by the orchestration agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    pub metrics: Vec<Metric>,
    pub mission_parameters: Vec<MissionParameter>,
    pub escalations: Vec<Escalation>,
    pub events: EventLog,
    pub agent_logs: AgentLogBook,
    pub agent_configs: Vec<AgentConfig>,
    pub analytics_data: Vec<AnalyticsDataPoint>,
}

impl SystemState {
    pub fn metric(&self, label: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.label == label)
    }

    pub fn metric_mut(&mut self, label: &str) -> Option<&mut Metric> {
        self.metrics.iter_mut().find(|m| m.label == label)
    }

    pub fn mission_parameter(&self, label: &str) -> Option<&MissionParameter> {
        self.mission_parameters.iter().find(|p| p.label == label)
    }

    pub fn escalation(&self, id: &str) -> Option<&Escalation> {
        self.escalations.iter().find(|e| e.id == id)
    }

    pub fn agent_config(&self, id: &str) -> Option<&AgentConfig> {
        self.agent_configs.iter().find(|c| c.id == id)
    }
}
