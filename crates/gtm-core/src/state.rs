use crate::error::{GtmError, Result};
use crate::model::{
    AgentConfig, AgentLog, AgentName, Escalation, EscalationAction, Event, EventStatus, LogType,
    SystemState,
};
use crate::seed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

/// Next numeric suffix for each generated id family.
///
/// Persisted with the state so ids stay unique after eviction, resolution
/// and restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    pub event: u64,
    pub log: u64,
    pub escalation: u64,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            event: seed::NEXT_EVENT_SEQ,
            log: seed::NEXT_LOG_SEQ,
            escalation: seed::NEXT_ESCALATION_SEQ,
        }
    }
}

impl Sequences {
    fn next_event_id(&mut self) -> String {
        let n = self.event;
        self.event += 1;
        format!("EVT-{n}")
    }

    fn next_log_id(&mut self) -> String {
        let n = self.log;
        self.log += 1;
        format!("LOG-{n:03}")
    }

    fn next_escalation_id(&mut self) -> String {
        let n = self.escalation;
        self.escalation += 1;
        format!("ESC-{n:03}")
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The durable record: the aggregate plus its id sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub state: SystemState,
    #[serde(default)]
    pub sequences: Sequences,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Snapshot {
    pub fn baseline(now: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state: seed::baseline_state(now),
            sequences: Sequences::default(),
        }
    }

    // ---------------------------------------------------------------------------
    // Encoding
    // ---------------------------------------------------------------------------

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a stored snapshot. Unreadable bytes are `CorruptState`, never
    /// silently replaced.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_slice(bytes).map_err(|e| GtmError::CorruptState(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GtmError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    // ---------------------------------------------------------------------------
    // Appends
    // ---------------------------------------------------------------------------

    pub fn record_event(
        &mut self,
        agent: AgentName,
        action: impl Into<String>,
        status: EventStatus,
        now: DateTime<Utc>,
    ) -> String {
        let id = self.sequences.next_event_id();
        self.state.events.push(Event {
            id: id.clone(),
            timestamp: now,
            agent,
            action: action.into(),
            status,
        });
        id
    }

    pub fn record_log(
        &mut self,
        agent: AgentName,
        log_type: LogType,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> String {
        let id = self.sequences.next_log_id();
        self.state.agent_logs.push(AgentLog {
            id: id.clone(),
            timestamp: now,
            agent,
            log_type,
            content: content.into(),
        });
        id
    }

    pub fn open_escalation(
        &mut self,
        agent: AgentName,
        reason: impl Into<String>,
        details: impl Into<String>,
        now: DateTime<Utc>,
    ) -> String {
        let id = self.sequences.next_escalation_id();
        self.state.escalations.push(Escalation {
            id: id.clone(),
            agent,
            reason: reason.into(),
            details: details.into(),
            created_at: now,
        });
        id
    }

    // ---------------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------------

    /// Remove a pending escalation and record the decision.
    ///
    /// Returns the confirmation message. Not idempotent: a second call for
    /// the same id fails with `EscalationNotFound`.
    pub fn resolve_escalation(
        &mut self,
        id: &str,
        action: EscalationAction,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let pos = self
            .state
            .escalations
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GtmError::EscalationNotFound(id.to_string()))?;
        let escalation = self.state.escalations.remove(pos);

        let verb = match action {
            EscalationAction::Approve => "Approved",
            EscalationAction::Deny => "Denied",
        };
        self.record_event(
            AgentName::Orchestrator,
            format!("{verb} escalation {id}: {}", escalation.reason),
            EventStatus::Ok,
            now,
        );

        Ok(format!("Escalation {id} {}.", action.past_tense()))
    }

    /// Replace the stored config with the same id, wholesale.
    pub fn update_agent_config(
        &mut self,
        config: AgentConfig,
        now: DateTime<Utc>,
    ) -> Result<AgentConfig> {
        if config.id.trim().is_empty() {
            return Err(GtmError::InvalidRequest("agent config id is required".into()));
        }
        let slot = self
            .state
            .agent_configs
            .iter_mut()
            .find(|c| c.id == config.id)
            .ok_or_else(|| GtmError::ConfigNotFound(config.id.clone()))?;
        *slot = config.clone();

        self.record_event(
            AgentName::Orchestrator,
            format!("Updated config for {}", config.name),
            EventStatus::Info,
            now,
        );
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
