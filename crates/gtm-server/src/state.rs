use crate::agent::AgentHandle;

/// Shared application state passed to all route handlers.
///
/// Holds the address of the one orchestration agent; constructed once at
/// startup after activation has finished.
#[derive(Clone)]
pub struct AppState {
    pub agent: AgentHandle,
}

impl AppState {
    pub fn new(agent: AgentHandle) -> Self {
        Self { agent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentOptions;
    use gtm_core::store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn clones_share_one_agent() {
        let agent = AgentHandle::activate(Arc::new(MemoryStore::new()), AgentOptions::default())
            .await
            .unwrap();
        let state = AppState::new(agent);
        let other = state.clone();
        other
            .agent
            .resolve_escalation("ESC-001", gtm_core::model::EscalationAction::Approve)
            .await
            .unwrap();
        assert!(state.agent.escalations().await.unwrap().is_empty());
    }
}
