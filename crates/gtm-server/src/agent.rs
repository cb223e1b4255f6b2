//! The orchestration agent: sole owner of the GTM aggregate.
//!
//! One tokio task holds the [`Snapshot`] and processes mailbox requests and
//! simulation ticks strictly one at a time. Callers talk to it through a
//! cloneable [`AgentHandle`]; every request carries a `oneshot` for the reply.
//!
//! Mutations are persist-then-swap: the task mutates a clone, writes the
//! clone to the [`StateStore`] on a blocking thread, and only installs it as
//! the live state once the write succeeded. A failed write leaves the live
//! state exactly as it was.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gtm_core::error::{GtmError, Result};
use gtm_core::model::{
    AgentConfig, AgentLog, AnalyticsDataPoint, Escalation, EscalationAction, Event, Metric,
    MissionParameter, SystemState,
};
use gtm_core::simulation;
use gtm_core::state::Snapshot;
use gtm_core::store::StateStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub tick_interval: Duration,
    /// Bound on queued requests. A full mailbox rejects with `NotReady`.
    pub mailbox_capacity: usize,
    /// Fixed seed for the simulation RNG; `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
            mailbox_capacity: 64,
            rng_seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Mailbox protocol
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Request {
    FullStatus(oneshot::Sender<SystemState>),
    Metrics(oneshot::Sender<Vec<Metric>>),
    MissionParameters(oneshot::Sender<Vec<MissionParameter>>),
    Escalations(oneshot::Sender<Vec<Escalation>>),
    Events(oneshot::Sender<Vec<Event>>),
    AgentLogs(oneshot::Sender<Vec<AgentLog>>),
    AgentConfigs(oneshot::Sender<Vec<AgentConfig>>),
    Analytics(oneshot::Sender<Vec<AnalyticsDataPoint>>),
    ResolveEscalation {
        id: String,
        action: EscalationAction,
        reply: oneshot::Sender<Result<String>>,
    },
    UpdateAgentConfig {
        config: AgentConfig,
        reply: oneshot::Sender<Result<AgentConfig>>,
    },
    StartSimulation(oneshot::Sender<bool>),
    Shutdown(oneshot::Sender<()>),
}

// ---------------------------------------------------------------------------
// AgentHandle
// ---------------------------------------------------------------------------

/// Cheap, cloneable address of the singleton orchestration agent.
#[derive(Clone)]
pub struct AgentHandle {
    tx: mpsc::Sender<Request>,
}

impl AgentHandle {
    /// Load (or seed) the aggregate, spawn the agent task and start the
    /// simulation timer.
    ///
    /// Returns only once the state is fully loaded, so no request can ever
    /// see a half-initialized aggregate. Unreadable persisted state is an
    /// error: the agent refuses to start rather than reseeding over it.
    pub async fn activate(store: Arc<dyn StateStore>, options: AgentOptions) -> Result<Self> {
        let loader = Arc::clone(&store);
        let loaded = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(join_err)??;

        let snapshot = match loaded {
            Some(snapshot) => {
                tracing::info!(
                    escalations = snapshot.state.escalations.len(),
                    events = snapshot.state.events.len(),
                    "orchestration agent rehydrated from storage"
                );
                snapshot
            }
            None => {
                let baseline = Snapshot::baseline(Utc::now());
                let writer = Arc::clone(&store);
                let snapshot = tokio::task::spawn_blocking(move || {
                    writer.save(&baseline).map(|()| baseline)
                })
                .await
                .map_err(join_err)??;
                tracing::info!("orchestration agent seeded from baseline");
                snapshot
            }
        };

        let rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (tx, rx) = mpsc::channel(options.mailbox_capacity.max(1));
        let agent = OrchestrationAgent {
            snapshot,
            store,
            rng,
            tick_interval: options.tick_interval,
            ticker: None,
            rx,
        };
        tokio::spawn(agent.run());

        let handle = Self { tx };
        handle.start_simulation().await?;
        Ok(handle)
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.try_send(make(reply)).map_err(|e| match e {
            TrySendError::Full(_) => GtmError::NotReady,
            TrySendError::Closed(_) => GtmError::Internal("orchestration agent stopped".into()),
        })?;
        rx.await
            .map_err(|_| GtmError::Internal("orchestration agent dropped the request".into()))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn full_status(&self) -> Result<SystemState> {
        self.call(Request::FullStatus).await
    }

    pub async fn metrics(&self) -> Result<Vec<Metric>> {
        self.call(Request::Metrics).await
    }

    pub async fn mission_parameters(&self) -> Result<Vec<MissionParameter>> {
        self.call(Request::MissionParameters).await
    }

    pub async fn escalations(&self) -> Result<Vec<Escalation>> {
        self.call(Request::Escalations).await
    }

    /// Most recent first.
    pub async fn events(&self) -> Result<Vec<Event>> {
        self.call(Request::Events).await
    }

    pub async fn agent_logs(&self) -> Result<Vec<AgentLog>> {
        self.call(Request::AgentLogs).await
    }

    pub async fn agent_configs(&self) -> Result<Vec<AgentConfig>> {
        self.call(Request::AgentConfigs).await
    }

    pub async fn analytics(&self) -> Result<Vec<AnalyticsDataPoint>> {
        self.call(Request::Analytics).await
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Approve or deny a pending escalation. Returns the confirmation text.
    pub async fn resolve_escalation(
        &self,
        id: impl Into<String>,
        action: EscalationAction,
    ) -> Result<String> {
        let id = id.into();
        self.call(|reply| Request::ResolveEscalation { id, action, reply })
            .await?
    }

    /// Replace the agent config with the same id. Returns the stored config.
    pub async fn update_agent_config(&self, config: AgentConfig) -> Result<AgentConfig> {
        self.call(|reply| Request::UpdateAgentConfig { config, reply })
            .await?
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start the simulation timer. Returns `false` if it was already running.
    pub async fn start_simulation(&self) -> Result<bool> {
        self.call(Request::StartSimulation).await
    }

    /// Stop the agent and wait until it has released its store.
    ///
    /// Waits for mailbox space instead of failing with `NotReady`, so
    /// requests queued ahead of it are still answered.
    pub async fn shutdown(&self) -> Result<()> {
        let (ack, rx) = oneshot::channel();
        if self.tx.send(Request::Shutdown(ack)).await.is_err() {
            // Already stopped.
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }
}

fn join_err(e: tokio::task::JoinError) -> GtmError {
    GtmError::Internal(format!("storage task failed: {e}"))
}

// ---------------------------------------------------------------------------
// OrchestrationAgent (task side)
// ---------------------------------------------------------------------------

struct OrchestrationAgent {
    snapshot: Snapshot,
    store: Arc<dyn StateStore>,
    rng: StdRng,
    tick_interval: Duration,
    /// `Some` once the simulation was started; doubles as the started flag.
    ticker: Option<Interval>,
    rx: mpsc::Receiver<Request>,
}

impl OrchestrationAgent {
    async fn run(mut self) {
        let mut shutdown_ack = None;
        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(Request::Shutdown(ack)) => {
                        shutdown_ack = Some(ack);
                        break;
                    }
                    Some(request) => self.handle(request).await,
                    None => break,
                },
                _ = next_tick(&mut self.ticker) => self.on_tick().await,
            }
        }

        // Late shutdown requests get their ack; anything else queued is
        // dropped and its caller sees the agent as stopped.
        self.rx.close();
        while let Ok(request) = self.rx.try_recv() {
            if let Request::Shutdown(ack) = request {
                let _ = ack.send(());
            }
        }

        tracing::info!("orchestration agent stopped");
        drop(self);
        if let Some(ack) = shutdown_ack {
            let _ = ack.send(());
        }
    }

    async fn handle(&mut self, request: Request) {
        let state = &self.snapshot.state;
        match request {
            Request::FullStatus(reply) => {
                let _ = reply.send(state.clone());
            }
            Request::Metrics(reply) => {
                let _ = reply.send(state.metrics.clone());
            }
            Request::MissionParameters(reply) => {
                let _ = reply.send(state.mission_parameters.clone());
            }
            Request::Escalations(reply) => {
                let _ = reply.send(state.escalations.clone());
            }
            Request::Events(reply) => {
                let _ = reply.send(state.events.to_vec_newest_first());
            }
            Request::AgentLogs(reply) => {
                let _ = reply.send(state.agent_logs.to_vec());
            }
            Request::AgentConfigs(reply) => {
                let _ = reply.send(state.agent_configs.clone());
            }
            Request::Analytics(reply) => {
                let _ = reply.send(state.analytics_data.clone());
            }
            Request::ResolveEscalation { id, action, reply } => {
                let result = self.resolve_escalation(&id, action).await;
                let _ = reply.send(result);
            }
            Request::UpdateAgentConfig { config, reply } => {
                let result = self.update_agent_config(config).await;
                let _ = reply.send(result);
            }
            Request::StartSimulation(reply) => {
                let _ = reply.send(self.start_simulation());
            }
            Request::Shutdown(ack) => {
                let _ = ack.send(());
            }
        }
    }

    fn start_simulation(&mut self) -> bool {
        if self.ticker.is_some() {
            return false;
        }
        let period = self.tick_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
        tracing::info!(period_secs = period.as_secs_f64(), "simulation started");
        true
    }

    async fn resolve_escalation(&mut self, id: &str, action: EscalationAction) -> Result<String> {
        let mut next = self.snapshot.clone();
        let message = next.resolve_escalation(id, action, Utc::now())?;
        self.commit(next).await?;
        tracing::info!(escalation = id, ?action, "escalation resolved");
        Ok(message)
    }

    async fn update_agent_config(&mut self, config: AgentConfig) -> Result<AgentConfig> {
        let mut next = self.snapshot.clone();
        let stored = next.update_agent_config(config, Utc::now())?;
        self.commit(next).await?;
        tracing::info!(config = %stored.id, agent = %stored.name, "agent config updated");
        Ok(stored)
    }

    async fn on_tick(&mut self) {
        let mut next = self.snapshot.clone();
        let outcome = simulation::tick(&mut next, &mut self.rng, Utc::now());
        match self.commit(next).await {
            Ok(()) => tracing::debug!(?outcome, "simulation tick committed"),
            Err(e) => tracing::warn!(error = %e, "simulation tick discarded, persist failed"),
        }
    }

    /// Persist `next` and, only on success, make it the live state.
    async fn commit(&mut self, next: Snapshot) -> Result<()> {
        let store = Arc::clone(&self.store);
        let saved = tokio::task::spawn_blocking(move || store.save(&next).map(|()| next))
            .await
            .map_err(join_err)??;
        self.snapshot = saved;
        Ok(())
    }
}

/// Resolves on the next simulation tick, or never if not started.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
