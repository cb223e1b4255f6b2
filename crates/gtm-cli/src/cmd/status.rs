use crate::output::{print_json, print_table, Align};
use anyhow::Context;
use gtm_core::config::ServerConfig;
use gtm_core::store::{RedbStore, StateStore};
use std::path::Path;

/// Number of events shown in the table view.
const RECENT_EVENTS: usize = 10;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = ServerConfig::load(root).context("failed to read config.yaml")?;
    let db_path = config.db_path(root);
    if !db_path.exists() {
        println!("No persisted state at {}. Run `gtm init`.", db_path.display());
        return Ok(());
    }

    let store = RedbStore::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    let Some(snapshot) = store.load()? else {
        println!("No persisted state at {}. Run `gtm init`.", db_path.display());
        return Ok(());
    };
    let state = snapshot.state;

    if json {
        return print_json(&state);
    }

    let metrics: Vec<[String; 2]> = state
        .metrics
        .iter()
        .map(|m| [m.label.clone(), m.value.clone()])
        .collect();
    print_table([("METRIC", Align::Left), ("VALUE", Align::Right)], &metrics);

    println!();
    if state.escalations.is_empty() {
        println!("No pending escalations.");
    } else {
        let escalations: Vec<[String; 3]> = state
            .escalations
            .iter()
            .map(|e| [e.id.clone(), e.agent.to_string(), e.reason.clone()])
            .collect();
        print_table(
            [
                ("ESCALATION", Align::Left),
                ("AGENT", Align::Left),
                ("REASON", Align::Left),
            ],
            &escalations,
        );
    }

    println!();
    let configs: Vec<[String; 5]> = state
        .agent_configs
        .iter()
        .map(|c| {
            [
                c.id.clone(),
                c.name.to_string(),
                if c.enabled { "yes" } else { "no" }.to_string(),
                c.api_quota_per_day.to_string(),
                c.risk_threshold.to_string(),
            ]
        })
        .collect();
    print_table(
        [
            ("CONFIG", Align::Left),
            ("AGENT", Align::Left),
            ("ENABLED", Align::Left),
            ("QUOTA/DAY", Align::Right),
            ("RISK", Align::Left),
        ],
        &configs,
    );

    println!();
    let events: Vec<[String; 5]> = state
        .events
        .iter()
        .rev()
        .take(RECENT_EVENTS)
        .map(|e| {
            [
                e.id.clone(),
                e.timestamp.format("%H:%M:%S").to_string(),
                e.agent.to_string(),
                e.status.to_string(),
                e.action.clone(),
            ]
        })
        .collect();
    print_table(
        [
            ("EVENT", Align::Left),
            ("TIME", Align::Left),
            ("AGENT", Align::Left),
            ("STATUS", Align::Left),
            ("ACTION", Align::Left),
        ],
        &events,
    );

    Ok(())
}
