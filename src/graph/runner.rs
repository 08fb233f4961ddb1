use crate::graph::Graph;
use anyhow::Result;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of passes to run; `None` runs until Ctrl-C.
    pub steps: Option<u64>,
    pub interval: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: None,
            interval: Duration::from_millis(100),
        }
    }
}

/// Drives `Graph::run_step` on a fixed interval.
///
/// `on_step` is called after every pass. Returns the number of passes run.
pub async fn run_graph(
    graph: &mut Graph,
    config: &RunConfig,
    mut on_step: impl FnMut(&Graph),
) -> Result<u64> {
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut completed = 0u64;

    loop {
        if config.steps.is_some_and(|limit| completed >= limit) {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                graph.run_step()?;
                completed += 1;
                on_step(graph);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping runner");
                break;
            }
        }
    }

    info!(steps = completed, "Runner finished");
    Ok(completed)
}
