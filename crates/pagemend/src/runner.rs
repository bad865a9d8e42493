//! Drives an agent against an in-memory page the way a browser host would.

use pagemend_core::clock::Clock;
use pagemend_core::dom::Document;
use pagemend_core::{MemoryDocument, PageRepairAgent};
use std::time::Duration;
use tracing::{debug, info};

pub struct RunOptions {
    /// Total checks to run, including the one at start-up.
    pub cycles: u32,
    /// Keep polling until Ctrl-C instead of stopping after `cycles`.
    pub watch: bool,
    /// Image sources whose load should be reported as failed.
    pub broken_images: Vec<String>,
    /// Host heartbeat period.
    pub tick: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cycles: 1,
            watch: false,
            broken_images: Vec::new(),
            tick: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u32,
    pub image_failures: usize,
}

fn report_broken_images<C: Clock>(
    agent: &mut PageRepairAgent<C>,
    doc: &mut MemoryDocument,
    broken: &[String],
) -> usize {
    let mut fired = 0;
    for img in agent.take_newly_armed_images() {
        let src = doc.attribute(img, "src").unwrap_or_default();
        if broken.iter().any(|b| *b == src) && agent.handle_image_error(doc, img) {
            fired += 1;
        }
    }
    fired
}

/// Runs the agent and tears it down afterwards, leaving `doc` holding the
/// repaired page without the agent's UI.
pub async fn run<C: Clock>(
    agent: &mut PageRepairAgent<C>,
    doc: &mut MemoryDocument,
    options: &RunOptions,
) -> RunSummary {
    agent.init(doc);
    let mut summary = RunSummary {
        cycles: 1,
        image_failures: report_broken_images(agent, doc, &options.broken_images),
    };

    let mut ticker = tokio::time::interval(options.tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    while options.watch || summary.cycles < options.cycles {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c(), if options.watch => {
                info!("interrupted, stopping");
                break;
            }
        }
        if agent.poll(doc) {
            summary.cycles += 1;
            debug!(cycle = summary.cycles, "scheduled check ran");
        }
        summary.image_failures += report_broken_images(agent, doc, &options.broken_images);
    }

    agent.teardown(doc);
    summary
}
