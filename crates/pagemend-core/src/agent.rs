//! The repair agent: owns the log, the schedule and the scanners, and is the
//! single entry point hosts talk to.

use crate::clock::{Clock, SystemClock};
use crate::config::PageMendConfig;
use crate::dom::{Document, NodeId};
use crate::flash::FlashTracker;
use crate::log::{Category, LogEntry, RepairLog};
use crate::panel::{LogPanel, PanelAction};
use crate::scanner::{self, ImageFailureHandler, ImageWatch, RepairContext, Scanner};
use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// An uncaught runtime error as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub message: String,
    pub filename: String,
    pub lineno: u32,
}

pub struct PageRepairAgent<C: Clock = SystemClock> {
    config: PageMendConfig,
    clock: C,
    log: RepairLog,
    flashes: FlashTracker,
    images: ImageWatch,
    scanners: Vec<Box<dyn Scanner>>,
    image_failures: ImageFailureHandler,
    scheduler: Scheduler,
    panel: Option<LogPanel>,
    lifecycle: Lifecycle,
}

impl PageRepairAgent<SystemClock> {
    pub fn new(config: PageMendConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

/// Builds a [`RepairContext`] from disjoint fields so the scanner list can be
/// borrowed alongside it.
macro_rules! context {
    ($agent:expr, $doc:expr) => {
        RepairContext::new(
            $doc,
            &mut $agent.log,
            &mut $agent.flashes,
            &mut $agent.images,
            $agent.panel,
            $agent.config.log.panel_entries,
            $agent.clock.now(),
        )
    };
}

impl<C: Clock> PageRepairAgent<C> {
    pub fn with_clock(config: PageMendConfig, clock: C) -> Self {
        Self {
            log: RepairLog::new(config.log.capacity),
            flashes: FlashTracker::new(config.scheduler.flash_duration_ms),
            images: ImageWatch::default(),
            scanners: scanner::default_scanners(&config),
            image_failures: ImageFailureHandler::new(config.images.clone()),
            scheduler: Scheduler::new(config.scheduler.interval_ms),
            panel: None,
            lifecycle: Lifecycle::Created,
            config,
            clock,
        }
    }

    /// Replaces the scanner list. Order is run order.
    pub fn with_scanners(mut self, scanners: Vec<Box<dyn Scanner>>) -> Self {
        self.scanners = scanners;
        self
    }

    pub fn config(&self) -> &PageMendConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn log(&self) -> &RepairLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut RepairLog {
        &mut self.log
    }

    /// Snapshot of the session log, oldest first.
    pub fn repair_log(&self) -> Vec<LogEntry> {
        self.log.to_vec()
    }

    pub fn panel(&self) -> Option<LogPanel> {
        self.panel
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn pending_flashes(&self) -> usize {
        self.flashes.pending()
    }

    /// Installs the UI, runs the first full check and starts the schedule.
    pub fn init(&mut self, doc: &mut dyn Document) {
        if self.lifecycle == Lifecycle::Running {
            return;
        }
        tracing::info!("page repair agent started");
        self.panel = match doc.body() {
            Some(body) => match LogPanel::install(doc, body) {
                Ok(panel) => Some(panel),
                Err(e) => {
                    tracing::warn!("could not install repair panel: {}", e);
                    None
                }
            },
            None => {
                tracing::warn!("document has no body, repair panel disabled");
                None
            }
        };
        self.lifecycle = Lifecycle::Running;
        self.run_full_check(doc);
        self.scheduler.mark_ran(self.clock.now());
    }

    /// Runs every scanner in order. A failing scanner ends the cycle; the
    /// failure is logged and the schedule carries on.
    pub fn run_full_check(&mut self, doc: &mut dyn Document) {
        let scanners = std::mem::take(&mut self.scanners);
        {
            let mut cx = context!(self, doc);
            cx.info(
                Category::System,
                "Starting full check of page content and structure",
            );
            let failure = scanners
                .iter()
                .find_map(|s| s.scan(&mut cx).err().map(|e| (s.name(), e)));
            match failure {
                Some((name, e)) => {
                    tracing::error!(scanner = name, "full check aborted: {}", e);
                    cx.error(
                        Category::SystemError,
                        format!("Error during check ({name}): {e}"),
                    );
                }
                None => cx.info(Category::System, "Full check complete"),
            }
        }
        self.scanners = scanners;
    }

    /// Host heartbeat: expires flash indicators and runs the scheduled check
    /// when due. Returns whether a check ran.
    pub fn poll(&mut self, doc: &mut dyn Document) -> bool {
        let now = self.clock.now();
        self.flashes.expire(doc, now);
        if self.lifecycle != Lifecycle::Running || !self.scheduler.take_due(now) {
            return false;
        }
        self.run_full_check(doc);
        true
    }

    pub fn expire_flashes(&mut self, doc: &mut dyn Document) -> usize {
        self.flashes.expire(doc, self.clock.now())
    }

    /// Images armed since the last call; browser hosts attach one-shot
    /// listeners to these.
    pub fn take_newly_armed_images(&mut self) -> Vec<NodeId> {
        self.images.take_newly_armed()
    }

    /// Fires the image's one-shot failure handler. Returns false when the
    /// image was never armed or has already been handled.
    pub fn handle_image_error(&mut self, doc: &mut dyn Document, img: NodeId) -> bool {
        if !self.images.disarm(img) {
            return false;
        }
        let mut cx = context!(self, doc);
        if let Err(e) = self.image_failures.handle(&mut cx, img) {
            cx.error(
                Category::SystemError,
                format!("Error while repairing image {img}: {e}"),
            );
        }
        true
    }

    pub fn report_uncaught_error(&mut self, doc: &mut dyn Document, report: &ErrorReport) {
        let mut cx = context!(self, doc);
        cx.error(
            Category::GlobalError,
            format!(
                "Error: {}, source: {}, line: {}",
                report.message, report.filename, report.lineno
            ),
        );
    }

    pub fn report_unhandled_rejection(&mut self, doc: &mut dyn Document, reason: &str) {
        let mut cx = context!(self, doc);
        cx.error(Category::UnhandledRejection, format!("Reason: {reason}"));
    }

    /// Returns whether the panel is visible afterwards.
    pub fn toggle_log_panel(&mut self, doc: &mut dyn Document) -> bool {
        let Some(panel) = self.panel else {
            return false;
        };
        panel.toggle(doc).unwrap_or_else(|e| {
            tracing::warn!("could not toggle repair panel: {}", e);
            false
        })
    }

    /// Routes a click on one of the control buttons.
    pub fn handle_click(&mut self, doc: &mut dyn Document, node: NodeId) -> Option<PanelAction> {
        let action = self.panel?.action_for(node)?;
        self.perform(doc, action);
        Some(action)
    }

    pub fn perform(&mut self, doc: &mut dyn Document, action: PanelAction) {
        match action {
            PanelAction::Check => self.run_full_check(doc),
            PanelAction::ToggleLog => {
                self.toggle_log_panel(doc);
            }
        }
    }

    /// Removes the UI and pending indicators and stops the schedule. The log
    /// stays readable until the agent is dropped.
    pub fn teardown(&mut self, doc: &mut dyn Document) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }
        self.flashes.clear(doc);
        if let Some(panel) = self.panel.take()
            && let Err(e) = panel.remove(doc)
        {
            tracing::warn!("could not remove repair panel: {}", e);
        }
        self.images.clear();
        self.scheduler.reset();
        self.lifecycle = Lifecycle::Stopped;
        tracing::info!("page repair agent stopped");
    }
}
