//! Check-and-repair passes over the document.
//!
//! Every scanner is stateless and idempotent: a second pass over a document
//! it already repaired finds nothing left to do.

pub mod feature;
pub mod images;
pub mod links;
pub mod scripts;
pub mod structure;
pub mod styles;

use crate::dom::{Document, NodeId};
use crate::error::DomError;
use crate::flash::FlashTracker;
use crate::log::{Category, LogEntry, RepairLog, Severity};
use crate::panel::LogPanel;
use chrono::{DateTime, Utc};

pub use feature::FeatureScanner;
pub use images::{ImageFailureHandler, ImageScanner, ImageWatch};
pub use links::LinkScanner;
pub use scripts::ScriptScanner;
pub use structure::StructureScanner;
pub use styles::StyleScanner;

pub trait Scanner {
    fn name(&self) -> &'static str;

    fn scan(&self, cx: &mut RepairContext<'_>) -> Result<(), DomError>;
}

/// Everything a scanner may touch during one pass.
pub struct RepairContext<'a> {
    pub doc: &'a mut dyn Document,
    log: &'a mut RepairLog,
    flashes: &'a mut FlashTracker,
    images: &'a mut ImageWatch,
    panel: Option<LogPanel>,
    panel_entries: usize,
    now: DateTime<Utc>,
}

impl<'a> RepairContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        doc: &'a mut dyn Document,
        log: &'a mut RepairLog,
        flashes: &'a mut FlashTracker,
        images: &'a mut ImageWatch,
        panel: Option<LogPanel>,
        panel_entries: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            doc,
            log,
            flashes,
            images,
            panel,
            panel_entries,
            now,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Log sink: append, mirror, re-render the panel.
    pub fn record(&mut self, category: Category, severity: Severity, message: impl Into<String>) {
        self.log.append(LogEntry {
            timestamp: self.now,
            category,
            severity,
            message: message.into(),
        });
        if let Some(panel) = self.panel
            && let Err(e) = panel.render(&mut *self.doc, self.log.recent(self.panel_entries))
        {
            tracing::warn!("failed to render repair log panel: {}", e);
        }
    }

    pub fn info(&mut self, category: Category, message: impl Into<String>) {
        self.record(category, Severity::Info, message);
    }

    pub fn warn(&mut self, category: Category, message: impl Into<String>) {
        self.record(category, Severity::Warning, message);
    }

    pub fn fixed(&mut self, category: Category, message: impl Into<String>) {
        self.record(category, Severity::Fix, message);
    }

    pub fn error(&mut self, category: Category, message: impl Into<String>) {
        self.record(category, Severity::Error, message);
    }

    pub fn flash(&mut self, node: NodeId) -> Result<(), DomError> {
        self.flashes.flash(&mut *self.doc, node, self.now)
    }

    pub fn images(&mut self) -> &mut ImageWatch {
        &mut *self.images
    }
}

/// The built-in passes in the order a full check runs them.
pub fn default_scanners(config: &crate::config::PageMendConfig) -> Vec<Box<dyn Scanner>> {
    vec![
        Box::new(StructureScanner::new(config.structure.clone())),
        Box::new(LinkScanner::new(config.links.clone())),
        Box::new(ImageScanner::new(config.images.clone())),
        Box::new(StyleScanner::new(config.styles.clone())),
        Box::new(ScriptScanner::new(config.scripts.clone(), config.feature.clone())),
        Box::new(FeatureScanner::new(config.feature.clone())),
    ]
}
