//! Floating log panel and control buttons injected into the page body.

use crate::dom::{Document, NodeId};
use crate::error::DomError;
use crate::log::LogEntry;
use chrono::Local;

pub const PANEL_CLASS: &str = "repair-log-panel";
pub const CONTROL_CLASS: &str = "repair-control-panel";
pub const ENTRIES_ID: &str = "repair-log-entries";
pub const VISIBLE_CLASS: &str = "visible";
pub const ACTION_ATTRIBUTE: &str = "data-repair-action";

/// What a control button asks the agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Check,
    ToggleLog,
}

impl PanelAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PanelAction::Check => "check",
            PanelAction::ToggleLog => "toggle-log",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "check" => Some(PanelAction::Check),
            "toggle-log" => Some(PanelAction::ToggleLog),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPanel {
    pub panel: NodeId,
    pub entries: NodeId,
    pub controls: NodeId,
    pub check_button: NodeId,
    pub log_button: NodeId,
}

impl LogPanel {
    /// Builds both panels and appends them to `body`.
    pub fn install(doc: &mut dyn Document, body: NodeId) -> Result<Self, DomError> {
        let panel = doc.create_element("div")?;
        doc.set_attribute(panel, "class", PANEL_CLASS)?;
        let heading = doc.create_element("h4")?;
        doc.set_text_content(heading, "Repair Log")?;
        doc.append_child(panel, heading)?;
        let entries = doc.create_element("div")?;
        doc.set_attribute(entries, "id", ENTRIES_ID)?;
        doc.append_child(panel, entries)?;
        doc.append_child(body, panel)?;

        let controls = doc.create_element("div")?;
        doc.set_attribute(controls, "class", CONTROL_CLASS)?;
        let check_button = button(doc, "Check", "btn-primary", PanelAction::Check)?;
        let log_button = button(doc, "View Log", "btn-secondary", PanelAction::ToggleLog)?;
        doc.append_child(controls, check_button)?;
        doc.append_child(controls, log_button)?;
        doc.append_child(body, controls)?;

        Ok(Self {
            panel,
            entries,
            controls,
            check_button,
            log_button,
        })
    }

    /// Shows `recent`, oldest first. Existing rows are rewritten in place;
    /// rows are only created or removed when the count changes.
    pub fn render<'e>(
        &self,
        doc: &mut dyn Document,
        recent: impl Iterator<Item = &'e LogEntry>,
    ) -> Result<(), DomError> {
        let mut rows = doc.children(self.entries).into_iter();
        for entry in recent {
            let row = match rows.next() {
                Some(row) => row,
                None => new_row(doc, self.entries)?,
            };
            let cells = doc.children(row);
            let [time, kind, message] = cells[..] else {
                return Err(DomError::Host(format!("log row {row} lost its cells")));
            };
            let stamp = entry.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string();
            doc.set_text_content(time, &stamp)?;
            doc.set_text_content(kind, entry.category.label())?;
            doc.set_text_content(message, &entry.message)?;
        }
        for stale in rows {
            doc.remove_node(stale)?;
        }
        Ok(())
    }

    /// Returns whether the panel is visible afterwards.
    pub fn toggle(&self, doc: &mut dyn Document) -> Result<bool, DomError> {
        doc.toggle_class(self.panel, VISIBLE_CLASS)
    }

    pub fn action_for(&self, node: NodeId) -> Option<PanelAction> {
        if node == self.check_button {
            Some(PanelAction::Check)
        } else if node == self.log_button {
            Some(PanelAction::ToggleLog)
        } else {
            None
        }
    }

    pub fn remove(&self, doc: &mut dyn Document) -> Result<(), DomError> {
        doc.remove_node(self.panel)?;
        doc.remove_node(self.controls)
    }
}

fn new_row(doc: &mut dyn Document, entries: NodeId) -> Result<NodeId, DomError> {
    let row = doc.create_element("div")?;
    doc.set_attribute(row, "class", "repair-log-entry")?;
    for class in ["repair-log-timestamp", "repair-log-type", "repair-log-message"] {
        let cell = doc.create_element("div")?;
        doc.set_attribute(cell, "class", class)?;
        doc.append_child(row, cell)?;
    }
    doc.append_child(entries, row)?;
    Ok(row)
}

fn button(
    doc: &mut dyn Document,
    label: &str,
    class: &str,
    action: PanelAction,
) -> Result<NodeId, DomError> {
    let node = doc.create_element("button")?;
    doc.set_attribute(node, "class", class)?;
    doc.set_attribute(node, ACTION_ATTRIBUTE, action.as_str())?;
    doc.set_text_content(node, label)?;
    Ok(node)
}
