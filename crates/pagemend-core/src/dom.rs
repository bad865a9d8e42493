//! Capability interface over a live document.
//!
//! Scanners only ever see a `&mut dyn Document`. The browser host implements
//! it over `web_sys`; everything else (tests, the offline driver) uses
//! [`MemoryDocument`](crate::memory::MemoryDocument).

use crate::error::DomError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an element. Valid until the element is removed or its
/// parent cleared; after that the slot may be reused, and the generation
/// makes the old handle fail with [`DomError::NodeNotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}.{}", self.index, self.generation)
        }
    }
}

/// Rule selectors of one stylesheet, or the reason it could not be read.
pub type SheetRules = Result<Vec<String>, DomError>;

pub trait Document {
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError>;

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    fn body(&self) -> Option<NodeId>;

    /// Lower-case tag name.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError>;

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError>;

    /// Returns whether the class is present afterwards.
    fn toggle_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError>;

    fn text_content(&self, node: NodeId) -> String;

    /// Replaces all children with a single text run.
    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError>;

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Inserts `node` into `reference`'s parent, directly after `reference`.
    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError>;

    /// Removes every child and releases their handles.
    fn clear_children(&mut self, node: NodeId) -> Result<(), DomError>;

    /// Detaches `node` and releases its handle and those of its descendants.
    fn remove_node(&mut self, node: NodeId) -> Result<(), DomError>;

    fn style_sheets(&self) -> Vec<SheetRules>;

    fn has_global_function(&self, name: &str) -> bool;

    fn dispatch_event(&mut self, node: NodeId, event_type: &str) -> Result<(), DomError>;
}
