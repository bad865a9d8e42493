//! Temporary "just fixed" indicators.

use crate::dom::{Document, NodeId};
use crate::error::DomError;
use crate::clock::{deadline, millis};
use chrono::{DateTime, Duration, Utc};

pub const FIXED_CLASS: &str = "auto-repair-fixed";

#[derive(Debug, Clone)]
pub struct FlashTracker {
    duration: Duration,
    pending: Vec<(NodeId, DateTime<Utc>)>,
}

impl FlashTracker {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration: millis(duration_ms),
            pending: Vec::new(),
        }
    }

    /// Adds the flash class; re-flashing a node pushes its deadline out.
    pub fn flash(
        &mut self,
        doc: &mut dyn Document,
        node: NodeId,
        now: DateTime<Utc>,
    ) -> Result<(), DomError> {
        doc.add_class(node, FIXED_CLASS)?;
        let until = deadline(now, self.duration);
        match self.pending.iter_mut().find(|(n, _)| *n == node) {
            Some((_, due)) => *due = until,
            None => self.pending.push((node, until)),
        }
        Ok(())
    }

    /// Removes the class from every node whose deadline has passed.
    pub fn expire(&mut self, doc: &mut dyn Document, now: DateTime<Utc>) -> usize {
        let (due, keep): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|(_, d)| *d <= now);
        self.pending = keep;
        for (node, _) in &due {
            if let Err(e) = doc.remove_class(*node, FIXED_CLASS) {
                tracing::debug!("flash on {} outlived its node: {}", node, e);
            }
        }
        due.len()
    }

    /// Drops every pending flash immediately.
    pub fn clear(&mut self, doc: &mut dyn Document) {
        for (node, _) in self.pending.drain(..) {
            if let Err(e) = doc.remove_class(node, FIXED_CLASS) {
                tracing::debug!("flash on {} outlived its node: {}", node, e);
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;

    #[test]
    fn huge_duration_never_expires() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let link = doc.append_element(body, "a", &[]);
        let mut flashes = FlashTracker::new(u64::MAX);
        let start = DateTime::<Utc>::default();

        flashes.flash(&mut doc, link, start).unwrap();

        assert_eq!(flashes.expire(&mut doc, start + Duration::days(365 * 1000)), 0);
        assert!(doc.has_class(link, FIXED_CLASS));
    }

    #[test]
    fn clear_skips_removed_nodes() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let gone = doc.append_element(body, "a", &[]);
        let kept = doc.append_element(body, "a", &[]);
        let mut flashes = FlashTracker::new(3_000);
        let now = DateTime::<Utc>::default();
        flashes.flash(&mut doc, gone, now).unwrap();
        flashes.flash(&mut doc, kept, now).unwrap();
        doc.remove_node(gone).unwrap();

        flashes.clear(&mut doc);

        assert_eq!(flashes.pending(), 0);
        assert!(!doc.has_class(kept, FIXED_CLASS));
    }
}
