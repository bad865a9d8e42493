use super::{RepairContext, Scanner};
use crate::config::schema::ImageConfig;
use crate::dom::NodeId;
use crate::error::DomError;
use crate::log::Category;
use std::collections::BTreeSet;

pub const ERROR_CLASS: &str = "auto-repair-error";

/// One-shot load-error handlers, at most one per image for the session.
#[derive(Debug, Clone, Default)]
pub struct ImageWatch {
    armed: BTreeSet<NodeId>,
    handled: BTreeSet<NodeId>,
    newly_armed: Vec<NodeId>,
}

impl ImageWatch {
    /// Returns false if the image is already armed or its handler has fired.
    pub fn arm(&mut self, node: NodeId) -> bool {
        if self.handled.contains(&node) || !self.armed.insert(node) {
            return false;
        }
        self.newly_armed.push(node);
        true
    }

    /// Consumes the handler. Returns false if there was none to fire.
    pub fn disarm(&mut self, node: NodeId) -> bool {
        if !self.armed.remove(&node) {
            return false;
        }
        self.handled.insert(node);
        true
    }

    pub fn is_armed(&self, node: NodeId) -> bool {
        self.armed.contains(&node)
    }

    /// Images armed since the last call, for hosts that attach real listeners.
    pub fn take_newly_armed(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.newly_armed)
    }

    pub fn clear(&mut self) {
        self.armed.clear();
        self.handled.clear();
        self.newly_armed.clear();
    }
}

fn file_name(src: &str) -> &str {
    src.rsplit('/').next().unwrap_or(src)
}

pub struct ImageScanner {
    config: ImageConfig,
}

impl ImageScanner {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }
}

impl Scanner for ImageScanner {
    fn name(&self) -> &'static str {
        "images"
    }

    fn scan(&self, cx: &mut RepairContext<'_>) -> Result<(), DomError> {
        for img in cx.doc.query_selector_all("img")? {
            let alt = cx.doc.attribute(img, "alt").unwrap_or_default();
            if alt.trim().is_empty() {
                cx.doc.set_attribute(img, "alt", &self.config.placeholder_alt)?;
                cx.flash(img)?;
                let src = cx.doc.attribute(img, "src").unwrap_or_default();
                cx.fixed(
                    Category::Image,
                    format!("Added missing alt text: {}", file_name(&src)),
                );
            }
            cx.images().arm(img);
        }
        Ok(())
    }
}

/// What runs when an armed image reports a load failure.
pub struct ImageFailureHandler {
    config: ImageConfig,
}

impl ImageFailureHandler {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    fn is_cdn(&self, src: &str) -> bool {
        self.config.cdn_domains.iter().any(|d| src.contains(d.as_str()))
    }

    pub fn handle(&self, cx: &mut RepairContext<'_>, img: NodeId) -> Result<(), DomError> {
        let src = cx.doc.attribute(img, "src").unwrap_or_default();
        if self.is_cdn(&src) {
            cx.doc.set_style(img, "background-color", "#f5f5f5")?;
            cx.doc.set_style(img, "border", "1px dashed #ccc")?;
            cx.doc.set_attribute(img, "title", &self.config.failed_title)?;
            cx.doc.add_class(img, ERROR_CLASS)?;
            cx.fixed(
                Category::Image,
                format!("Image failed to load, applied fallback style: {src}"),
            );
        } else {
            cx.doc.set_attribute(img, &self.config.recovery_attribute, &src)?;
            cx.doc.set_attribute(img, "src", &self.config.placeholder_src)?;
            cx.doc.add_class(img, ERROR_CLASS)?;
            cx.fixed(
                Category::Image,
                format!("Placeholder set for failed image: {src}"),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_fires_once() {
        let mut watch = ImageWatch::default();
        let img = NodeId::new(3, 0);
        assert!(watch.arm(img));
        assert!(!watch.arm(img));
        assert_eq!(watch.take_newly_armed(), vec![img]);
        assert!(watch.disarm(img));
        assert!(!watch.disarm(img));
        assert!(!watch.arm(img));
        assert!(watch.take_newly_armed().is_empty());
    }

    #[test]
    fn file_name_of_source() {
        assert_eq!(file_name("https://cdn.example/a/b/logo.png"), "logo.png");
        assert_eq!(file_name("logo.png"), "logo.png");
    }
}
