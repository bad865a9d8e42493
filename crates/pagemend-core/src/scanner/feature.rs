//! The download widget: edition selector plus download button.

use super::{RepairContext, Scanner};
use crate::config::schema::FeatureConfig;
use crate::dom::{Document, NodeId};
use crate::error::DomError;
use crate::log::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Widget {
    pub selector: NodeId,
    pub button: NodeId,
}

pub fn find_widget(doc: &dyn Document, config: &FeatureConfig) -> Result<Option<Widget>, DomError> {
    let Some(selector) = doc.element_by_id(&config.version_selector_id) else {
        return Ok(None);
    };
    for candidate in &config.button_selectors {
        if let Some(button) = doc.query_selector(candidate)? {
            return Ok(Some(Widget { selector, button }));
        }
    }
    Ok(None)
}

/// Values of every `option` under `select`, including those in groups.
pub fn option_values(doc: &dyn Document, select: NodeId) -> Vec<String> {
    let mut values = Vec::new();
    let mut stack = doc.children(select);
    stack.reverse();
    while let Some(node) = stack.pop() {
        match doc.tag_name(node).as_deref() {
            Some("option") => values.push(
                doc.attribute(node, "value")
                    .unwrap_or_else(|| doc.text_content(node).trim().to_string()),
            ),
            Some("optgroup") => {
                let mut children = doc.children(node);
                children.reverse();
                stack.extend(children);
            }
            _ => {}
        }
    }
    values
}

pub struct FeatureScanner {
    config: FeatureConfig,
}

impl FeatureScanner {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    fn ensure_button_href(&self, cx: &mut RepairContext<'_>, button: NodeId) -> Result<(), DomError> {
        let href = cx.doc.attribute(button, "href").unwrap_or_default();
        if !href.trim().is_empty() && href != "#" {
            return Ok(());
        }
        cx.warn(
            Category::FeatureFix,
            "Download button link is invalid, setting the default link",
        );
        cx.doc.set_attribute(button, "href", &self.config.fallback_url)?;
        cx.flash(button)?;
        cx.fixed(
            Category::FeatureFix,
            format!("Default download link set: {}", self.config.fallback_url),
        );
        Ok(())
    }

    fn ensure_options(&self, cx: &mut RepairContext<'_>, select: NodeId) -> Result<(), DomError> {
        let existing = option_values(&*cx.doc, select);
        for option in &self.config.options {
            if existing.iter().any(|v| *v == option.value) {
                continue;
            }
            let node = cx.doc.create_element("option")?;
            cx.doc.set_attribute(node, "value", &option.value)?;
            cx.doc.set_text_content(node, &option.label)?;
            cx.doc.append_child(select, node)?;
            cx.flash(select)?;
            cx.fixed(
                Category::FeatureFix,
                format!("Added missing edition option {}: {}", option.value, option.label),
            );
        }
        Ok(())
    }

    fn ensure_hint(&self, cx: &mut RepairContext<'_>, select: NodeId) -> Result<(), DomError> {
        let hint = match cx.doc.query_selector(&format!(".{}", self.config.hint_class))? {
            Some(hint) => hint,
            None => {
                let hint = cx.doc.create_element("p")?;
                cx.doc.set_attribute(hint, "class", &self.config.hint_class)?;
                cx.doc.set_style(hint, "color", "#0078d4")?;
                cx.doc.set_style(hint, "font-weight", "bold")?;
                cx.doc.set_style(hint, "margin-top", "10px")?;
                if cx.doc.parent(select).is_some() {
                    cx.doc.insert_after(select, hint)?;
                }
                cx.fixed(Category::FeatureFix, "Added edition selection hint");
                hint
            }
        };
        cx.doc.set_text_content(hint, &self.config.hint_text)
    }
}

impl Scanner for FeatureScanner {
    fn name(&self) -> &'static str {
        "feature"
    }

    fn scan(&self, cx: &mut RepairContext<'_>) -> Result<(), DomError> {
        cx.info(Category::FeatureCheck, "Checking the download feature");

        let Some(widget) = find_widget(&*cx.doc, &self.config)? else {
            tracing::warn!(
                selector_id = %self.config.version_selector_id,
                buttons = ?self.config.button_selectors,
                "download widget elements not found"
            );
            cx.warn(
                Category::FeatureWarning,
                "Version selector or download button not found, the download feature cannot be repaired",
            );
            return Ok(());
        };

        cx.info(
            Category::FeatureCheck,
            "Found version selector and download button, checking",
        );
        self.ensure_button_href(cx, widget.button)?;
        self.ensure_options(cx, widget.selector)?;
        self.ensure_hint(cx, widget.selector)?;

        cx.info(Category::FeatureCheck, "Verifying edition switch logic");
        cx.doc.set_style(widget.selector, "border", "2px solid #0078d4")?;
        cx.doc.set_style(widget.selector, "border-radius", "4px")?;
        cx.doc.set_style(widget.selector, "padding", "5px")?;
        cx.doc.dispatch_event(widget.selector, "change")?;

        cx.info(Category::FeatureCheck, "Download feature check complete");
        Ok(())
    }
}
