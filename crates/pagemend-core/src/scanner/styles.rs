use super::{RepairContext, Scanner};
use crate::config::schema::StyleConfig;
use crate::dom::Document;
use crate::error::DomError;
use crate::log::Category;

const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";

pub struct StyleScanner {
    config: StyleConfig,
}

impl StyleScanner {
    pub fn new(config: StyleConfig) -> Self {
        Self { config }
    }
}

/// Whether any readable stylesheet has a rule mentioning `.name` or `#name`.
/// Sheets that refuse access are skipped.
pub fn has_rule_for(doc: &dyn Document, name: &str) -> bool {
    let class = format!(".{name}");
    let id = format!("#{name}");
    doc.style_sheets().into_iter().any(|sheet| match sheet {
        Ok(selectors) => selectors
            .iter()
            .any(|s| s.contains(&class) || s.contains(&id)),
        Err(e) => {
            tracing::trace!("skipping unreadable stylesheet: {}", e);
            false
        }
    })
}

impl Scanner for StyleScanner {
    fn name(&self) -> &'static str {
        "styles"
    }

    fn scan(&self, cx: &mut RepairContext<'_>) -> Result<(), DomError> {
        for name in &self.config.critical_classes {
            if !has_rule_for(&*cx.doc, name) {
                cx.warn(Category::Style, format!("Critical CSS class not found: {name}"));
            }
        }

        for button in cx.doc.query_selector_all(&self.config.download_button_selector)? {
            let background = cx.doc.computed_style(button, "background-color");
            if background.as_deref() == Some(TRANSPARENT) {
                cx.warn(
                    Category::Style,
                    "Download button styles missing, applying defaults",
                );
                cx.doc.set_style(button, "background-color", "#0078d4")?;
                cx.doc.set_style(button, "color", "white")?;
                cx.flash(button)?;
                cx.fixed(Category::Style, "Download button styles restored");
            }
        }

        for option in cx.doc.query_selector_all(&self.config.download_option_selector)? {
            if cx.doc.computed_style(option, "box-shadow").as_deref() == Some("none") {
                cx.doc
                    .set_style(option, "box-shadow", "0 2px 8px rgba(0, 0, 0, 0.1)")?;
                cx.fixed(Category::Style, "Download option card styles restored");
            }
        }
        Ok(())
    }
}
