use super::{RepairContext, Scanner};
use crate::config::schema::StructureConfig;
use crate::error::DomError;
use crate::log::Category;

/// Reports required landmarks that are missing. Detection only.
pub struct StructureScanner {
    config: StructureConfig,
}

impl StructureScanner {
    pub fn new(config: StructureConfig) -> Self {
        Self { config }
    }
}

impl Scanner for StructureScanner {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn scan(&self, cx: &mut RepairContext<'_>) -> Result<(), DomError> {
        for selector in &self.config.required_selectors {
            if cx.doc.query_selector(selector)?.is_none() {
                cx.warn(
                    Category::Structure,
                    format!("Required element not found: {selector}"),
                );
            }
        }
        Ok(())
    }
}
