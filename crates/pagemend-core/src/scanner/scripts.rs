use super::feature::find_widget;
use super::{RepairContext, Scanner};
use crate::config::schema::{FeatureConfig, ScriptConfig};
use crate::error::DomError;
use crate::log::Category;

/// Reports page functions the markup expects but the scripts never defined.
pub struct ScriptScanner {
    config: ScriptConfig,
    feature: FeatureConfig,
}

impl ScriptScanner {
    pub fn new(config: ScriptConfig, feature: FeatureConfig) -> Self {
        Self { config, feature }
    }
}

impl Scanner for ScriptScanner {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn scan(&self, cx: &mut RepairContext<'_>) -> Result<(), DomError> {
        for function in &self.config.required_functions {
            if !cx.doc.has_global_function(function) {
                cx.warn(
                    Category::Script,
                    format!("Required function not found: {function}"),
                );
            }
        }
        if find_widget(&*cx.doc, &self.feature)?.is_some() {
            cx.info(Category::Script, "Version selector check passed");
        }
        Ok(())
    }
}
