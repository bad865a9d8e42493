use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMendConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub structure: StructureConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub styles: StyleConfig,
    #[serde(default)]
    pub scripts: ScriptConfig,
    #[serde(default)]
    pub feature: FeatureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_flash_duration_ms")]
    pub flash_duration_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            flash_duration_ms: default_flash_duration_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    30000
}

fn default_flash_duration_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_panel_entries")]
    pub panel_entries: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            panel_entries: default_panel_entries(),
        }
    }
}

fn default_capacity() -> usize {
    crate::log::DEFAULT_CAPACITY
}

fn default_panel_entries() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    #[serde(default = "default_required_selectors")]
    pub required_selectors: Vec<String>,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            required_selectors: default_required_selectors(),
        }
    }
}

fn default_required_selectors() -> Vec<String> {
    [".navbar", ".container", "footer", "header", "main"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Hosts (and their subdomains) whose plain-HTTP links get upgraded.
    #[serde(default = "default_vendor_domains")]
    pub vendor_domains: Vec<String>,
    #[serde(default = "default_warning_title")]
    pub warning_title: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            vendor_domains: default_vendor_domains(),
            warning_title: default_warning_title(),
        }
    }
}

fn default_vendor_domains() -> Vec<String> {
    vec!["microsoft.com".to_string()]
}

fn default_warning_title() -> String {
    "Warning: this link may be invalid".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_placeholder_alt")]
    pub placeholder_alt: String,
    /// Images served from these hosts get a styled frame instead of a
    /// replacement source.
    #[serde(default = "default_cdn_domains")]
    pub cdn_domains: Vec<String>,
    #[serde(default = "default_placeholder_src")]
    pub placeholder_src: String,
    #[serde(default = "default_recovery_attribute")]
    pub recovery_attribute: String,
    #[serde(default = "default_failed_title")]
    pub failed_title: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            placeholder_alt: default_placeholder_alt(),
            cdn_domains: default_cdn_domains(),
            placeholder_src: default_placeholder_src(),
            recovery_attribute: default_recovery_attribute(),
            failed_title: default_failed_title(),
        }
    }
}

fn default_placeholder_alt() -> String {
    "Image content".to_string()
}

fn default_cdn_domains() -> Vec<String> {
    vec!["akamaized.net".to_string()]
}

fn default_placeholder_src() -> String {
    concat!(
        "data:image/svg+xml;charset=UTF-8,",
        "%3Csvg%20width%3D%22200%22%20height%3D%22150%22%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22",
        "%20viewBox%3D%220%200%20200%20150%22%20preserveAspectRatio%3D%22none%22%3E",
        "%3Crect%20width%3D%22200%22%20height%3D%22150%22%20fill%3D%22%23EEEEEE%22%3E%3C%2Frect%3E",
        "%3Ctext%20x%3D%2250%22%20y%3D%2280%22%20fill%3D%22rgba(200%2C200%2C200%2C.75)%22",
        "%20font-family%3D%22Helvetica%2C%20monospace%22%20font-size%3D%2210pt%22%3E",
        "Image%20unavailable%3C%2Ftext%3E%3C%2Fsvg%3E"
    )
    .to_string()
}

fn default_recovery_attribute() -> String {
    "data-original-src".to_string()
}

fn default_failed_title() -> String {
    "Image failed to load".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_critical_classes")]
    pub critical_classes: Vec<String>,
    #[serde(default = "default_download_button_selector")]
    pub download_button_selector: String,
    #[serde(default = "default_download_option_selector")]
    pub download_option_selector: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            critical_classes: default_critical_classes(),
            download_button_selector: default_download_button_selector(),
            download_option_selector: default_download_option_selector(),
        }
    }
}

fn default_critical_classes() -> Vec<String> {
    ["container", "btn-primary", "footer", "btn-download", "download-option"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_download_button_selector() -> String {
    ".btn-download".to_string()
}

fn default_download_option_selector() -> String {
    ".download-option".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    #[serde(default = "default_required_functions")]
    pub required_functions: Vec<String>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            required_functions: default_required_functions(),
        }
    }
}

fn default_required_functions() -> Vec<String> {
    vec!["adjustForScreenSize".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default = "default_version_selector_id")]
    pub version_selector_id: String,
    /// Tried in order; the first match is the download button.
    #[serde(default = "default_button_selectors")]
    pub button_selectors: Vec<String>,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_options")]
    pub options: Vec<EditionOption>,
    #[serde(default = "default_hint_class")]
    pub hint_class: String,
    #[serde(default = "default_hint_text")]
    pub hint_text: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            version_selector_id: default_version_selector_id(),
            button_selectors: default_button_selectors(),
            fallback_url: default_fallback_url(),
            options: default_options(),
            hint_class: default_hint_class(),
            hint_text: default_hint_text(),
        }
    }
}

pub const INSTALLER_FILE: &str = "Win11_25H2_Chinese_Simplified_x64.iso";

fn default_version_selector_id() -> String {
    "product-edition".to_string()
}

fn default_button_selectors() -> Vec<String> {
    vec![
        format!(".btn-primary[href*=\"{INSTALLER_FILE}\"]"),
        "#download-button".to_string(),
    ]
}

fn default_fallback_url() -> String {
    format!("https://software.download.prss.microsoft.com/dbazure/{INSTALLER_FILE}")
}

fn default_options() -> Vec<EditionOption> {
    [
        ("3262", "Windows 11 multi-edition ISO"),
        ("3263", "Windows 11 Home (China only)"),
        ("3264", "Windows 11 Pro (Chinese)"),
    ]
    .into_iter()
    .map(|(value, label)| EditionOption {
        value: value.to_string(),
        label: label.to_string(),
    })
    .collect()
}

fn default_hint_class() -> String {
    "hint-text".to_string()
}

fn default_hint_text() -> String {
    "Select the Windows 11 edition you need from the drop-down menu, then click the download button."
        .to_string()
}
