use pagemend_core::config::PageMendConfig;
use pagemend_core::config::schema::INSTALLER_FILE;

#[test]
fn test_default_values() {
    let config = PageMendConfig::default();
    assert_eq!(config.scheduler.interval_ms, 30000);
    assert_eq!(config.scheduler.flash_duration_ms, 3000);
    assert_eq!(config.log.capacity, 100);
    assert_eq!(config.log.panel_entries, 20);
    assert_eq!(config.feature.version_selector_id, "product-edition");
    assert!(config.feature.fallback_url.ends_with(INSTALLER_FILE));
    let values: Vec<_> = config.feature.options.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, vec!["3262", "3263", "3264"]);
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let config: PageMendConfig = serde_yaml::from_str(
        r#"
scheduler:
  interval_ms: 5000
links:
  vendor_domains:
    - "example.com"
"#,
    )
    .unwrap();

    assert_eq!(config.scheduler.interval_ms, 5000);
    assert_eq!(config.scheduler.flash_duration_ms, 3000);
    // Serde replaces lists rather than merging them.
    assert_eq!(config.links.vendor_domains, vec!["example.com".to_string()]);
    assert!(!config.links.warning_title.is_empty());
    assert_eq!(config.structure.required_selectors.len(), 5);
}

#[test]
fn test_json_config_for_browser_host() {
    let config: PageMendConfig =
        serde_json::from_str(r#"{"log": {"panel_entries": 5}, "scripts": {"required_functions": []}}"#)
            .unwrap();
    assert_eq!(config.log.panel_entries, 5);
    assert_eq!(config.log.capacity, 100);
    assert!(config.scripts.required_functions.is_empty());
}
