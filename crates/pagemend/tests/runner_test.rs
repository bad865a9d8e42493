use pagemend::formatter::format_summary;
use pagemend::runner::{RunOptions, run};
use pagemend_core::config::PageMendConfig;
use pagemend_core::dom::Document;
use pagemend_core::{MemoryDocument, PageRepairAgent};
use std::time::Duration;

const PAGE: &str = r#"
root:
  tag: html
  children:
    - tag: body
      children:
        - tag: img
          attrs: { src: images/hero.png, alt: Hero }
        - tag: img
          attrs: { src: images/logo.png, alt: Logo }
        - tag: a
          attrs: { href: setup.exe }
          text: Installer
"#;

fn fast_config() -> PageMendConfig {
    let mut config = PageMendConfig::default();
    config.scheduler.interval_ms = 20;
    config
}

#[tokio::test]
async fn test_runs_requested_cycles_and_removes_ui() {
    let mut doc = MemoryDocument::from_yaml(PAGE).unwrap();
    let mut agent = PageRepairAgent::new(fast_config());
    let options = RunOptions {
        cycles: 2,
        tick: Duration::from_millis(5),
        ..RunOptions::default()
    };

    let summary = run(&mut agent, &mut doc, &options).await;

    assert_eq!(summary.cycles, 2);
    assert_eq!(summary.image_failures, 0);
    let complete = agent
        .log()
        .entries()
        .filter(|e| e.message == "Full check complete")
        .count();
    assert_eq!(complete, 2);

    let html = doc.to_html();
    assert!(html.contains(r#"href="./setup.exe""#));
    assert!(!html.contains("repair-log-panel"));
    assert!(!html.contains("repair-control-panel"));
    assert!(!html.contains("auto-repair-fixed"));
}

#[tokio::test]
async fn test_broken_images_get_placeholder() {
    let mut doc = MemoryDocument::from_yaml(PAGE).unwrap();
    let mut agent = PageRepairAgent::new(fast_config());
    let options = RunOptions {
        broken_images: vec!["images/hero.png".to_string()],
        ..RunOptions::default()
    };

    let summary = run(&mut agent, &mut doc, &options).await;

    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.image_failures, 1);
    let repaired = doc.query_selector_all("img[data-original-src]").unwrap();
    assert_eq!(repaired.len(), 1);
    assert_eq!(
        doc.attribute(repaired[0], "data-original-src").as_deref(),
        Some("images/hero.png")
    );

    let line = format_summary(&agent.repair_log(), summary.cycles);
    assert!(line.starts_with("1 check(s): 2 fixed"));
}
