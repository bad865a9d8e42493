use pagemend_core::dom::Document;
use pagemend_core::flash::FIXED_CLASS;
use pagemend_core::log::{Category, Severity};
use pagemend_core::panel::{PanelAction, VISIBLE_CLASS};
use pagemend_core::scanner::{RepairContext, Scanner};
use pagemend_core::{
    DomError, ErrorReport, Lifecycle, ManualClock, MemoryDocument, PageMendConfig,
    PageRepairAgent,
};
use std::rc::Rc;

const INTERVAL_MS: i64 = 30_000;

fn agent_with_clock() -> (PageRepairAgent<Rc<ManualClock>>, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::default());
    let agent = PageRepairAgent::with_clock(PageMendConfig::default(), Rc::clone(&clock));
    (agent, clock)
}

fn count(agent: &PageRepairAgent<Rc<ManualClock>>, message: &str) -> usize {
    agent
        .log()
        .entries()
        .filter(|e| e.message == message)
        .count()
}

struct Failing;

impl Scanner for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn scan(&self, _cx: &mut RepairContext<'_>) -> Result<(), DomError> {
        Err(DomError::Host("stylesheet backend went away".into()))
    }
}

struct Marker;

impl Scanner for Marker {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn scan(&self, cx: &mut RepairContext<'_>) -> Result<(), DomError> {
        cx.info(Category::System, "marker ran");
        Ok(())
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn init_installs_panel_and_runs_first_check() {
    let mut doc = MemoryDocument::new();
    let (mut agent, _) = agent_with_clock();
    assert_eq!(agent.lifecycle(), Lifecycle::Created);

    agent.init(&mut doc);

    assert_eq!(agent.lifecycle(), Lifecycle::Running);
    assert_eq!(doc.query_selector_all(".repair-log-panel").unwrap().len(), 1);
    assert_eq!(doc.query_selector_all(".repair-control-panel button").unwrap().len(), 2);
    assert!(doc.element_by_id("repair-log-entries").is_some());
    assert_eq!(count(&agent, "Starting full check of page content and structure"), 1);
    assert_eq!(count(&agent, "Full check complete"), 1);

    // A second init is a no-op.
    agent.init(&mut doc);
    assert_eq!(doc.query_selector_all(".repair-log-panel").unwrap().len(), 1);
    assert_eq!(count(&agent, "Full check complete"), 1);
}

#[test]
fn panel_shows_only_most_recent_entries() {
    let mut doc = MemoryDocument::new();
    let (mut agent, _) = agent_with_clock();
    agent.init(&mut doc);
    agent.run_full_check(&mut doc);
    assert!(agent.log().len() > 20);

    let panel = agent.panel().unwrap();
    let rows = doc.children(panel.entries);
    assert_eq!(rows.len(), 20);

    let last = rows.last().copied().unwrap();
    let cells = doc.children(last);
    assert_eq!(cells.len(), 3);
    assert_eq!(doc.text_content(cells[0]).len(), "00:00:00".len());
    assert_eq!(doc.text_content(cells[1]), "System info");
    assert_eq!(doc.text_content(cells[2]), "Full check complete");
}

#[test]
fn panel_renders_messages_as_text() {
    let mut doc = MemoryDocument::new();
    let (mut agent, _) = agent_with_clock();
    agent.init(&mut doc);

    agent.report_unhandled_rejection(&mut doc, "<b>boom</b>");

    let panel = agent.panel().unwrap();
    let last = doc.children(panel.entries).last().copied().unwrap();
    let message = doc.children(last)[2];
    assert!(doc.children(message).is_empty());
    assert_eq!(doc.text_content(message), "Reason: <b>boom</b>");
}

#[test]
fn toggle_and_click_routing() {
    let mut doc = MemoryDocument::new();
    let (mut agent, _) = agent_with_clock();
    agent.init(&mut doc);
    let panel = agent.panel().unwrap();

    assert!(agent.toggle_log_panel(&mut doc));
    assert!(doc.has_class(panel.panel, VISIBLE_CLASS));
    assert!(!agent.toggle_log_panel(&mut doc));
    assert!(!doc.has_class(panel.panel, VISIBLE_CLASS));

    assert_eq!(
        agent.handle_click(&mut doc, panel.log_button),
        Some(PanelAction::ToggleLog)
    );
    assert!(doc.has_class(panel.panel, VISIBLE_CLASS));

    assert_eq!(
        agent.handle_click(&mut doc, panel.check_button),
        Some(PanelAction::Check)
    );
    assert_eq!(count(&agent, "Full check complete"), 2);

    let body = doc.body().unwrap();
    assert_eq!(agent.handle_click(&mut doc, body), None);
}

#[test]
fn toggle_without_panel_is_harmless() {
    let mut doc = MemoryDocument::new();
    let (mut agent, _) = agent_with_clock();
    assert!(!agent.toggle_log_panel(&mut doc));
}

#[test]
fn teardown_removes_ui_and_stops_schedule() {
    let mut doc = MemoryDocument::new();
    let body = doc.body().unwrap();
    let link = doc.append_element(body, "a", &[("href", "notes.pdf")]);
    let (mut agent, clock) = agent_with_clock();
    agent.init(&mut doc);
    assert!(doc.has_class(link, FIXED_CLASS));
    let logged = agent.log().len();

    agent.teardown(&mut doc);

    assert_eq!(agent.lifecycle(), Lifecycle::Stopped);
    assert!(agent.panel().is_none());
    assert!(doc.query_selector(".repair-log-panel").unwrap().is_none());
    assert!(doc.query_selector(".repair-control-panel").unwrap().is_none());
    assert!(!doc.has_class(link, FIXED_CLASS));
    assert_eq!(agent.pending_flashes(), 0);

    clock.advance_ms(INTERVAL_MS * 2);
    assert!(!agent.poll(&mut doc));
    assert_eq!(agent.log().len(), logged);
}

// ============================================================================
// Schedule and flashes
// ============================================================================

#[test]
fn poll_runs_check_once_per_interval() {
    let mut doc = MemoryDocument::new();
    let (mut agent, clock) = agent_with_clock();
    agent.init(&mut doc);

    clock.advance_ms(INTERVAL_MS - 1);
    assert!(!agent.poll(&mut doc));
    clock.advance_ms(1);
    assert!(agent.poll(&mut doc));
    assert!(!agent.poll(&mut doc));

    // A stalled host gets one catch-up check, not a burst.
    clock.advance_ms(INTERVAL_MS * 3);
    assert!(agent.poll(&mut doc));
    assert!(!agent.poll(&mut doc));

    assert_eq!(count(&agent, "Full check complete"), 3);
}

#[test]
fn scheduled_cycles_do_not_grow_the_document() {
    let mut doc = MemoryDocument::new();
    let body = doc.body().unwrap();
    doc.append_element(body, "a", &[("href", "#")]);
    doc.append_element(body, "img", &[("src", "hero.png")]);
    let (mut agent, clock) = agent_with_clock();
    agent.init(&mut doc);
    clock.advance_ms(INTERVAL_MS);
    assert!(agent.poll(&mut doc));
    let panel = agent.panel().unwrap();
    assert_eq!(doc.children(panel.entries).len(), 20);
    let baseline = doc.node_count();

    for _ in 0..50 {
        clock.advance_ms(INTERVAL_MS);
        assert!(agent.poll(&mut doc));
    }

    assert_eq!(doc.node_count(), baseline);
    assert_eq!(doc.children(panel.entries).len(), 20);
    assert_eq!(count(&agent, "Full check complete"), 52);
}

#[test]
fn poll_before_init_does_nothing() {
    let mut doc = MemoryDocument::new();
    let (mut agent, clock) = agent_with_clock();
    clock.advance_ms(INTERVAL_MS);
    assert!(!agent.poll(&mut doc));
    assert!(agent.log().is_empty());
}

#[test]
fn fixed_indicator_clears_after_three_seconds() {
    let mut doc = MemoryDocument::new();
    let body = doc.body().unwrap();
    let link = doc.append_element(body, "a", &[("href", "setup.exe")]);
    let (mut agent, clock) = agent_with_clock();
    agent.init(&mut doc);
    assert!(doc.has_class(link, FIXED_CLASS));
    assert_eq!(agent.pending_flashes(), 1);

    clock.advance_ms(2_999);
    agent.poll(&mut doc);
    assert!(doc.has_class(link, FIXED_CLASS));

    clock.advance_ms(1);
    assert_eq!(agent.expire_flashes(&mut doc), 1);
    assert!(!doc.has_class(link, FIXED_CLASS));
    assert_eq!(agent.pending_flashes(), 0);
}

// ============================================================================
// Failures and error listeners
// ============================================================================

#[test]
fn failing_scanner_ends_cycle_but_not_schedule() {
    let mut doc = MemoryDocument::new();
    let (agent, clock) = agent_with_clock();
    let mut agent = agent.with_scanners(vec![Box::new(Failing), Box::new(Marker)]);

    agent.init(&mut doc);

    let last = agent.log().last().unwrap();
    assert_eq!(last.category, Category::SystemError);
    assert_eq!(last.severity, Severity::Error);
    assert_eq!(
        last.message,
        "Error during check (failing): Host error: stylesheet backend went away"
    );
    assert_eq!(count(&agent, "marker ran"), 0);
    assert_eq!(count(&agent, "Full check complete"), 0);

    clock.advance_ms(INTERVAL_MS);
    assert!(agent.poll(&mut doc));
    assert_eq!(agent.lifecycle(), Lifecycle::Running);
    let failures = agent
        .log()
        .entries()
        .filter(|e| e.category == Category::SystemError)
        .count();
    assert_eq!(failures, 2);
}

#[test]
fn uncaught_errors_and_rejections_are_logged() {
    let mut doc = MemoryDocument::new();
    let (mut agent, _) = agent_with_clock();

    agent.report_uncaught_error(
        &mut doc,
        &ErrorReport {
            message: "x is not defined".into(),
            filename: "app.js".into(),
            lineno: 42,
        },
    );
    agent.report_unhandled_rejection(&mut doc, "timeout");

    let log = agent.repair_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].category, Category::GlobalError);
    assert_eq!(log[0].message, "Error: x is not defined, source: app.js, line: 42");
    assert_eq!(log[1].category, Category::UnhandledRejection);
    assert_eq!(log[1].message, "Reason: timeout");
    assert!(log.iter().all(|e| e.severity == Severity::Error));
}

#[test]
fn log_keeps_latest_hundred_entries() {
    let mut doc = MemoryDocument::new();
    let (mut agent, _) = agent_with_clock();

    for n in 0..101 {
        agent.report_unhandled_rejection(&mut doc, &n.to_string());
    }

    let log = agent.repair_log();
    assert_eq!(log.len(), 100);
    assert_eq!(log[0].message, "Reason: 1");
    assert_eq!(log[99].message, "Reason: 100");
}

#[test]
fn repair_log_serializes_with_iso_timestamps() {
    let mut doc = MemoryDocument::new();
    let (mut agent, clock) = agent_with_clock();
    clock.advance_ms(1_500);
    agent.report_unhandled_rejection(&mut doc, "later");

    let json = serde_json::to_value(agent.repair_log()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "timestamp": "1970-01-01T00:00:01.500Z",
            "category": "unhandled_rejection",
            "severity": "error",
            "message": "Reason: later",
        }])
    );
}
