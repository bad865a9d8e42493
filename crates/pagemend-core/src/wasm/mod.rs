//! Browser host: wires the agent to the live page.
//!
//! ```js
//! import init, { install } from "./pagemend_core.js";
//! document.addEventListener("DOMContentLoaded", async () => {
//!   await init();
//!   install();
//!   console.log(JSON.parse(window.PageRepairAgent.getRepairLog()));
//! });
//! ```

mod document;

pub use document::WebDocument;

use crate::agent::{ErrorReport, PageRepairAgent};
use crate::config::PageMendConfig;
use crate::dom::NodeId;
use document::describe;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, ErrorEvent, PromiseRejectionEvent, Window};

/// How often the host heartbeat runs. Scans still follow the configured
/// interval; this only bounds flash-expiry latency.
const POLL_INTERVAL_MS: i32 = 250;

enum HostEvent {
    Poll,
    Check,
    ToggleLog,
    Click(NodeId),
    ImageError(NodeId),
    Uncaught(ErrorReport),
    Rejection(String),
}

struct Runtime {
    agent: PageRepairAgent,
    doc: WebDocument,
}

impl Runtime {
    fn apply(&mut self, event: HostEvent) {
        let Runtime { agent, doc } = self;
        match event {
            HostEvent::Poll => {
                agent.poll(doc);
                let released = doc.release_detached();
                if released > 0 {
                    tracing::debug!(released, live = doc.registered(), "released detached handles");
                }
            }
            HostEvent::Check => agent.run_full_check(doc),
            HostEvent::ToggleLog => {
                agent.toggle_log_panel(doc);
            }
            HostEvent::Click(node) => {
                agent.handle_click(doc, node);
            }
            HostEvent::ImageError(node) => {
                agent.handle_image_error(doc, node);
            }
            HostEvent::Uncaught(report) => agent.report_uncaught_error(doc, &report),
            HostEvent::Rejection(reason) => agent.report_unhandled_rejection(doc, &reason),
        }
    }
}

#[derive(Clone)]
struct Shared {
    runtime: Rc<RefCell<Runtime>>,
    queue: Rc<RefCell<VecDeque<HostEvent>>>,
}

impl Shared {
    /// Events raised while the agent is mid-call (a dispatched `change`
    /// handler throwing, say) stay queued for the outer call to drain.
    fn deliver(&self, event: HostEvent) {
        self.queue.borrow_mut().push_back(event);
        let Ok(mut runtime) = self.runtime.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            runtime.apply(event);
        }
        drop(runtime);
        self.attach_image_listeners();
    }

    fn attach_image_listeners(&self) {
        let targets: Vec<(NodeId, Element)> = {
            let Ok(mut runtime) = self.runtime.try_borrow_mut() else {
                return;
            };
            let armed = runtime.agent.take_newly_armed_images();
            armed
                .into_iter()
                .filter_map(|node| runtime.doc.element(node).ok().map(|e| (node, e)))
                .collect()
        };
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        for (node, element) in targets {
            let shared = self.clone();
            let callback = Closure::once_into_js(move || shared.deliver(HostEvent::ImageError(node)));
            if let Err(e) = element.add_event_listener_with_callback_and_add_event_listener_options(
                "error",
                callback.unchecked_ref(),
                &options,
            ) {
                tracing::warn!("could not watch image {}: {}", node, describe(&e));
            }
        }
    }

    fn wire_controls(&self) -> Result<(), JsValue> {
        let buttons = {
            let runtime = self.runtime.borrow();
            match runtime.agent.panel() {
                Some(panel) => [panel.check_button, panel.log_button]
                    .into_iter()
                    .filter_map(|node| runtime.doc.element(node).ok().map(|e| (node, e)))
                    .collect::<Vec<_>>(),
                None => Vec::new(),
            }
        };
        for (node, element) in buttons {
            let shared = self.clone();
            let on_click =
                Closure::<dyn FnMut()>::new(move || shared.deliver(HostEvent::Click(node)));
            element.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            on_click.forget();
        }
        Ok(())
    }

    fn wire_window(&self, window: &Window) -> Result<(), JsValue> {
        let shared = self.clone();
        let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Ok(event) = event.dyn_into::<ErrorEvent>() else {
                return;
            };
            shared.deliver(HostEvent::Uncaught(ErrorReport {
                message: event.message(),
                filename: event.filename(),
                lineno: event.lineno(),
            }));
        });
        window.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;
        on_error.forget();

        let shared = self.clone();
        let on_rejection = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let reason = match event.dyn_into::<PromiseRejectionEvent>() {
                Ok(event) => describe(&event.reason()),
                Err(_) => "unknown".to_string(),
            };
            shared.deliver(HostEvent::Rejection(reason));
        });
        window.add_event_listener_with_callback(
            "unhandledrejection",
            on_rejection.as_ref().unchecked_ref(),
        )?;
        on_rejection.forget();

        let shared = self.clone();
        let heartbeat = Closure::<dyn FnMut()>::new(move || shared.deliver(HostEvent::Poll));
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            heartbeat.as_ref().unchecked_ref(),
            POLL_INTERVAL_MS,
        )?;
        heartbeat.forget();
        Ok(())
    }
}

/// Handle exposed to page scripts as `window.PageRepairAgent`.
#[wasm_bindgen]
pub struct PageMend {
    shared: Shared,
}

#[wasm_bindgen]
impl PageMend {
    /// The session log as a JSON array, oldest first.
    #[wasm_bindgen(js_name = getRepairLog)]
    pub fn get_repair_log(&self) -> Result<String, JsValue> {
        let runtime = self
            .shared
            .runtime
            .try_borrow()
            .map_err(|_| JsValue::from_str("repair agent is busy"))?;
        serde_json::to_string(&runtime.agent.repair_log())
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize log: {}", e)))
    }

    #[wasm_bindgen(js_name = runFullCheck)]
    pub fn run_full_check(&self) {
        self.shared.deliver(HostEvent::Check);
    }

    #[wasm_bindgen(js_name = toggleLogPanel)]
    pub fn toggle_log_panel(&self) {
        self.shared.deliver(HostEvent::ToggleLog);
    }

    #[wasm_bindgen(js_name = getVersion)]
    pub fn get_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Starts the agent on the current page. `config_json` follows
/// [`PageMendConfig`]; omitted fields keep their defaults.
#[wasm_bindgen]
pub fn install(config_json: Option<String>) -> Result<PageMend, JsValue> {
    console_error_panic_hook::set_once();

    let config: PageMendConfig = match config_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?,
        None => PageMendConfig::default(),
    };
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let doc = WebDocument::from_window(window.clone())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut agent = PageRepairAgent::new(config);
    agent.log_mut().set_mirror(|entry| {
        web_sys::console::log_1(&JsValue::from_str(&format!(
            "[PageRepairAgent] {}: {}",
            entry.category, entry.message
        )));
    });

    let shared = Shared {
        runtime: Rc::new(RefCell::new(Runtime { agent, doc })),
        queue: Rc::new(RefCell::new(VecDeque::new())),
    };
    {
        let mut runtime = shared.runtime.borrow_mut();
        let Runtime { agent, doc } = &mut *runtime;
        agent.init(doc);
    }
    shared.wire_controls()?;
    shared.wire_window(&window)?;
    // Drains anything queued during init and attaches image listeners.
    shared.deliver(HostEvent::Poll);

    js_sys::Reflect::set(
        window.as_ref(),
        &JsValue::from_str("PageRepairAgent"),
        &JsValue::from(PageMend {
            shared: shared.clone(),
        }),
    )?;
    Ok(PageMend { shared })
}
