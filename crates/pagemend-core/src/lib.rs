pub mod agent;
pub mod clock;
pub mod config;
pub mod dom;
pub mod error;
pub mod flash;
pub mod log;
pub mod memory;
pub mod panel;
pub mod scanner;
pub mod scheduler;
pub mod selector;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use agent::{ErrorReport, Lifecycle, PageRepairAgent};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PageMendConfig;
pub use dom::{Document, NodeId};
pub use error::DomError;
pub use log::{Category, LogEntry, RepairLog, Severity};
pub use memory::MemoryDocument;
