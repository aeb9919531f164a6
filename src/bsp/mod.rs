//! Bulk-synchronous vertex-centric runtime
//!
//! ```text
//! super-step k                              barrier              super-step k+1
//! partition 0: init/apply/scatter -> outbox 0 --+
//! partition 1: init/apply/scatter -> outbox 1 --+--> MessageBus --> inbox 0..n
//! partition n: init/apply/scatter -> outbox n --+    (sum, route)
//! ```
//!
//! Messages produced in super-step `k` are only visible in `k + 1`.

pub mod bus;
pub mod engine;
pub mod error;
pub mod message;

pub use bus::{BusStats, MessageBus};
pub use engine::{Engine, EngineOptions, RunReport, SuperstepStats};
pub use error::{EngineError, EngineResult};
pub use message::{Inbox, Outbox, Pending, MESSAGE_WIRE_BYTES};
