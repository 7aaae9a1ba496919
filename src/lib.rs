// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod error;
pub mod history;
pub mod keyboard;
pub mod lessons;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod segmenter;
pub mod session;
pub mod settings;
pub mod timer;

pub use session::{SessionConfig, SessionEvent, SessionStatus, StatsSnapshot, TypingSession};
