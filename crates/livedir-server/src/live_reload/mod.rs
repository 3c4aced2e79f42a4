//! Live reload system.
//!
//! Provides file watching and WebSocket-based reload notifications
//! to connected clients when files under the served root change.

mod notifier;
mod registry;
mod websocket;

pub use notifier::{ChangeEvent, ChangeKind, ChangeNotifier};
pub use registry::{ClientId, ClientRegistry, Signal};
pub(crate) use websocket::upgrade;
