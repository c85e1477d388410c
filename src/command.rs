//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Screens return commands from their `update()`, the App spawns them, and
//! the commands report back through the screen's message channel.

mod clipboard;

use async_trait::async_trait;
use color_eyre::Result;

pub use clipboard::{ClipboardSink, SystemClipboard};

/// Async commands that perform side effects.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logging.
    /// Include context like key ids.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>) -> Result<()>;
}
