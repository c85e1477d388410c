use arboard::Clipboard;
use color_eyre::Result;

/// Destination for copied secrets.
pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: String) -> Result<()>;
}

/// The system clipboard.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: String) -> Result<()> {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }
}
