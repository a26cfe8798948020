//! Terminal UI for browsing a loaded search index
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;

use anyhow::Result;
pub use app::{App, Mode};
use terminal::TerminalManager;

use crate::models::SearchIndex;

/// Run the interactive browser until the user quits
///
/// `base_url` is prepended to links copied with Ctrl+Y.
pub fn run_interactive(index: &SearchIndex, base_url: Option<String>) -> Result<()> {
    let mut app = App::new(index).with_base_url(base_url);
    let mut manager = TerminalManager::new()?;
    app.run(manager.terminal_mut())
}
