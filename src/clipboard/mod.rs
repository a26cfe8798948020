//! Copying result links to the system clipboard.
//!
//! Links are relative to the HTML output directory (`api/module.html#anchor`).
//! When a base URL is known the link is joined onto it first, so the pasted
//! text opens directly in a browser.

use anyhow::{Context, Result, bail};
use arboard::Clipboard;
use tracing::debug;

/// Longest link we are willing to place on the clipboard
const MAX_LINK_LEN: usize = 64 * 1024;

/// Destination for copied text (a seam for tests)
trait ClipboardSink {
    fn put(&mut self, text: &str) -> Result<()>;
}

struct SystemClipboard {
    inner: Clipboard,
}

impl SystemClipboard {
    fn open() -> Result<Self> {
        let inner = Clipboard::new().context("Failed to open system clipboard")?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    fn put(&mut self, text: &str) -> Result<()> {
        self.inner.set_text(text).context("Failed to set clipboard contents")
    }
}

/// Reject text that is not a usable single-line link
fn check_link(link: &str) -> Result<()> {
    if link.trim().is_empty() {
        bail!("Nothing to copy: link is empty");
    }
    if link.contains(['\n', '\r']) {
        bail!("Link spans multiple lines");
    }
    if link.len() > MAX_LINK_LEN {
        bail!("Link too long for clipboard ({} bytes, max {})", link.len(), MAX_LINK_LEN);
    }
    Ok(())
}

/// Join a relative result link onto an optional site base URL
///
/// ```
/// use search_index_explorer::clipboard::link_for;
///
/// assert_eq!(link_for(None, "api.html#x"), "api.html#x");
/// assert_eq!(link_for(Some("https://docs.example.org/"), "api.html"), "https://docs.example.org/api.html");
/// assert_eq!(link_for(Some("https://docs.example.org"), "api.html"), "https://docs.example.org/api.html");
/// ```
pub fn link_for(base_url: Option<&str>, relative: &str) -> String {
    match base_url.map(str::trim).filter(|base| !base.is_empty()) {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), relative.trim_start_matches('/')),
        None => relative.to_string(),
    }
}

fn copy_with(link: &str, sink: &mut dyn ClipboardSink) -> Result<()> {
    check_link(link)?;
    sink.put(link)?;
    debug!(link, "Copied link to clipboard");
    Ok(())
}

/// Copy a link to the system clipboard
///
/// # Errors
///
/// Fails before touching the clipboard when the link is empty, multi-line or
/// oversized. Otherwise fails when no clipboard is available (headless sessions).
pub fn copy_to_clipboard(link: &str) -> Result<()> {
    check_link(link)?;
    let mut clipboard = SystemClipboard::open()?;
    copy_with(link, &mut clipboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        last: Option<String>,
        fail: bool,
    }

    impl ClipboardSink for RecordingSink {
        fn put(&mut self, text: &str) -> Result<()> {
            if self.fail {
                bail!("sink unavailable");
            }
            self.last = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_copy_relative_link() {
        let mut sink = RecordingSink::default();
        copy_with("api.html#langgraph_log_parser.experiment.create_experiment", &mut sink).unwrap();
        assert_eq!(
            sink.last.as_deref(),
            Some("api.html#langgraph_log_parser.experiment.create_experiment")
        );
    }

    #[test]
    fn test_copy_rejects_empty_link() {
        let mut sink = RecordingSink::default();
        let err = copy_with("   ", &mut sink).unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(sink.last.is_none());
    }

    #[test]
    fn test_copy_rejects_multiline_link() {
        let mut sink = RecordingSink::default();
        let err = copy_with("index.html\nguide.html", &mut sink).unwrap_err();
        assert!(err.to_string().contains("multiple lines"));
    }

    #[test]
    fn test_copy_rejects_oversized_link() {
        let mut sink = RecordingSink::default();
        let link = format!("{}.html", "a".repeat(MAX_LINK_LEN));
        let err = copy_with(&link, &mut sink).unwrap_err();
        assert!(err.to_string().contains("too long"));
        assert!(err.to_string().contains("bytes"));
    }

    #[test]
    fn test_copy_surfaces_sink_failure() {
        let mut sink = RecordingSink { fail: true, ..Default::default() };
        let err = copy_with("index.html", &mut sink).unwrap_err();
        assert!(err.to_string().contains("sink unavailable"));
    }

    #[test]
    fn test_link_for_ignores_blank_base() {
        assert_eq!(link_for(Some("  "), "index.html"), "index.html");
    }

    #[test]
    fn test_link_for_avoids_double_slash() {
        assert_eq!(link_for(Some("https://x.org/docs/"), "/api.html#-"), "https://x.org/docs/api.html#-");
    }

    #[test]
    fn test_copy_to_clipboard_validates_first() {
        // Validation errors come back even without a display server
        let err = copy_to_clipboard("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_system_clipboard_when_enabled() {
        if std::env::var("ENABLE_CLIPBOARD_TESTS").is_err() {
            return;
        }
        if let Err(e) = copy_to_clipboard("index.html") {
            eprintln!("System clipboard unavailable: {}", e);
        }
    }
}
