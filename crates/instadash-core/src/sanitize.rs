//! Textual filter applied to generated markup before it leaves the server.
//!
//! This is a best-effort regex pass, not an HTML parser. It strips
//! `<script>...</script>` blocks and double-quoted `on*="..."` handler
//! attributes. Single-quoted or unquoted handlers, `javascript:` URIs and
//! `<style>`/`<iframe>` vectors get through; the sandboxed preview is what
//! actually keeps generated markup from running.

use std::sync::OnceLock;

use regex::Regex;

static DEFAULT_SANITIZER: OnceLock<RegexSanitizer> = OnceLock::new();

/// Anything that turns untrusted markup into markup safe enough to return.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> String;
}

pub struct RegexSanitizer {
    script_block: Regex,
    event_handler: Regex,
}

impl RegexSanitizer {
    pub fn new() -> Self {
        Self {
            script_block: Regex::new(r"(?is)<script\b.*?</script>").unwrap(),
            event_handler: Regex::new(r#"(?i)\bon\w+="[^"]*""#).unwrap(),
        }
    }

    fn strip_once(&self, html: &str) -> String {
        let without_scripts = self.script_block.replace_all(html, "");
        self.event_handler.replace_all(&without_scripts, "").into_owned()
    }
}

impl Default for RegexSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for RegexSanitizer {
    fn sanitize(&self, html: &str) -> String {
        // Removing one match can splice a new one together, so repeat until stable.
        // Every pass that changes anything makes the text shorter.
        let mut current = self.strip_once(html);
        loop {
            let next = self.strip_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

/// Sanitize with the default regex filter.
pub fn sanitize(html: &str) -> String {
    DEFAULT_SANITIZER.get_or_init(RegexSanitizer::new).sanitize(html)
}
