//! Markup handling for comment bodies.
//!
//! `strip_html` produces the plain text used for keyword matching.
//! `sanitize_html` keeps the markup for display but drops `<script>` and
//! `<style>` blocks. Neither is a full HTML parser.

use once_cell::sync::Lazy;
use regex::Regex;

static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| block("style"));
static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| block("script"));
// A tag needs at least one character between the brackets.
static TAG: Lazy<Regex> = Lazy::new(|| compile("<[^>]+>"));

const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Plain text of a comment body, trimmed.
pub fn strip_html(html: &str) -> String {
    let without_style = STYLE_BLOCK.replace_all(html, "");
    let without_blocks = SCRIPT_BLOCK.replace_all(&without_style, "");
    let mut text = TAG.replace_all(&without_blocks, "").into_owned();
    // Sequential, so `&amp;lt;` decodes all the way to `<`.
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }
    text.trim().to_string()
}

/// Comment body safe to embed in an HTML view.
pub fn sanitize_html(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, "");
    STYLE_BLOCK.replace_all(&without_scripts, "").into_owned()
}

/// `<tag ...>...</tag>`, case-insensitive, spanning lines, shortest body.
fn block(tag: &str) -> Regex {
    compile(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>"))
}

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => unreachable!("markup pattern {pattern:?} is invalid: {err}"),
    }
}
