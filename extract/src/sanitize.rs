//! Markup sanitization: turns scraped HTML into prompt-ready text.
//!
//! Markup is read as a token stream, not rebuilt into a DOM, so nothing is
//! reparented and no anchors are invented. Every element except `<a>` is
//! unwrapped (tag dropped, content kept in document order). Anchors survive
//! with their attributes so the model can still see link targets. The result
//! is then normalized line by line.

#![allow(clippy::expect_used)]

use std::cell::RefCell;
use std::sync::LazyLock;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use html5ever::LocalName;
use regex::Regex;
use thiserror::Error;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("WHITESPACE_RUN regex"));

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Reasons a sanitization pass can fail.
///
/// These never reach callers of [`clean`] or [`Sanitizer::clean`]; they are
/// only observable through [`Sanitizer::try_clean`].
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// The tokenizer reported errors and the sanitizer runs in strict mode.
    #[error("markup rejected by tokenizer ({} error(s)): {}", .errors.len(), .errors.join("; "))]
    Malformed {
        /// Tokenizer error messages in the order they were reported.
        errors: Vec<String>,
    },
}

/// Configurable markup sanitizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
    strict: bool,
}

impl Sanitizer {
    /// Creates a lenient sanitizer.
    #[must_use]
    pub const fn new() -> Self {
        Self { strict: false }
    }

    /// Treat any lexical error reported by the HTML tokenizer as a failure.
    ///
    /// Only token-level damage counts (an unterminated tag or attribute, a
    /// bad character reference). Stray or misnested end tags and complete
    /// documents with a doctype are accepted.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Cleans `html`, degrading to an empty string on failure.
    ///
    /// Degradation is logged at `warn` level.
    #[must_use]
    pub fn clean(&self, html: Option<&str>) -> String {
        match self.try_clean(html) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "markup sanitization failed, continuing with empty input"
                );
                String::new()
            }
        }
    }

    /// Cleans `html`, reporting failures instead of absorbing them.
    pub fn try_clean(&self, html: Option<&str>) -> Result<String, SanitizeError> {
        let Some(html) = html.filter(|h| !h.is_empty()) else {
            return Ok(String::new());
        };

        let tokenizer = Tokenizer::new(AnchorSink::default(), TokenizerOpts::default());
        let input = BufferQueue::default();
        input.push_back(StrTendril::from_slice(html));
        let _ = tokenizer.feed(&input);
        tokenizer.end();

        let errors = tokenizer.sink.errors.take();
        if self.strict && !errors.is_empty() {
            return Err(SanitizeError::Malformed { errors });
        }

        Ok(collapse_whitespace(&tokenizer.sink.out.take()))
    }
}

/// Cleans `html` with the default (lenient) sanitizer.
///
/// `None` and `""` both yield `""`.
///
/// # Examples
///
/// ```
/// use scrape_extract::sanitize::clean;
///
/// let html = "<div>  Hello <a href='x'>link</a>  world</div>";
/// assert_eq!(clean(Some(html)), "Hello <a href=\"x\">link</a> world");
/// assert_eq!(clean(None), "");
/// ```
#[must_use]
pub fn clean(html: Option<&str>) -> String {
    Sanitizer::new().clean(html)
}

/// Token sink writing text and anchor tags only.
///
/// Keeps its own stack of open elements so an end tag closes everything
/// opened after its start tag, and unmatched end tags are ignored. Anchors
/// still open at end of input are closed.
#[derive(Default)]
struct AnchorSink {
    out: RefCell<String>,
    open: RefCell<Vec<LocalName>>,
    errors: RefCell<Vec<String>>,
}

impl AnchorSink {
    fn start_tag(&self, tag: Tag) -> TokenSinkResult<()> {
        let is_anchor = &*tag.name == "a";
        if is_anchor {
            let mut out = self.out.borrow_mut();
            out.push_str("<a");
            for attr in &tag.attrs {
                out.push(' ');
                out.push_str(&attr.name.local);
                out.push_str("=\"");
                escape_attribute(&mut out, &attr.value);
                out.push('"');
            }
            out.push('>');
        }

        if tag.self_closing || VOID_ELEMENTS.contains(&&*tag.name) {
            if is_anchor {
                self.out.borrow_mut().push_str("</a>");
            }
            return TokenSinkResult::Continue;
        }

        let raw = raw_text_kind(&tag.name);
        self.open.borrow_mut().push(tag.name);
        raw.map_or(TokenSinkResult::Continue, TokenSinkResult::RawData)
    }

    fn end_tag(&self, tag: &Tag) {
        let mut open = self.open.borrow_mut();
        let Some(pos) = open.iter().rposition(|name| *name == tag.name) else {
            return;
        };
        let closed = open.drain(pos..).filter(|name| &**name == "a").count();
        self.out.borrow_mut().push_str(&"</a>".repeat(closed));
    }

    fn close_open_anchors(&self) {
        let closed = self
            .open
            .borrow_mut()
            .drain(..)
            .filter(|name| &**name == "a")
            .count();
        self.out.borrow_mut().push_str(&"</a>".repeat(closed));
    }
}

impl TokenSink for AnchorSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => escape_text(&mut self.out.borrow_mut(), &text),
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(tag),
                TagKind::EndTag => self.end_tag(&tag),
            },
            Token::ParseError(error) => self.errors.borrow_mut().push(error.into_owned()),
            Token::EOFToken => self.close_open_anchors(),
            // comments, doctypes, NUL
            Token::CommentToken(_) | Token::DoctypeToken(_) | Token::NullCharacterToken => {}
        }
        TokenSinkResult::Continue
    }
}

/// Elements whose content is not markup.
fn raw_text_kind(name: &LocalName) -> Option<RawKind> {
    match &**name {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
        "title" | "textarea" => Some(RawKind::Rcdata),
        _ => None,
    }
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Trims every line, drops blank ones and collapses whitespace runs.
fn collapse_whitespace(text: &str) -> String {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    WHITESPACE_RUN.replace_all(&joined, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_and_empty_yield_empty() {
        assert_eq!(clean(None), "");
        assert_eq!(clean(Some("")), "");
    }

    #[test]
    fn test_unwraps_non_anchor_elements() {
        let html = "<div><p>First <b>bold</b> text</p><span>second</span></div>";
        let cleaned = clean(Some(html));
        assert_eq!(cleaned, "First bold textsecond");
        assert!(!cleaned.contains('<'));
        assert!(!cleaned.contains('>'));
    }

    #[test]
    fn test_preserves_anchor_with_attributes() {
        let html = r#"<ul><li><a href="/news" class="nav">News</a></li></ul>"#;
        assert_eq!(clean(Some(html)), r#"<a href="/news" class="nav">News</a>"#);
    }

    #[test]
    fn test_unwraps_elements_inside_anchor() {
        let html = r#"<a href="/x"><span>inner</span> <em>text</em></a>"#;
        assert_eq!(clean(Some(html)), r#"<a href="/x">inner text</a>"#);
    }

    #[test]
    fn test_link_inside_paragraph() {
        let html = "<div>  Hello <a href='x'>link</a>  world</div>";
        assert_eq!(clean(Some(html)), "Hello <a href=\"x\">link</a> world");
    }

    #[test]
    fn test_drops_blank_lines_and_trims() {
        let html = "<div>\n   line one   \n\n\t\n<p>  line   two </p>\n</div>";
        let cleaned = clean(Some(html));
        assert_eq!(cleaned, "line one\nline two");
        assert!(cleaned.lines().all(|l| !l.trim().is_empty()));
        assert!(!cleaned.contains("  "));
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let html = concat!(
            "<p>a &lt; b &amp; c</p>",
            r#"<a title="say &quot;hi&quot;" href="?a=1&amp;b=2">q</a>"#
        );
        assert_eq!(
            clean(Some(html)),
            r#"a &lt; b &amp; c<a title="say &quot;hi&quot;" href="?a=1&amp;b=2">q</a>"#
        );
    }

    #[test]
    fn test_drops_comments() {
        let html = "<div>keep<!-- drop me --> this</div>";
        assert_eq!(clean(Some(html)), "keep this");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(clean(Some("just text")), "just text");
    }

    #[test]
    fn test_deeply_nested_markup() {
        let depth = 20_000;
        let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));
        assert_eq!(clean(Some(&html)), "deep");
    }

    #[test]
    fn test_text_keeps_document_order_in_tables() {
        assert_eq!(clean(Some("<table><tr><td>a</td></tr>b</table>")), "ab");
    }

    #[test]
    fn test_misnested_end_tag_closes_anchor_once() {
        let html = r#"<p><a href="x">one</p>two</a>"#;
        assert_eq!(clean(Some(html)), r#"<a href="x">one</a>two"#);
    }

    #[test]
    fn test_nested_anchors_are_kept_nested() {
        let html = r#"<a href="1">x<a href="2">y</a></a>"#;
        assert_eq!(clean(Some(html)), html);
    }

    #[test]
    fn test_unclosed_anchor_is_closed_at_end() {
        assert_eq!(
            clean(Some(r#"<div><a href="x">open"#)),
            r#"<a href="x">open</a>"#
        );
    }

    #[test]
    fn test_script_content_is_not_markup() {
        let html = "<script>if (a<b) { x = '<a href=\"y\">'; }</script>";
        let cleaned = clean(Some(html));
        assert!(!cleaned.contains("<a"), "got: {cleaned}");
        assert!(cleaned.contains("a&lt;b"), "got: {cleaned}");
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let html = r#"<p>one<br>two<img src="i.png"/><a href="z"/>three</p>"#;
        assert_eq!(clean(Some(html)), r#"onetwo<a href="z"></a>three"#);
    }

    #[test]
    fn test_strict_mode_degrades_malformed_markup_to_empty() {
        let sanitizer = Sanitizer::new().strict(true);
        let html = "<p>unterminated <a href=\"x";

        assert!(matches!(
            sanitizer.try_clean(Some(html)),
            Err(SanitizeError::Malformed { .. })
        ));
        assert_eq!(sanitizer.clean(Some(html)), "");
    }

    #[test]
    fn test_stray_end_tags_are_ignored() {
        assert_eq!(clean(Some("text</span>")), "text");
        assert_eq!(
            Sanitizer::new().strict(true).try_clean(Some("text</span>")).ok().as_deref(),
            Some("text")
        );
    }

    #[test]
    fn test_strict_mode_accepts_complete_documents() {
        let sanitizer = Sanitizer::new().strict(true);
        let html = "<!DOCTYPE html>\n<html>\n<head><title>Andover</title></head>\n<body>\n\
                    <p>Welcome <a href=\"/about\">About</a></p>\n</body>\n</html>";
        assert_eq!(
            sanitizer.try_clean(Some(html)).ok().as_deref(),
            Some("Andover\nWelcome <a href=\"/about\">About</a>")
        );
    }

    #[test]
    fn test_strict_mode_accepts_well_formed_markup() {
        let sanitizer = Sanitizer::new().strict(true);
        let html = "<div>  Hello <a href='x'>link</a>  world</div>";
        assert_eq!(
            sanitizer.try_clean(Some(html)).ok().as_deref(),
            Some("Hello <a href=\"x\">link</a> world")
        );
    }
}
