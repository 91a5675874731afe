use std::sync::OnceLock;

use regex::Regex;

const TICK: u8 = b'`';
const STAR: u8 = b'*';
const UNDERSCORE: u8 = b'_';
const STRONG: &[u8] = b"**";

/// Inline emphasis applied to one run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
    Code,
}

/// A run of text with one style, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSpan {
    pub text: String,
    pub style: SpanStyle,
}

/// Replaces `[text](url)` links with their text. This is also the pure
/// fallback when no styled rendering is wanted.
pub fn plain_text(text: &str) -> String {
    link_regex().replace_all(text, "$1").into_owned()
}

/// Resolves basic emphasis into styled spans.
///
/// Links are de-referenced first, then a single left-to-right scan picks up
/// `` `code` `` (raw, checked before the others), `**bold**`, `*italic*`
/// and `_italic_`. Unterminated or empty delimiters stay literal text; this
/// never fails.
pub fn resolve_spans(text: &str) -> Vec<StyledSpan> {
    let text = plain_text(text);
    let mut cur = Cursor::new(&text);
    let mut spans = Vec::new();
    let mut text_start = cur.pos();

    while !cur.eof() {
        let start = cur.pos();
        if let Some(span) = try_parse_code_span(&mut cur) {
            flush_text(&mut spans, &text, text_start, start);
            spans.push(span);
            text_start = cur.pos();
            continue;
        }
        if let Some(span) = try_parse_strong(&mut cur) {
            flush_text(&mut spans, &text, text_start, start);
            spans.push(span);
            text_start = cur.pos();
            continue;
        }
        if let Some(span) = try_parse_emphasis(&mut cur) {
            flush_text(&mut spans, &text, text_start, start);
            spans.push(span);
            text_start = cur.pos();
            continue;
        }
        cur.bump();
    }

    flush_text(&mut spans, &text, text_start, cur.pos());
    spans
}

fn flush_text(spans: &mut Vec<StyledSpan>, text: &str, start: usize, end: usize) {
    if end > start {
        spans.push(StyledSpan {
            text: text[start..end].to_string(),
            style: SpanStyle::Plain,
        });
    }
}

/// Attempts to parse a backtick code span at the current position.
///
/// Returns `None` if not at a backtick, or the span is empty or unclosed.
/// On failure the cursor is restored.
fn try_parse_code_span(cur: &mut Cursor<'_>) -> Option<StyledSpan> {
    if cur.peek() != Some(TICK) {
        return None;
    }

    let saved = cur.clone();
    cur.bump(); // `
    let inner_start = cur.pos();

    while !cur.eof() {
        if cur.peek() == Some(TICK) {
            break;
        }
        cur.bump();
    }
    let inner_end = cur.pos();

    if cur.peek() != Some(TICK) || inner_end == inner_start {
        *cur = saved;
        return None;
    }
    cur.bump(); // closing `

    Some(StyledSpan {
        text: cur.slice(inner_start, inner_end).to_string(),
        style: SpanStyle::Code,
    })
}

/// Attempts to parse `**bold**` at the current position.
fn try_parse_strong(cur: &mut Cursor<'_>) -> Option<StyledSpan> {
    if !cur.starts_with(STRONG) {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(STRONG.len());
    let inner_start = cur.pos();

    while !cur.eof() {
        if cur.starts_with(STRONG) {
            break;
        }
        cur.bump();
    }
    let inner_end = cur.pos();

    if !cur.starts_with(STRONG) || inner_end == inner_start {
        *cur = saved;
        return None;
    }
    cur.bump_n(STRONG.len());

    Some(StyledSpan {
        text: cur.slice(inner_start, inner_end).to_string(),
        style: SpanStyle::Bold,
    })
}

/// Attempts to parse `*italic*` or `_italic_` at the current position.
/// Underscores only open at a word edge so snake_case stays literal.
fn try_parse_emphasis(cur: &mut Cursor<'_>) -> Option<StyledSpan> {
    match cur.peek() {
        Some(STAR) => try_parse_delimited(cur, STAR, false),
        Some(UNDERSCORE) if at_word_edge(cur.prev()) => {
            try_parse_delimited(cur, UNDERSCORE, true)
        }
        _ => None,
    }
}

fn try_parse_delimited(cur: &mut Cursor<'_>, delimiter: u8, word_edges: bool) -> Option<StyledSpan> {
    let saved = cur.clone();
    cur.bump(); // opening delimiter
    let inner_start = cur.pos();

    let mut inner_end = None;
    while !cur.eof() {
        if cur.peek() == Some(delimiter) && (!word_edges || at_word_edge(cur.peek_next())) {
            inner_end = Some(cur.pos());
            break;
        }
        cur.bump();
    }

    let Some(inner_end) = inner_end else {
        *cur = saved;
        return None;
    };
    if inner_end == inner_start {
        *cur = saved;
        return None;
    }
    cur.bump(); // closing delimiter

    Some(StyledSpan {
        text: cur.slice(inner_start, inner_end).to_string(),
        style: SpanStyle::Italic,
    })
}

fn at_word_edge(byte: Option<u8>) -> bool {
    byte.is_none_or(|b| !b.is_ascii_alphanumeric() && b != UNDERSCORE)
}

fn link_regex() -> &'static Regex {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_REGEX.get_or_init(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("Invalid link regex"))
}

/// Byte cursor for left-to-right inline scanning. Delimiters are all ASCII,
/// so every recorded position sits on a char boundary.
#[derive(Clone)]
struct Cursor<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn pos(&self) -> usize {
        self.i
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Byte just after the current one.
    fn peek_next(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i + 1).copied()
    }

    /// Byte just before the current position.
    fn prev(&self) -> Option<u8> {
        self.i
            .checked_sub(1)
            .and_then(|i| self.s.as_bytes().get(i).copied())
    }

    fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i..].starts_with(pat)
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.s.as_bytes().get(self.i).copied()?;
        self.i += 1;
        Some(b)
    }

    fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.s[start..end]
    }
}
