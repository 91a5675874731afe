use std::sync::OnceLock;

use regex::Regex;

const FENCE: &str = "```";

/// One rendered block of an article body.
///
/// Produced in document order by a flat tokenizer: consecutive list items
/// and quote lines come out one element per source line, never merged or
/// nested.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownElement {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph(String),
    ListItem(String),
    Blockquote(String),
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Image {
        alt: String,
        url: String,
    },
    Rule,
}

enum State {
    Normal,
    InCodeBlock { language: Option<String> },
}

/// Tokenizes a body into an ordered sequence of blocks.
///
/// Lines are classified one at a time with a pending-paragraph accumulator:
/// consecutive plain lines join into one space-separated paragraph, flushed
/// by any structural line or a blank. Inside a code fence every line is
/// kept verbatim until the closing fence; a fence still open at end of
/// input is emitted with whatever accumulated.
pub fn parse_blocks(content: &str) -> Vec<MarkdownElement> {
    let mut elements = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut code_lines: Vec<&str> = Vec::new();
    let mut state = State::Normal;

    for line in content.lines() {
        state = match state {
            State::InCodeBlock { language } => {
                if line.trim() == FENCE {
                    elements.push(MarkdownElement::CodeBlock {
                        language,
                        code: code_lines.join("\n"),
                    });
                    code_lines.clear();
                    State::Normal
                } else {
                    code_lines.push(line);
                    State::InCodeBlock { language }
                }
            }
            State::Normal => classify_line(line, &mut elements, &mut paragraph),
        };
    }

    match state {
        // Unterminated fence: emit what accumulated.
        State::InCodeBlock { language } => elements.push(MarkdownElement::CodeBlock {
            language,
            code: code_lines.join("\n"),
        }),
        State::Normal => flush_paragraph(&mut elements, &mut paragraph),
    }

    elements
}

/// Handles one line in `Normal` state, in priority order: fence, rule,
/// image, blank, heading, list item, quote, paragraph text.
fn classify_line<'a>(
    line: &'a str,
    elements: &mut Vec<MarkdownElement>,
    paragraph: &mut Vec<&'a str>,
) -> State {
    let trimmed = line.trim();

    if let Some(rest) = trimmed.strip_prefix(FENCE) {
        flush_paragraph(elements, paragraph);
        let token = rest.trim();
        let language = (!token.is_empty()).then(|| token.to_string());
        return State::InCodeBlock { language };
    }

    if trimmed == "---" || trimmed == "***" || trimmed == "___" {
        flush_paragraph(elements, paragraph);
        elements.push(MarkdownElement::Rule);
        return State::Normal;
    }

    if let Some(captures) = image_regex().captures(trimmed) {
        flush_paragraph(elements, paragraph);
        elements.push(MarkdownElement::Image {
            alt: captures[1].to_string(),
            url: captures[2].to_string(),
        });
        return State::Normal;
    }

    if trimmed.is_empty() {
        flush_paragraph(elements, paragraph);
        return State::Normal;
    }

    if let Some(captures) = heading_regex().captures(trimmed) {
        flush_paragraph(elements, paragraph);
        elements.push(MarkdownElement::Heading {
            level: captures[1].len() as u8,
            text: captures[2].to_string(),
        });
        return State::Normal;
    }

    if let Some(item) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        flush_paragraph(elements, paragraph);
        elements.push(MarkdownElement::ListItem(item.to_string()));
        return State::Normal;
    }
    if let Some(marker) = ordered_marker_regex().find(trimmed) {
        flush_paragraph(elements, paragraph);
        elements.push(MarkdownElement::ListItem(trimmed[marker.end()..].to_string()));
        return State::Normal;
    }

    if let Some(quoted) = trimmed.strip_prefix("> ") {
        flush_paragraph(elements, paragraph);
        elements.push(MarkdownElement::Blockquote(quoted.to_string()));
        return State::Normal;
    }

    paragraph.push(trimmed);
    State::Normal
}

fn flush_paragraph(elements: &mut Vec<MarkdownElement>, paragraph: &mut Vec<&str>) {
    if !paragraph.is_empty() {
        elements.push(MarkdownElement::Paragraph(paragraph.join(" ")));
        paragraph.clear();
    }
}

fn heading_regex() -> &'static Regex {
    static HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADING_REGEX
        .get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("Invalid heading regex"))
}

fn ordered_marker_regex() -> &'static Regex {
    static ORDERED_MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    ORDERED_MARKER_REGEX
        .get_or_init(|| Regex::new(r"^\d+\.\s").expect("Invalid ordered marker regex"))
}

fn image_regex() -> &'static Regex {
    static IMAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    IMAGE_REGEX
        .get_or_init(|| Regex::new(r"^!\[([^\]]*)\]\(([^)]+)\)$").expect("Invalid image regex"))
}
