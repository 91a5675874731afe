use std::collections::HashMap;

const DELIMITER: &str = "---";

/// A single front-matter value.
///
/// The grammar distinguishes scalars from lists at parse time so consumers
/// pattern-match instead of re-splitting delimited strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

/// Parsed front-matter block: key to last-assigned value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: HashMap<String, Value>,
}

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Scalar value for `key`, if present and scalar.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Value::Scalar(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Splits a raw document into its front-matter block and body.
///
/// Front matter is only recognised at the very start of the document: a
/// first line that is exactly `---`, metadata lines, then a closing `---`
/// line. The body is everything after the closing delimiter and its
/// newline. Documents without that framing (including an unterminated
/// opening delimiter) come back with empty metadata and the whole input as
/// the body; a `---` later in the document is a horizontal rule, never
/// front matter.
pub fn parse(raw: &str) -> (FrontMatter, &str) {
    let mut lines = raw.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (FrontMatter::default(), raw);
    };
    if trim_line_end(first) != DELIMITER {
        return (FrontMatter::default(), raw);
    }

    let mut offset = first.len();
    let mut block = Vec::new();
    for line in lines {
        offset += line.len();
        if trim_line_end(line) == DELIMITER {
            return (parse_block(&block), &raw[offset..]);
        }
        block.push(trim_line_end(line));
    }

    // Opening delimiter that never closes: the whole input is body.
    (FrontMatter::default(), raw)
}

fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

fn parse_block(lines: &[&str]) -> FrontMatter {
    let mut fields = HashMap::new();
    // A bare `key:` opens a block list that grows while `- ` lines follow.
    let mut pending: Option<(String, Vec<String>)> = None;

    for line in lines {
        if let Some(item) = line.trim_start().strip_prefix("- ") {
            if let Some((_, items)) = pending.as_mut() {
                items.push(unquote(item.trim()).to_string());
            }
            // A list item with no open key is ignored.
            continue;
        }

        if let Some((key, items)) = pending.take() {
            fields.insert(key, Value::List(items));
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = value.trim();
        if value.is_empty() {
            pending = Some((key.to_string(), Vec::new()));
        } else {
            fields.insert(key.to_string(), parse_value(value));
        }
    }

    if let Some((key, items)) = pending.take() {
        fields.insert(key, Value::List(items));
    }

    FrontMatter { fields }
}

fn parse_value(value: &str) -> Value {
    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| unquote(item.trim()))
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        return Value::List(items);
    }
    Value::Scalar(unquote(value).to_string())
}

/// Strips one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
