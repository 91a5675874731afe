pub mod blocks;
pub mod inline;

pub use blocks::{MarkdownElement, parse_blocks};
pub use inline::{SpanStyle, StyledSpan, plain_text, resolve_spans};
