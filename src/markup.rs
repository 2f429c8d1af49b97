//! Markup scanner for documentation comments.
//!
//! Tokenizes a comment span into text runs and single start tags (`<img
//! src="...">`), extracting attributes with exact byte offsets into the
//! *original* document text — the same coordinate space later text edits
//! target. The scanner recognizes start tags only: no closing tags, no
//! nesting, no well-formedness checks. Anything it does not recognize is
//! skipped or coarsely bounded; scanning never fails.

use std::ops::Range;

/// A flat list of markup nodes scanned from one comment span.
#[derive(Debug)]
pub struct CommentMarkup {
    /// Text runs and tag-start nodes in document order.
    pub nodes: Vec<MarkupNode>,
}

impl CommentMarkup {
    /// Iterate over the tag-start nodes, skipping text runs.
    pub fn tags(&self) -> impl Iterator<Item = &TagStart> {
        return self.nodes.iter().filter_map(|n| {
            return match n {
                MarkupNode::TagStart(tag) => Some(tag),
                MarkupNode::Text(_) => None,
            };
        });
    }
}

/// One node of a scanned comment: a plain text run or a start tag.
#[derive(Debug)]
pub enum MarkupNode {
    /// A recognized start tag with its attributes.
    TagStart(TagStart),
    /// A run of text between tags (including anything unrecognized).
    Text(SourceString),
}

/// A substring of the scanned document carrying its exact byte offsets.
/// `text` always equals the document content at `start..end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceString {
    /// Byte offset of the last character, exclusive.
    pub end: usize,
    /// Byte offset of the first character in the document.
    pub start: usize,
    /// The substring itself.
    pub text: String,
}

impl SourceString {
    /// An empty string positioned at `pos`, for attributes without a value.
    fn empty_at(pos: usize) -> Self {
        return Self { end: pos, start: pos, text: String::new() };
    }

    /// True when the substring is empty.
    pub fn is_empty(&self) -> bool {
        return self.start == self.end;
    }

    /// Length of the substring in bytes.
    pub fn len(&self) -> usize {
        return self.end - self.start;
    }

    /// The byte range of the substring in the document.
    pub fn span(&self) -> Range<usize> {
        return self.start..self.end;
    }
}

/// A named attribute of a start tag. The value span bounds exactly the value
/// payload (inside the quotes when quoted), so a caller can replace precisely
/// the value and nothing else.
#[derive(Debug)]
pub struct TagAttr {
    /// The attribute name.
    pub name: SourceString,
    /// The attribute value; empty and zero-length when the attribute has none.
    pub value: SourceString,
}

/// A single start tag: name, ordered attributes, and the tag's own bounds.
/// An unterminated tag is bounded at the end of the scanned span.
#[derive(Debug)]
pub struct TagStart {
    /// Ordered attribute list as written in the tag.
    pub attrs: Vec<TagAttr>,
    /// Byte offset one past the closing `>`, or the span end if unterminated.
    pub end: usize,
    /// The tag name.
    pub name: SourceString,
    /// Byte offset of the opening `<`.
    pub start: usize,
}

impl TagStart {
    /// Look up an attribute by name. Returns `None` if absent.
    pub fn attr(&self, name: &str) -> Option<&TagAttr> {
        return self.attrs.iter().find(|a| return a.name.text == name);
    }
}

/// Scan one comment span of `source` into markup nodes.
///
/// All offsets in the result are absolute byte offsets into `source`. The
/// span is clamped to the source length; an inverted span yields no nodes.
pub fn scan(source: &str, span: Range<usize>) -> CommentMarkup {
    let end = span.end.min(source.len());
    let start = span.start.min(end);
    let mut scanner = Scanner { end, pos: start, source };
    return scanner.run();
}

/// Byte length of the UTF-8 character starting with `lead`.
fn char_len(lead: u8) -> usize {
    if lead < 0x80 {
        return 1;
    } else if lead >> 5 == 0b110 {
        return 2;
    } else if lead >> 4 == 0b1110 {
        return 3;
    } else {
        return 4;
    }
}

/// Bytes allowed in tag and attribute names.
fn is_name_byte(b: u8) -> bool {
    return b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':';
}

/// Bytes skipped between attributes: whitespace, plus the `*` of a
/// documentation-comment continuation line when a tag spans lines.
fn is_tag_space(b: u8) -> bool {
    return b.is_ascii_whitespace() || b == b'*';
}

/// Single-pass scanner over one span of the document.
struct Scanner<'a> {
    /// End of the scanned span, exclusive.
    end: usize,
    /// Current byte position.
    pos: usize,
    /// The full document text.
    source: &'a str,
}

impl Scanner<'_> {
    /// Step over the character at the current position.
    fn advance(&mut self) {
        self.pos += char_len(self.peek().unwrap_or(b' '));
    }

    /// The byte at the current position, if within the span.
    fn peek(&self) -> Option<u8> {
        if self.pos >= self.end {
            return None;
        }
        return self.source.as_bytes().get(self.pos).copied();
    }

    /// Consume a run of name bytes into a positioned substring.
    fn read_name(&mut self) -> SourceString {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        return self.slice(start, self.pos);
    }

    /// Parse one attribute starting at a name byte.
    fn read_attr(&mut self) -> TagAttr {
        let name = self.read_name();
        self.skip_tag_space();
        if self.peek() != Some(b'=') {
            let at = name.end;
            return TagAttr { name, value: SourceString::empty_at(at) };
        }
        self.pos += 1;
        self.skip_tag_space();
        let value = self.read_value();
        return TagAttr { name, value };
    }

    /// Parse a start tag; the current position is at `<` followed by a letter.
    /// Tolerant by construction: a missing `>` bounds the tag at the span end.
    fn read_tag(&mut self) -> TagStart {
        let start = self.pos;
        self.pos += 1;
        let name = self.read_name();
        let mut attrs = Vec::new();

        loop {
            self.skip_tag_space();
            match self.peek() {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                },
                Some(b'/') => self.pos += 1,
                Some(b) if is_name_byte(b) => attrs.push(self.read_attr()),
                // Stray byte inside the tag: tolerate and keep going.
                Some(_) => self.advance(),
            }
        }

        return TagStart { attrs, end: self.pos, name, start };
    }

    /// Parse an attribute value: quoted (payload between the quotes) or a
    /// bare token. An unterminated quote bounds the value at the span end.
    fn read_value(&mut self) -> SourceString {
        match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b == q {
                        break;
                    }
                    self.advance();
                }
                let value = self.slice(start, self.pos);
                if self.peek() == Some(q) {
                    self.pos += 1;
                }
                return value;
            },
            Some(_) => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if is_tag_space(b) || b == b'>' {
                        break;
                    }
                    self.advance();
                }
                return self.slice(start, self.pos);
            },
            None => return SourceString::empty_at(self.pos),
        }
    }

    /// Scan the whole span into nodes.
    fn run(&mut self) -> CommentMarkup {
        let mut nodes = Vec::new();
        let mut text_start = self.pos;

        while let Some(b) = self.peek() {
            let next = (self.pos + 1 < self.end)
                .then(|| return self.source.as_bytes().get(self.pos + 1).copied())
                .flatten();
            if b == b'<' && next.is_some_and(|n| return n.is_ascii_alphabetic()) {
                if self.pos > text_start {
                    nodes.push(MarkupNode::Text(self.slice(text_start, self.pos)));
                }
                nodes.push(MarkupNode::TagStart(self.read_tag()));
                text_start = self.pos;
            } else {
                self.advance();
            }
        }

        if self.pos > text_start {
            nodes.push(MarkupNode::Text(self.slice(text_start, self.pos)));
        }

        return CommentMarkup { nodes };
    }

    /// Skip whitespace and comment-continuation asterisks inside a tag.
    fn skip_tag_space(&mut self) {
        while self.peek().is_some_and(is_tag_space) {
            self.pos += 1;
        }
    }

    /// A positioned substring of the document.
    fn slice(&self, start: usize, end: usize) -> SourceString {
        let text = self.source.get(start..end).unwrap_or("").to_string();
        return SourceString { end, start, text };
    }
}
