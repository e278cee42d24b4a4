use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options as ParserOptions, Parser, Tag};
use tracing::debug;

use crate::tree::{Document, NodeId, NodeKind};

const SPOILER_DELIMITER: &str = "||";

/// Parse markdown text into a document tree
pub fn parse(markdown: &str) -> Document {
    let markdown = markdown.strip_prefix('\u{feff}').unwrap_or(markdown);
    let mut options = ParserOptions::empty();
    options.insert(ParserOptions::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut state = ParseState::new(markdown);

    for (event, range) in parser.into_offset_iter() {
        process_event(event, range, &mut state);
    }

    state.finish()
}

/// Open containers, innermost last
#[derive(Clone, Copy)]
enum Frame {
    Node(NodeId),
    // An opening `||` still waiting for its closing pair
    Spoiler(NodeId),
    // Tags we don't model (images, html blocks); children go to the enclosing node
    Transparent,
}

struct ParseState<'a> {
    source: &'a str,
    doc: Document,
    frames: Vec<Frame>,
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            doc: Document::new(),
            frames: Vec::new(),
        }
    }

    fn finish(mut self) -> Document {
        while !self.frames.is_empty() {
            self.close();
        }
        debug!(nodes = self.doc.len(), "parsed markdown");
        self.doc
    }

    fn container(&self) -> NodeId {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Node(id) | Frame::Spoiler(id) => Some(*id),
                Frame::Transparent => None,
            })
            .unwrap_or_else(|| self.doc.root())
    }

    fn open(&mut self, kind: NodeKind, blank_before: bool) {
        let id = self.doc.append(self.container(), kind, blank_before);
        self.frames.push(Frame::Node(id));
    }

    fn close(&mut self) {
        self.dissolve_open_spoilers();
        self.frames.pop();
    }

    /// Unmatched `||` openers become literal text again.
    fn dissolve_open_spoilers(&mut self) {
        while let Some(&Frame::Spoiler(id)) = self.frames.last() {
            self.frames.pop();
            self.doc.unwrap_to_text(id, SPOILER_DELIMITER);
        }
    }

    fn toggle_spoiler(&mut self) {
        if let Some(&Frame::Spoiler(_)) = self.frames.last() {
            self.frames.pop();
        } else {
            let id = self.doc.append(self.container(), NodeKind::Spoiler, false);
            self.frames.push(Frame::Spoiler(id));
        }
    }

    /// Split `text` on `||` pairs. Pipes marked in `escaped` never delimit.
    fn push_text(&mut self, text: &str, escaped: &[bool]) {
        let bytes = text.as_bytes();
        let unescaped = |i: usize| !escaped.get(i).copied().unwrap_or(false);
        let mut start = 0;
        let mut i = 0;
        while i + 1 < bytes.len() {
            if bytes[i..].starts_with(SPOILER_DELIMITER.as_bytes())
                && unescaped(i)
                && unescaped(i + 1)
            {
                self.push_literal(&text[start..i]);
                self.toggle_spoiler();
                i += SPOILER_DELIMITER.len();
                start = i;
            } else {
                i += 1;
            }
        }
        self.push_literal(&text[start..]);
    }

    fn push_literal(&mut self, text: &str) {
        if !text.is_empty() {
            self.doc.append(self.container(), NodeKind::text(text), false);
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.doc.append(self.container(), kind, false)
    }

    /// Flag the preceding text run as ending in a line break.
    fn mark_break(&mut self, hard: bool) {
        let container = self.container();
        let last = self.doc.children(container).last().copied();
        let target = match last {
            Some(id) if matches!(self.doc.kind(id), NodeKind::Text { .. }) => id,
            _ => self.push(NodeKind::text("")),
        };
        if let NodeKind::Text {
            soft_break,
            hard_break,
            ..
        } = &mut self.doc.node_mut(target).kind
        {
            if hard {
                *hard_break = true;
            } else {
                *soft_break = true;
            }
        }
    }

    fn open_code_block(&self) -> Option<NodeId> {
        match self.frames.last() {
            Some(&Frame::Node(id)) if matches!(self.doc.kind(id), NodeKind::CodeBlock { .. }) => {
                Some(id)
            }
            _ => None,
        }
    }

    fn push_code(&mut self, id: NodeId, text: &str) {
        if let NodeKind::CodeBlock { lines, .. } = &mut self.doc.node_mut(id).kind {
            lines.extend(text.split_inclusive('\n').map(str::to_string));
        }
    }

    fn blank_before(&self, range: &Range<usize>) -> bool {
        preceded_by_blank_line(self.source, range.start, self.in_blockquote())
    }

    fn in_blockquote(&self) -> bool {
        self.frames.iter().any(|frame| match frame {
            Frame::Node(id) => matches!(self.doc.kind(*id), NodeKind::Blockquote),
            _ => false,
        })
    }
}

fn process_event(event: Event, range: Range<usize>, state: &mut ParseState) {
    match event {
        Event::Start(tag) => {
            if is_block(&tag) {
                state.dissolve_open_spoilers();
            }
            start_tag(tag, &range, state);
        }
        Event::End(_) => state.close(),

        Event::Text(text) => {
            if let Some(code) = state.open_code_block() {
                state.push_code(code, &text);
                return;
            }
            let raw = state.source.get(range).unwrap_or_default();
            if is_character_reference(raw) && raw != &*text {
                state.push(NodeKind::RawString(text.into_string()));
            } else {
                let escaped = backslash_escaped(raw, &text).unwrap_or_default();
                state.push_text(&text, &escaped);
            }
        }

        // Inline code
        Event::Code(code) => {
            let span = state.push(NodeKind::CodeSpan);
            if !code.is_empty() {
                state
                    .doc
                    .append(span, NodeKind::text(code.into_string()), false);
            }
        }

        // Soft/hard breaks
        Event::SoftBreak => state.mark_break(false),
        Event::HardBreak => {
            state.mark_break(true);
            let raw = state.source.get(range).unwrap_or_default();
            if !raw.starts_with('\\') {
                state.push(NodeKind::DoubleSpace);
            }
        }

        // Raw html, rules, footnote references: nothing to render
        _ => {}
    }
}

fn start_tag(tag: Tag, range: &Range<usize>, state: &mut ParseState) {
    match tag {
        Tag::Paragraph => state.open(NodeKind::Paragraph, state.blank_before(range)),
        Tag::Heading { level, .. } => state.open(
            NodeKind::Heading {
                level: heading_level_to_u8(level),
            },
            state.blank_before(range),
        ),
        Tag::BlockQuote(_) => state.open(NodeKind::Blockquote, state.blank_before(range)),
        Tag::CodeBlock(kind) => {
            let language = match kind {
                CodeBlockKind::Fenced(info) => info
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                CodeBlockKind::Indented => String::new(),
            };
            state.open(
                NodeKind::CodeBlock {
                    language,
                    lines: Vec::new(),
                },
                state.blank_before(range),
            );
        }
        Tag::List(_) => state.open(NodeKind::List, state.blank_before(range)),
        Tag::Item => state.open(NodeKind::ListItem, state.blank_before(range)),

        Tag::Emphasis => state.open(NodeKind::Emphasis { level: 1 }, false),
        Tag::Strong => state.open(NodeKind::Emphasis { level: 2 }, false),
        Tag::Strikethrough => state.open(NodeKind::Strikethrough, false),
        Tag::Link { dest_url, .. } => state.open(
            NodeKind::Link {
                destination: dest_url.into_string(),
            },
            false,
        ),

        _ => state.frames.push(Frame::Transparent),
    }
}

fn is_block(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote(_)
            | Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::List(_)
            | Tag::Item
    )
}

/// `&amp;`, `&#35;`, `&#x23;` and friends.
fn is_character_reference(raw: &str) -> bool {
    raw.len() > 2 && raw.starts_with('&') && raw.ends_with(';')
}

/// For each byte of `text`, whether it came from a backslash escape in `raw`.
/// `None` when the two don't line up byte for byte.
fn backslash_escaped(raw: &str, text: &str) -> Option<Vec<bool>> {
    let raw = raw.as_bytes();
    let mut escaped = Vec::with_capacity(text.len());
    let mut r = 0;
    for &byte in text.as_bytes() {
        if raw.get(r) == Some(&b'\\')
            && raw.get(r + 1) == Some(&byte)
            && byte.is_ascii_punctuation()
        {
            escaped.push(true);
            r += 2;
        } else if raw.get(r) == Some(&byte) {
            escaped.push(false);
            r += 1;
        } else {
            return None;
        }
    }
    Some(escaped)
}

/// True when the line above the one containing `offset` holds nothing but
/// whitespace. Inside a block quote, `>` markers count as whitespace too.
fn preceded_by_blank_line(source: &str, offset: usize, quoted: bool) -> bool {
    let before = source.get(..offset).unwrap_or(source);
    let Some(line_start) = before.rfind('\n') else {
        return false;
    };
    let above = &before[..line_start];
    let previous_line = match above.rfind('\n') {
        Some(i) => &above[i + 1..],
        None => above,
    };
    previous_line
        .bytes()
        .all(|b| matches!(b, b' ' | b'\t' | b'\r') || (quoted && b == b'>'))
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
