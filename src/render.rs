use tracing::debug;

use crate::config::{Options, StyleTag};
use crate::escape::escape_into;
use crate::layout::{
    block_separation, indent_width, item_separation, list_depth, paragraph_separation,
};
use crate::tree::{Document, NodeId, NodeKind};

/// Render a document tree to MarkdownV2 bytes
pub fn render(doc: &Document, options: &Options) -> Vec<u8> {
    let mut writer = Writer {
        doc,
        options,
        out: Vec::new(),
    };
    writer.walk(doc.root());
    debug!(bytes = writer.out.len(), "rendered document");
    writer.out
}

enum Visit {
    Enter(NodeId),
    Leave(NodeId),
}

struct Writer<'a> {
    doc: &'a Document,
    options: &'a Options,
    out: Vec<u8>,
}

impl<'a> Writer<'a> {
    /// Depth-first walk; every node is entered once and left once.
    fn walk(&mut self, root: NodeId) {
        let mut stack = vec![Visit::Enter(root)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id) => {
                    self.visit(id, true);
                    stack.push(Visit::Leave(id));
                    stack.extend(self.doc.children(id).iter().rev().map(|&c| Visit::Enter(c)));
                }
                Visit::Leave(id) => self.visit(id, false),
            }
        }
    }

    fn visit(&mut self, id: NodeId, entering: bool) {
        let doc = self.doc;
        let options = self.options;
        match doc.kind(id) {
            NodeKind::Document => {
                // Multi-block documents end with a newline
                if !entering && doc.children(id).len() > 1 {
                    self.newlines(1);
                }
            }
            NodeKind::Paragraph => {
                if entering {
                    if let Some(count) = paragraph_separation(doc, id) {
                        self.newlines(count);
                    }
                }
            }
            NodeKind::Heading { level } => {
                let style = options.headings.for_level(*level);
                if entering {
                    self.newlines(block_separation(doc, id));
                    self.tag(style.tag);
                    escape_into(&mut self.out, style.prefix.as_bytes());
                } else {
                    escape_into(&mut self.out, style.postfix.as_bytes());
                    self.tag(style.tag);
                }
            }
            NodeKind::List => {
                if entering {
                    self.newlines(block_separation(doc, id));
                }
            }
            NodeKind::ListItem => {
                if entering {
                    self.list_item(id);
                }
            }
            NodeKind::Link { destination } => {
                if entering {
                    self.out.push(b'[');
                } else {
                    self.out.extend_from_slice(b"](");
                    self.out.extend_from_slice(destination.as_bytes());
                    self.out.push(b')');
                }
            }
            NodeKind::Blockquote => {
                if entering {
                    self.newlines(block_separation(doc, id));
                    self.out.push(b'>');
                }
            }
            NodeKind::CodeBlock { language, lines } => {
                if entering {
                    self.newlines(block_separation(doc, id));
                    self.tag(StyleTag::Code);
                    self.out.extend_from_slice(language.as_bytes());
                    self.newlines(1);
                } else {
                    for line in lines {
                        for &byte in line.as_bytes() {
                            if byte == b'\t' {
                                self.out.extend_from_slice(b"   ");
                            } else {
                                self.out.push(byte);
                            }
                        }
                    }
                    self.tag(StyleTag::Code);
                }
            }
            NodeKind::CodeSpan => self.tag(StyleTag::Span),
            NodeKind::Text {
                content,
                soft_break,
                hard_break,
            } => {
                if entering {
                    escape_into(&mut self.out, content.as_bytes());
                    if *soft_break || *hard_break {
                        self.newlines(1);
                    }
                }
            }
            NodeKind::RawString(content) => {
                if entering {
                    self.out.extend_from_slice(content.as_bytes());
                }
            }
            // Inline wrappers write the same tag on the way in and out
            NodeKind::Emphasis { level } => match level {
                2 => self.tag(StyleTag::Bold),
                1 => self.tag(StyleTag::Italics),
                _ => {}
            },
            NodeKind::Strikethrough => self.tag(StyleTag::Strikethrough),
            NodeKind::Spoiler => self.tag(StyleTag::Spoiler),
            NodeKind::DoubleSpace => {}
        }
    }

    fn list_item(&mut self, id: NodeId) {
        self.newlines(item_separation(self.doc, id));
        let depth = list_depth(self.doc, id);
        let glyph = self.options.bullets.glyph(depth);
        self.out.extend(std::iter::repeat_n(b' ', indent_width(depth)));
        let mut buf = [0; 4];
        self.out.extend_from_slice(glyph.encode_utf8(&mut buf).as_bytes());
        self.out.push(b' ');
    }

    fn tag(&mut self, tag: StyleTag) {
        self.out.extend_from_slice(tag.bytes());
    }

    fn newlines(&mut self, count: usize) {
        self.out.extend(std::iter::repeat_n(b'\n', count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeadingStyle, QuoteOptions};
    use crate::parser::parse;

    fn render_str(markdown: &str) -> String {
        render_with(markdown, &Options::default())
    }

    fn render_with(markdown: &str, options: &Options) -> String {
        String::from_utf8(render(&parse(markdown), options)).unwrap()
    }

    #[test]
    fn paragraph() {
        assert_eq!(render_str("AAAA.BBBB"), "AAAA\\.BBBB");
    }

    #[test]
    fn paragraphs_separated_by_blank_line() {
        assert_eq!(render_str("Para 1.\n\nPara 2."), "Para 1\\.\n\nPara 2\\.\n");
    }

    #[test]
    fn heading() {
        assert_eq!(render_str("# Heading One"), "*Heading One*");
        assert_eq!(render_str("#### Four"), "_Four_");
    }

    #[test]
    fn heading_prefix_and_postfix_are_escaped() {
        let options = Options::default().with_heading(
            1,
            HeadingStyle::new(StyleTag::Bold)
                .with_prefix("!!!")
                .with_postfix("!!!"),
        );
        assert_eq!(
            render_with("# Heading1 🎉", &options),
            "*\\!\\!\\!Heading1 🎉\\!\\!\\!*"
        );
    }

    #[test]
    fn heading_then_paragraph() {
        assert_eq!(render_str("# Title\n\nBody."), "*Title*\n\nBody\\.\n");
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(render_str("**bold** and *it*"), "*bold* and _it_");
    }

    #[test]
    fn strikethrough() {
        assert_eq!(render_str("~~strike~~"), "~strike~");
    }

    #[test]
    fn spoiler() {
        assert_eq!(render_str("a ||secret|| b"), "a ||secret|| b");
        assert_eq!(render_str("a || b"), "a \\|\\| b");
        assert_eq!(render_str("\\|||secret||"), "\\|||secret||");
    }

    #[test]
    fn inline_code() {
        assert_eq!(render_str("text `code` text"), "text `code` text");
    }

    #[test]
    fn link() {
        assert_eq!(render_str("[goldmark](url)"), "[goldmark](url)");
        assert_eq!(
            render_str("[a.b](https://example.com/x_y)"),
            "[a\\.b](https://example.com/x_y)"
        );
    }

    #[test]
    fn blockquote() {
        assert_eq!(render_str("> BQ"), ">BQ");
    }

    #[test]
    fn paragraph_after_quote_keeps_single_newline() {
        assert_eq!(render_str("> a\n>\nb"), ">a\nb\n");
        assert_eq!(render_str("> a\n\nb"), ">a\n\nb\n");
    }

    #[test]
    fn nested_blockquotes_stack_markers() {
        assert_eq!(render_str("> > deep"), ">>deep");
    }

    #[test]
    fn code_block() {
        assert_eq!(
            render_str("```go\nfunc main() {}\n```"),
            "```go\nfunc main() {}\n```"
        );
    }

    #[test]
    fn code_block_tabs_become_spaces() {
        assert_eq!(render_str("```\na\tb\n```"), "```\na   b\n```");
    }

    #[test]
    fn list_item() {
        assert_eq!(render_str("- Item 1"), "  • Item 1");
    }

    #[test]
    fn tight_list() {
        assert_eq!(render_str("- one\n- two"), "  • one\n  • two");
    }

    #[test]
    fn loose_list() {
        assert_eq!(render_str("- one\n\n- two"), "  • one\n\n  • two");
    }

    #[test]
    fn nested_list_bullets_and_indentation() {
        assert_eq!(
            render_str("- a\n  - b\n    - c\n      - d"),
            "  • a\n    ‣ b\n      ⁃ c\n        ⁃ d"
        );
    }

    #[test]
    fn custom_primary_bullet() {
        let options = Options::default().with_primary_bullet('◦');
        assert_eq!(render_with("- x", &options), "  ◦ x");
    }

    #[test]
    fn list_after_paragraph() {
        assert_eq!(render_str("Para\n- item"), "Para\n  • item\n");
        assert_eq!(render_str("Para\n\n- item"), "Para\n\n  • item\n");
    }

    #[test]
    fn soft_and_hard_breaks() {
        assert_eq!(render_str("Line 1\nLine 2"), "Line 1\nLine 2");
        assert_eq!(render_str("a  \nb"), "a\nb");
        assert_eq!(render_str("a\\\nb"), "a\nb");
    }

    #[test]
    fn rendering_ignores_quote_options() {
        let options = Options::default().with_quote(QuoteOptions {
            enable: true,
            expandable: true,
            expand_after_lines: 0,
        });
        assert_eq!(render_with("a", &options), "a");
    }

    #[test]
    fn empty_document() {
        assert_eq!(render_str(""), "");
    }

    #[test]
    fn leading_empty_paragraph_is_suppressed() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append(root, NodeKind::Paragraph, false);
        let heading = doc.append(root, NodeKind::Heading { level: 2 }, true);
        doc.append(heading, NodeKind::text("T"), false);

        let out = render(&doc, &Options::default());
        assert_eq!(String::from_utf8(out).unwrap(), "*T*\n");
    }
}
