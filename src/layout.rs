//! Vertical spacing between blocks and list item geometry.
//!
//! Every function here is pure over the tree: it looks at a node's position
//! and its blank-line flag and answers how many newlines to write before it,
//! or how deep and how indented a list item is.

use crate::tree::{Document, NodeId, NodeKind};

/// The first child of the document produces no leading newlines, and neither
/// does the second one when the first is an empty paragraph.
pub fn is_first_visible_block(doc: &Document, id: NodeId) -> bool {
    let Some(parent) = doc.parent(id) else {
        return false;
    };
    if !matches!(doc.kind(parent), NodeKind::Document) {
        return false;
    }
    match doc.previous_sibling(id) {
        None => !doc.is_empty_paragraph(id),
        Some(prev) => {
            doc.is_empty_paragraph(prev)
                && doc.previous_sibling(prev).is_none()
                && !doc.is_empty_paragraph(id)
        }
    }
}

/// Newlines to write before a heading, list, block quote, code block or
/// top-level paragraph.
pub fn block_separation(doc: &Document, id: NodeId) -> usize {
    if is_first_visible_block(doc, id) {
        return 0;
    }
    if doc.blank_before(id) {
        return 2;
    }
    match doc.previous_sibling(id) {
        Some(prev) if !doc.is_empty_paragraph(prev) => 1,
        _ => 0,
    }
}

/// Returns `None` for the empty leading paragraph, which renders nothing at all.
pub fn paragraph_separation(doc: &Document, id: NodeId) -> Option<usize> {
    let parent = doc.parent(id)?;
    let prev = doc.previous_sibling(id);

    match doc.kind(parent) {
        NodeKind::Document if prev.is_none() && doc.is_empty_paragraph(id) => None,
        // Content flows straight after the bullet or `>` marker
        NodeKind::ListItem | NodeKind::Blockquote => {
            Some(if doc.blank_before(id) && prev.is_some() { 2 } else { 0 })
        }
        _ => Some(block_separation(doc, id)),
    }
}

/// Newlines separating a list item from the item before it.
pub fn item_separation(doc: &Document, id: NodeId) -> usize {
    match doc.previous_sibling(id) {
        None => 0,
        Some(_) if doc.blank_before(id) => 2,
        Some(_) => 1,
    }
}

/// Number of enclosing lists beyond the first; the outermost list is depth 0.
pub fn list_depth(doc: &Document, id: NodeId) -> usize {
    doc.ancestors(id)
        .filter(|&a| matches!(doc.kind(a), NodeKind::List))
        .count()
        .saturating_sub(1)
}

pub fn indent_width(depth: usize) -> usize {
    depth * 2 + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(doc: &mut Document, parent: NodeId, blank: bool, text: &str) -> NodeId {
        let id = doc.append(parent, NodeKind::Paragraph, blank);
        doc.append(id, NodeKind::text(text), false);
        id
    }

    #[test]
    fn first_block_has_no_separation() {
        let mut doc = Document::new();
        let root = doc.root();
        let first = paragraph(&mut doc, root, true, "a");
        assert!(is_first_visible_block(&doc, first));
        assert_eq!(block_separation(&doc, first), 0);
    }

    #[test]
    fn leading_empty_paragraph_is_skipped() {
        let mut doc = Document::new();
        let root = doc.root();
        let empty = doc.append(root, NodeKind::Paragraph, false);
        let heading = doc.append(root, NodeKind::Heading { level: 1 }, true);

        assert!(!is_first_visible_block(&doc, empty));
        assert_eq!(paragraph_separation(&doc, empty), None);
        assert!(is_first_visible_block(&doc, heading));
        assert_eq!(block_separation(&doc, heading), 0);
    }

    #[test]
    fn following_empty_paragraph_adds_nothing() {
        let mut doc = Document::new();
        let root = doc.root();
        paragraph(&mut doc, root, false, "a");
        doc.append(root, NodeKind::Paragraph, false);
        let list = doc.append(root, NodeKind::List, false);
        assert_eq!(block_separation(&doc, list), 0);
    }

    #[test]
    fn separation_follows_blank_flag() {
        let mut doc = Document::new();
        let root = doc.root();
        paragraph(&mut doc, root, false, "a");
        let tight = paragraph(&mut doc, root, false, "b");
        let loose = paragraph(&mut doc, root, true, "c");
        assert_eq!(block_separation(&doc, tight), 1);
        assert_eq!(block_separation(&doc, loose), 2);
    }

    #[test]
    fn container_paragraphs_skip_leading_gap() {
        let mut doc = Document::new();
        let root = doc.root();
        let quote = doc.append(root, NodeKind::Blockquote, false);
        let first = paragraph(&mut doc, quote, true, "a");
        let second = paragraph(&mut doc, quote, true, "b");
        let third = paragraph(&mut doc, quote, false, "c");

        assert_eq!(paragraph_separation(&doc, first), Some(0));
        assert_eq!(paragraph_separation(&doc, second), Some(2));
        assert_eq!(paragraph_separation(&doc, third), Some(0));
    }

    #[test]
    fn list_depth_counts_enclosing_lists() {
        let mut doc = Document::new();
        let root = doc.root();
        let outer = doc.append(root, NodeKind::List, false);
        let item = doc.append(outer, NodeKind::ListItem, false);
        let inner = doc.append(item, NodeKind::List, false);
        let nested = doc.append(inner, NodeKind::ListItem, false);
        let second = doc.append(inner, NodeKind::ListItem, true);

        assert_eq!(list_depth(&doc, item), 0);
        assert_eq!(list_depth(&doc, nested), 1);
        assert_eq!(indent_width(list_depth(&doc, nested)), 4);
        assert_eq!(item_separation(&doc, nested), 0);
        assert_eq!(item_separation(&doc, second), 2);
    }
}
