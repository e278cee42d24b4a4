/// Index of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node represents, along with its kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading {
        level: u8,
    },
    List,
    ListItem,
    Link {
        destination: String,
    },
    Blockquote,
    CodeBlock {
        language: String,
        lines: Vec<String>,
    },
    CodeSpan,
    Text {
        content: String,
        soft_break: bool,
        hard_break: bool,
    },
    /// Already-safe content written without escaping (decoded entities).
    RawString(String),
    /// Level 1 is light emphasis, level 2 is strong.
    Emphasis {
        level: u8,
    },
    Strikethrough,
    Spoiler,
    /// Structural marker left by trailing-space line breaks. Renders nothing.
    DoubleSpace,
}

impl NodeKind {
    /// A plain text node without line-break flags.
    pub fn text(content: impl Into<String>) -> Self {
        NodeKind::Text {
            content: content.into(),
            soft_break: false,
            hard_break: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Set when a blank source line preceded this block.
    pub blank_before: bool,
}

/// Parsed document tree, stored as an arena with the root at index 0.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                blank_before: false,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, root included.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Add a node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind, blank_before: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            blank_before,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn blank_before(&self, id: NodeId) -> bool {
        self.nodes[id.0].blank_before
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&s| s == id)?;
        pos.checked_sub(1).map(|prev| siblings[prev])
    }

    /// Walk from the parent of `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// An empty paragraph is what some inputs (a lone BOM) leave behind.
    pub fn is_empty_paragraph(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Paragraph) && self.children(id).is_empty()
    }

    /// Replace `id` with a text node holding `literal`, hoisting its former
    /// children to follow it in the parent.
    pub(crate) fn unwrap_to_text(&mut self, id: NodeId, literal: &str) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        self.nodes[id.0].kind = NodeKind::text(literal);
        let Some(parent) = self.parent(id) else {
            return;
        };
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(pos) = siblings.iter().position(|&s| s == id) {
            siblings.splice(pos + 1..pos + 1, children);
        }
    }
}
