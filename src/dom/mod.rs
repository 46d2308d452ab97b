mod document;

pub use document::{Children, Document};

use crate::pool::Handle;

/// The closed set of node kinds a document tree is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Literal,
    Number,
    String,
    Element,
    Object,
    Array,
}

/// The three reserved-word values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Null,
    True,
    False,
}

impl Literal {
    pub fn as_str(self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::True => "true",
            Literal::False => "false",
        }
    }
}

/// Byte range into the document's owned buffer. String nodes keep their
/// content as a span instead of a copy; escape sequences inside it are
/// stored verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub(crate) fn empty() -> Self {
        Span { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub(crate) fn slice<'a>(&self, buffer: &'a str) -> &'a str {
        &buffer[self.start..self.end]
    }
}

/// Handle to one node of one [`Document`]. Only meaningful together with
/// the document that produced it; using a handle after the node was freed
/// (re-parse, clear) panics on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId {
    kind: NodeKind,
    handle: Handle,
}

impl NodeId {
    pub(crate) fn new(kind: NodeKind, handle: Handle) -> Self {
        Self { kind, handle }
    }

    pub fn kind(self) -> NodeKind {
        self.kind
    }

    pub(crate) fn handle(self) -> Handle {
        self.handle
    }
}

/// Owner of a linked node: either the document root list or another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Document,
    Node(NodeId),
}

/// Intrusive tree links carried by every node payload.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Links {
    pub(crate) parent: Option<Parent>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

#[derive(Debug)]
pub(crate) struct LiteralNode {
    pub(crate) links: Links,
    pub(crate) value: Literal,
}

impl LiteralNode {
    pub(crate) fn new() -> Self {
        Self {
            links: Links::default(),
            value: Literal::Null,
        }
    }
}

#[derive(Debug)]
pub(crate) struct NumberNode {
    pub(crate) links: Links,
    pub(crate) value: f64,
    pub(crate) value_int: i64,
}

impl NumberNode {
    pub(crate) fn new() -> Self {
        Self {
            links: Links::default(),
            value: 0.0,
            value_int: 0,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StringNode {
    pub(crate) links: Links,
    pub(crate) span: Span,
}

impl StringNode {
    pub(crate) fn new() -> Self {
        Self {
            links: Links::default(),
            span: Span::empty(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ElementNode {
    pub(crate) links: Links,
}

impl ElementNode {
    pub(crate) fn new() -> Self {
        Self {
            links: Links::default(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ObjectNode {
    pub(crate) links: Links,
}

impl ObjectNode {
    pub(crate) fn new() -> Self {
        Self {
            links: Links::default(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ArrayNode {
    pub(crate) links: Links,
}

impl ArrayNode {
    pub(crate) fn new() -> Self {
        Self {
            links: Links::default(),
        }
    }
}
