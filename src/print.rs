use crate::dom::{Document, NodeId, NodeKind, Parent};
use crate::options::PrintOptions;
use crate::visit::Visitor;

/// Pretty-printer that renders a tree back to JSON text.
///
/// Feed it to [`Document::accept`]; the rendered text accumulates in
/// the printer and stays available across walks until
/// [`into_string`](Printer::into_string) takes it.
///
/// # Examples
///
/// ```
/// use jsondom::{Document, Printer};
///
/// let mut doc = Document::new();
/// doc.parse("[1,2]").unwrap();
/// let mut printer = Printer::new();
/// doc.accept(&mut printer);
/// assert_eq!(printer.as_str(), "[\n    1,\n    2\n]");
/// ```
pub struct Printer {
    out: String,
    depth: usize,
    unit: String,
}

impl Printer {
    pub fn new() -> Self {
        Self::with_options(&PrintOptions::default())
    }

    pub fn with_options(options: &PrintOptions) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            unit: options.indent.unit(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn push_level_indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(&self.unit);
        }
    }

    // What precedes a node depends on its neighborhood: an element's
    // second child sits after its key, so it gets " : "; any other
    // later sibling starts a fresh line after a comma. Elements leave
    // indentation to their key string.
    fn push_separator(&mut self, doc: &Document, node: NodeId) {
        if doc.prev_sibling(node).is_some() {
            if let Some(Parent::Node(parent)) = doc.parent(node) {
                if parent.kind() == NodeKind::Element {
                    self.out.push_str(" : ");
                    return;
                }
            }
            self.out.push_str(",\n");
        }
        if node.kind() != NodeKind::Element {
            self.push_level_indent();
        }
    }

    fn push_number(&mut self, value: f64, truncated: i64) {
        if value.is_finite() && value.fract() == 0.0 && value == truncated as f64 {
            let mut buffer = itoa::Buffer::new();
            self.out.push_str(buffer.format(truncated));
        } else {
            let mut buffer = ryu::Buffer::new();
            self.out.push_str(buffer.format(value));
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for Printer {
    fn enter_object(&mut self, doc: &Document, node: NodeId) -> bool {
        self.push_separator(doc, node);
        self.out.push_str("{\n");
        self.depth += 1;
        true
    }

    fn exit_object(&mut self, _doc: &Document, _node: NodeId) -> bool {
        self.out.push('\n');
        self.depth -= 1;
        self.push_level_indent();
        self.out.push('}');
        true
    }

    fn enter_array(&mut self, doc: &Document, node: NodeId) -> bool {
        self.push_separator(doc, node);
        self.out.push_str("[\n");
        self.depth += 1;
        true
    }

    fn exit_array(&mut self, _doc: &Document, _node: NodeId) -> bool {
        self.out.push('\n');
        self.depth -= 1;
        self.push_level_indent();
        self.out.push(']');
        true
    }

    fn enter_element(&mut self, doc: &Document, node: NodeId) -> bool {
        self.push_separator(doc, node);
        true
    }

    fn visit_literal(&mut self, doc: &Document, node: NodeId) -> bool {
        self.push_separator(doc, node);
        if let Some(value) = doc.literal_value(node) {
            self.out.push_str(value.as_str());
        }
        true
    }

    fn visit_number(&mut self, doc: &Document, node: NodeId) -> bool {
        self.push_separator(doc, node);
        if let (Some(value), Some(truncated)) =
            (doc.number_value(node), doc.number_value_int(node))
        {
            self.push_number(value, truncated);
        }
        true
    }

    fn visit_string(&mut self, doc: &Document, node: NodeId) -> bool {
        self.push_separator(doc, node);
        if let Some(raw) = doc.string_str(node) {
            self.out.push('"');
            self.out.push_str(raw);
            self.out.push('"');
        }
        true
    }
}
