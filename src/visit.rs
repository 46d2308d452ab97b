use crate::dom::{Document, NodeId, NodeKind};

/// Depth-first callbacks over a parsed tree.
///
/// Container kinds get an enter/exit pair and leaves a single visit;
/// every method defaults to doing nothing and continuing. Returning
/// `false` from an enter skips that node's children, and `false` from
/// any callback stops the sibling walk above it. An entered node's
/// exit runs even when the walk below it was cut short.
pub trait Visitor {
    fn enter_object(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn exit_object(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn enter_array(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn exit_array(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn enter_element(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn exit_element(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn visit_literal(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn visit_number(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }

    fn visit_string(&mut self, _doc: &Document, _node: NodeId) -> bool {
        true
    }
}

impl Document {
    /// Runs `visitor` over every root subtree in order. A root whose
    /// walk returns `false` stops the remaining roots.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> bool {
        for node in self.roots() {
            if !self.accept_node(node, visitor) {
                break;
            }
        }
        true
    }

    /// Walks a single subtree; the return value is what the node's last
    /// callback (exit for containers, visit for leaves) produced.
    pub fn accept_node<V: Visitor>(&self, node: NodeId, visitor: &mut V) -> bool {
        match node.kind() {
            NodeKind::Literal => visitor.visit_literal(self, node),
            NodeKind::Number => visitor.visit_number(self, node),
            NodeKind::String => visitor.visit_string(self, node),
            NodeKind::Element => {
                if visitor.enter_element(self, node) {
                    self.accept_each_child(node, visitor);
                }
                visitor.exit_element(self, node)
            }
            NodeKind::Object => {
                if visitor.enter_object(self, node) {
                    self.accept_each_child(node, visitor);
                }
                visitor.exit_object(self, node)
            }
            NodeKind::Array => {
                if visitor.enter_array(self, node) {
                    self.accept_each_child(node, visitor);
                }
                visitor.exit_array(self, node)
            }
        }
    }

    fn accept_each_child<V: Visitor>(&self, node: NodeId, visitor: &mut V) {
        for child in self.children(node) {
            if !self.accept_node(child, visitor) {
                break;
            }
        }
    }
}
