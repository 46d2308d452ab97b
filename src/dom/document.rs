use crate::dom::{
    ArrayNode, ElementNode, Links, Literal, LiteralNode, NodeId, NodeKind, NumberNode, ObjectNode,
    Parent, Span, StringNode,
};
use crate::error::{ErrorCode, Location, ParseError};
use crate::parse::Parser;
use crate::pool::{Pool, PoolStats};
use crate::text;

/// Owner of one parsed tree: the input buffer copy, one pool per node
/// kind, the root child list, and the outcome of the last parse.
///
/// A document is reusable; every [`parse`](Document::parse) call tears
/// down the previous tree first and pool memory is recycled across
/// parses. Node handles obtained before a re-parse are stale afterwards
/// and panic on access.
///
/// # Examples
/// ```
/// use jsondom::{Document, NodeKind};
///
/// let mut doc = Document::new();
/// doc.parse("{\"a\": [1, 2]}").unwrap();
/// let root = doc.first_root().unwrap();
/// assert_eq!(root.kind(), NodeKind::Object);
/// ```
#[derive(Debug)]
pub struct Document {
    buffer: String,
    literal_pool: Pool<LiteralNode>,
    number_pool: Pool<NumberNode>,
    string_pool: Pool<StringNode>,
    element_pool: Pool<ElementNode>,
    object_pool: Pool<ObjectNode>,
    array_pool: Pool<ArrayNode>,
    first_root: Option<NodeId>,
    last_root: Option<NodeId>,
    error: Option<ParseError>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            literal_pool: Pool::new(),
            number_pool: Pool::new(),
            string_pool: Pool::new(),
            element_pool: Pool::new(),
            object_pool: Pool::new(),
            array_pool: Pool::new(),
            first_root: None,
            last_root: None,
            error: None,
        }
    }

    /// Parses `input`, replacing whatever tree the document held before.
    ///
    /// Returns the first error encountered; the same error stays
    /// queryable through [`error`](Document::error) and
    /// [`error_code`](Document::error_code) until the next parse. Empty
    /// or whitespace-only input is the `empty-document` error.
    pub fn parse(&mut self, input: &str) -> Result<(), ParseError> {
        self.reset();
        if input.is_empty() {
            return Err(self.fail(ParseError::new(ErrorCode::EmptyDocument, 0)));
        }
        self.buffer.push_str(input);
        let start = text::skip_whitespace(self.buffer.as_bytes(), 0);
        if start == self.buffer.len() {
            return Err(self.fail(ParseError::new(ErrorCode::EmptyDocument, start)));
        }
        match Parser::new(self).parse_document(start) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Like [`parse`](Document::parse) but validates that the bytes are
    /// UTF-8 first; invalid input fails with `generic-parsing` at the
    /// first bad byte.
    pub fn parse_bytes(&mut self, input: &[u8]) -> Result<(), ParseError> {
        match std::str::from_utf8(input) {
            Ok(input) => self.parse(input),
            Err(error) => {
                self.reset();
                Err(self.fail(ParseError::new(ErrorCode::Parsing, error.valid_up_to())))
            }
        }
    }

    /// Tears down the tree and forgets the buffer and any recorded error.
    pub fn clear(&mut self) {
        self.reset();
    }

    pub fn error(&self) -> Option<ParseError> {
        self.error
    }

    pub fn error_code(&self) -> ErrorCode {
        match self.error {
            Some(error) => error.code,
            None => ErrorCode::NoError,
        }
    }

    /// Line/column of the recorded error inside the parsed buffer.
    pub fn error_location(&self) -> Option<Location> {
        self.error
            .map(|error| text::locate(&self.buffer, error.offset))
    }

    // First error of a parse run wins; reset() starts the next run fresh.
    fn fail(&mut self, error: ParseError) -> ParseError {
        if self.error.is_none() {
            log::debug!("parse failed: {error}");
            self.error = Some(error);
        }
        error
    }

    fn reset(&mut self) {
        self.delete_children_of(Parent::Document);
        #[cfg(debug_assertions)]
        if self.error.is_none() {
            debug_assert!(
                self.pools_balanced(),
                "pool outstanding/untracked counters diverged"
            );
        }
        self.error = None;
        self.buffer.clear();
    }

    pub(crate) fn buffer(&self) -> &str {
        &self.buffer
    }

    // ---- navigation ----

    pub fn first_root(&self) -> Option<NodeId> {
        self.first_root
    }

    pub fn last_root(&self) -> Option<NodeId> {
        self.last_root
    }

    pub fn parent(&self, id: NodeId) -> Option<Parent> {
        self.links(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.links(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.links(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.links(id).next
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.links(id).prev
    }

    /// Iterates the top-level values in textual order.
    pub fn roots(&self) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_root,
        }
    }

    /// Iterates the direct children of `id` in textual order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    // ---- typed accessors ----

    pub fn literal_value(&self, id: NodeId) -> Option<Literal> {
        match id.kind() {
            NodeKind::Literal => Some(self.literal_pool.get(id.handle()).value),
            _ => None,
        }
    }

    pub fn number_value(&self, id: NodeId) -> Option<f64> {
        match id.kind() {
            NodeKind::Number => Some(self.number_pool.get(id.handle()).value),
            _ => None,
        }
    }

    /// The number truncated toward zero, captured at parse time.
    pub fn number_value_int(&self, id: NodeId) -> Option<i64> {
        match id.kind() {
            NodeKind::Number => Some(self.number_pool.get(id.handle()).value_int),
            _ => None,
        }
    }

    pub fn string_span(&self, id: NodeId) -> Option<Span> {
        match id.kind() {
            NodeKind::String => Some(self.string_pool.get(id.handle()).span),
            _ => None,
        }
    }

    /// Raw string content between the quotes, escapes untouched.
    pub fn string_str(&self, id: NodeId) -> Option<&str> {
        self.string_span(id).map(|span| span.slice(&self.buffer))
    }

    pub fn string_is_empty(&self, id: NodeId) -> Option<bool> {
        self.string_span(id).map(|span| span.is_empty())
    }

    /// Key text of an element, when `id` is an element whose key has
    /// been parsed.
    pub fn element_key(&self, id: NodeId) -> Option<&str> {
        match id.kind() {
            NodeKind::Element => self.string_str(self.first_child(id)?),
            _ => None,
        }
    }

    /// Value node of an element (the child after the key).
    pub fn element_value(&self, id: NodeId) -> Option<NodeId> {
        match id.kind() {
            NodeKind::Element => self.next_sibling(self.first_child(id)?),
            _ => None,
        }
    }

    // ---- factories (parsing is the only producer of nodes) ----

    pub(crate) fn new_literal(&mut self) -> NodeId {
        NodeId::new(NodeKind::Literal, self.literal_pool.allocate(LiteralNode::new()))
    }

    pub(crate) fn new_number(&mut self) -> NodeId {
        NodeId::new(NodeKind::Number, self.number_pool.allocate(NumberNode::new()))
    }

    pub(crate) fn new_string(&mut self) -> NodeId {
        NodeId::new(NodeKind::String, self.string_pool.allocate(StringNode::new()))
    }

    pub(crate) fn new_element(&mut self) -> NodeId {
        NodeId::new(NodeKind::Element, self.element_pool.allocate(ElementNode::new()))
    }

    pub(crate) fn new_object(&mut self) -> NodeId {
        NodeId::new(NodeKind::Object, self.object_pool.allocate(ObjectNode::new()))
    }

    pub(crate) fn new_array(&mut self) -> NodeId {
        NodeId::new(NodeKind::Array, self.array_pool.allocate(ArrayNode::new()))
    }

    pub(crate) fn set_literal(&mut self, id: NodeId, value: Literal) {
        match id.kind() {
            NodeKind::Literal => self.literal_pool.get_mut(id.handle()).value = value,
            _ => panic!("node is not a literal"),
        }
    }

    pub(crate) fn set_number(&mut self, id: NodeId, value: f64) {
        match id.kind() {
            NodeKind::Number => {
                let node = self.number_pool.get_mut(id.handle());
                node.value = value;
                node.value_int = value as i64;
            }
            _ => panic!("node is not a number"),
        }
    }

    pub(crate) fn set_string_span(&mut self, id: NodeId, span: Span) {
        match id.kind() {
            NodeKind::String => self.string_pool.get_mut(id.handle()).span = span,
            _ => panic!("node is not a string"),
        }
    }

    // ---- intrusive tree operations ----

    pub(crate) fn links(&self, id: NodeId) -> &Links {
        match id.kind() {
            NodeKind::Literal => &self.literal_pool.get(id.handle()).links,
            NodeKind::Number => &self.number_pool.get(id.handle()).links,
            NodeKind::String => &self.string_pool.get(id.handle()).links,
            NodeKind::Element => &self.element_pool.get(id.handle()).links,
            NodeKind::Object => &self.object_pool.get(id.handle()).links,
            NodeKind::Array => &self.array_pool.get(id.handle()).links,
        }
    }

    fn links_mut(&mut self, id: NodeId) -> &mut Links {
        match id.kind() {
            NodeKind::Literal => &mut self.literal_pool.get_mut(id.handle()).links,
            NodeKind::Number => &mut self.number_pool.get_mut(id.handle()).links,
            NodeKind::String => &mut self.string_pool.get_mut(id.handle()).links,
            NodeKind::Element => &mut self.element_pool.get_mut(id.handle()).links,
            NodeKind::Object => &mut self.object_pool.get_mut(id.handle()).links,
            NodeKind::Array => &mut self.array_pool.get_mut(id.handle()).links,
        }
    }

    fn first_child_of(&self, parent: Parent) -> Option<NodeId> {
        match parent {
            Parent::Document => self.first_root,
            Parent::Node(id) => self.links(id).first_child,
        }
    }

    fn last_child_of(&self, parent: Parent) -> Option<NodeId> {
        match parent {
            Parent::Document => self.last_root,
            Parent::Node(id) => self.links(id).last_child,
        }
    }

    fn set_first_child_of(&mut self, parent: Parent, value: Option<NodeId>) {
        match parent {
            Parent::Document => self.first_root = value,
            Parent::Node(id) => self.links_mut(id).first_child = value,
        }
    }

    fn set_last_child_of(&mut self, parent: Parent, value: Option<NodeId>) {
        match parent {
            Parent::Document => self.last_root = value,
            Parent::Node(id) => self.links_mut(id).last_child = value,
        }
    }

    /// O(1) append to the tail of `parent`'s child list. Each node is
    /// linked at most once; callers never re-parent.
    pub(crate) fn insert_end_child(&mut self, parent: Parent, child: NodeId) {
        match self.last_child_of(parent) {
            Some(last) => {
                self.links_mut(last).next = Some(child);
                let links = self.links_mut(child);
                links.prev = Some(last);
                links.next = None;
                links.parent = Some(parent);
                self.set_last_child_of(parent, Some(child));
            }
            None => {
                let links = self.links_mut(child);
                links.prev = None;
                links.next = None;
                links.parent = Some(parent);
                self.set_first_child_of(parent, Some(child));
                self.set_last_child_of(parent, Some(child));
            }
        }
        #[cfg(debug_assertions)]
        self.mark_tracked(child);
    }

    /// O(1) detach of `child` from its direct parent. The recorded
    /// parent must match `parent`; anything else is a caller bug.
    pub(crate) fn unlink(&mut self, parent: Parent, child: NodeId) {
        debug_assert_eq!(
            self.links(child).parent,
            Some(parent),
            "unlink from a node that is not the parent"
        );
        let (prev, next) = {
            let links = self.links(child);
            (links.prev, links.next)
        };
        if self.first_child_of(parent) == Some(child) {
            self.set_first_child_of(parent, next);
        }
        if self.last_child_of(parent) == Some(child) {
            self.set_last_child_of(parent, prev);
        }
        if let Some(prev) = prev {
            self.links_mut(prev).next = next;
        }
        if let Some(next) = next {
            self.links_mut(next).prev = prev;
        }
        self.links_mut(child).parent = None;
    }

    /// Unlinks and frees every child of `parent`, post-order.
    pub(crate) fn delete_children_of(&mut self, parent: Parent) {
        while let Some(child) = self.first_child_of(parent) {
            self.unlink(parent, child);
            self.delete_subtree(child);
        }
    }

    fn delete_subtree(&mut self, id: NodeId) {
        self.delete_children_of(Parent::Node(id));
        if let Some(parent) = self.links(id).parent {
            self.unlink(parent, id);
        }
        self.free_node(id);
    }

    /// Frees a node the parser allocated but never linked, together with
    /// any children that were already attached to it.
    pub(crate) fn discard_unlinked(&mut self, id: NodeId) {
        #[cfg(debug_assertions)]
        self.mark_tracked(id);
        self.delete_subtree(id);
    }

    fn free_node(&mut self, id: NodeId) {
        match id.kind() {
            NodeKind::Literal => {
                self.literal_pool.free(id.handle());
            }
            NodeKind::Number => {
                self.number_pool.free(id.handle());
            }
            NodeKind::String => {
                self.string_pool.free(id.handle());
            }
            NodeKind::Element => {
                self.element_pool.free(id.handle());
            }
            NodeKind::Object => {
                self.object_pool.free(id.handle());
            }
            NodeKind::Array => {
                self.array_pool.free(id.handle());
            }
        }
    }

    #[cfg(debug_assertions)]
    fn mark_tracked(&mut self, id: NodeId) {
        match id.kind() {
            NodeKind::Literal => self.literal_pool.set_tracked(),
            NodeKind::Number => self.number_pool.set_tracked(),
            NodeKind::String => self.string_pool.set_tracked(),
            NodeKind::Element => self.element_pool.set_tracked(),
            NodeKind::Object => self.object_pool.set_tracked(),
            NodeKind::Array => self.array_pool.set_tracked(),
        }
    }

    #[cfg(debug_assertions)]
    fn pools_balanced(&self) -> bool {
        self.literal_pool.stats().outstanding == self.literal_pool.untracked()
            && self.number_pool.stats().outstanding == self.number_pool.untracked()
            && self.string_pool.stats().outstanding == self.string_pool.untracked()
            && self.element_pool.stats().outstanding == self.element_pool.untracked()
            && self.object_pool.stats().outstanding == self.object_pool.untracked()
            && self.array_pool.stats().outstanding == self.array_pool.untracked()
    }

    // ---- pool diagnostics ----

    /// Allocation counters of the pool backing `kind`.
    pub fn pool_stats(&self, kind: NodeKind) -> PoolStats {
        match kind {
            NodeKind::Literal => self.literal_pool.stats(),
            NodeKind::Number => self.number_pool.stats(),
            NodeKind::String => self.string_pool.stats(),
            NodeKind::Element => self.element_pool.stats(),
            NodeKind::Object => self.object_pool.stats(),
            NodeKind::Array => self.array_pool.stats(),
        }
    }

    /// Emits one debug log line per pool with its counters.
    pub fn log_pool_stats(&self) {
        let pools = [
            ("literal", self.literal_pool.stats()),
            ("number", self.number_pool.stats()),
            ("string", self.string_pool.stats()),
            ("element", self.element_pool.stats()),
            ("object", self.object_pool.stats()),
            ("array", self.array_pool.stats()),
        ];
        for (name, stats) in pools {
            log::debug!(
                "pool {name}: watermark={} outstanding={} lifetime={} blocks={}",
                stats.high_water,
                stats.outstanding,
                stats.lifetime,
                stats.blocks
            );
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward iterator over a sibling chain.
#[derive(Debug)]
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.doc.next_sibling(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_numbers(count: usize) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let ids: Vec<_> = (0..count)
            .map(|value| {
                let id = doc.new_number();
                doc.set_number(id, value as f64);
                doc.insert_end_child(Parent::Document, id);
                id
            })
            .collect();
        (doc, ids)
    }

    #[rstest::rstest]
    fn insert_end_child_builds_an_ordered_chain() {
        let (doc, ids) = doc_with_numbers(3);
        assert_eq!(doc.first_root(), Some(ids[0]));
        assert_eq!(doc.last_root(), Some(ids[2]));
        assert_eq!(doc.next_sibling(ids[0]), Some(ids[1]));
        assert_eq!(doc.next_sibling(ids[1]), Some(ids[2]));
        assert_eq!(doc.next_sibling(ids[2]), None);
        assert_eq!(doc.prev_sibling(ids[2]), Some(ids[1]));
        assert_eq!(doc.prev_sibling(ids[0]), None);
        assert_eq!(doc.parent(ids[1]), Some(Parent::Document));
        let order: Vec<_> = doc.roots().collect();
        assert_eq!(order, ids);
    }

    #[rstest::rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn unlink_fixes_up_neighbors(#[case] victim: usize) {
        let (mut doc, ids) = doc_with_numbers(3);
        doc.unlink(Parent::Document, ids[victim]);
        assert_eq!(doc.parent(ids[victim]), None);
        let order: Vec<_> = doc.roots().collect();
        let expected: Vec<_> = ids
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != victim)
            .map(|(_, id)| *id)
            .collect();
        assert_eq!(order, expected);
        doc.delete_subtree(ids[victim]);
        doc.clear();
        assert_eq!(doc.pool_stats(NodeKind::Number).outstanding, 0);
    }

    #[rstest::rstest]
    fn delete_children_frees_into_the_pools() {
        let (mut doc, _ids) = doc_with_numbers(5);
        assert_eq!(doc.pool_stats(NodeKind::Number).outstanding, 5);
        doc.delete_children_of(Parent::Document);
        assert_eq!(doc.pool_stats(NodeKind::Number).outstanding, 0);
        assert_eq!(doc.first_root(), None);
        assert_eq!(doc.last_root(), None);
    }

    #[rstest::rstest]
    fn nested_delete_is_post_order_and_complete() {
        let mut doc = Document::new();
        let array = doc.new_array();
        doc.insert_end_child(Parent::Document, array);
        for value in 0..4 {
            let number = doc.new_number();
            doc.set_number(number, f64::from(value));
            doc.insert_end_child(Parent::Node(array), number);
        }
        assert_eq!(doc.pool_stats(NodeKind::Array).outstanding, 1);
        assert_eq!(doc.pool_stats(NodeKind::Number).outstanding, 4);
        doc.delete_children_of(Parent::Document);
        assert_eq!(doc.pool_stats(NodeKind::Array).outstanding, 0);
        assert_eq!(doc.pool_stats(NodeKind::Number).outstanding, 0);
    }

    #[rstest::rstest]
    fn typed_accessors_refuse_other_kinds() {
        let mut doc = Document::new();
        let number = doc.new_number();
        doc.set_number(number, 2.5);
        doc.insert_end_child(Parent::Document, number);
        assert_eq!(doc.number_value(number), Some(2.5));
        assert_eq!(doc.number_value_int(number), Some(2));
        assert_eq!(doc.literal_value(number), None);
        assert_eq!(doc.string_str(number), None);
    }

    #[rstest::rstest]
    #[should_panic(expected = "stale or foreign")]
    fn handles_go_stale_after_clear() {
        let (mut doc, ids) = doc_with_numbers(1);
        doc.clear();
        doc.number_value(ids[0]);
    }

    #[rstest::rstest]
    fn reuse_after_clear_keeps_block_count() {
        let (mut doc, _ids) = doc_with_numbers(4);
        let blocks = doc.pool_stats(NodeKind::Number).blocks;
        doc.clear();
        for value in 0..4 {
            let id = doc.new_number();
            doc.set_number(id, f64::from(value));
            doc.insert_end_child(Parent::Document, id);
        }
        assert_eq!(doc.pool_stats(NodeKind::Number).blocks, blocks);
        assert_eq!(doc.pool_stats(NodeKind::Number).outstanding, 4);
    }
}
