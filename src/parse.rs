use memchr::memchr2;

use crate::constants::MAX_DEPTH;
use crate::dom::{Document, Literal, NodeId, NodeKind, Parent, Span};
use crate::error::{ErrorCode, ParseError};
use crate::text::{byte_at, skip_whitespace};

/// Outcome of one dispatch step: end of input, a byte no grammar starts
/// with, or a freshly allocated node plus the cursor its grammar starts
/// at (`"`, `{` and `[` are consumed by dispatch).
enum Identified {
    End(usize),
    Unknown(usize),
    Node(NodeId, usize),
}

pub(crate) struct Parser<'doc> {
    doc: &'doc mut Document,
}

impl<'doc> Parser<'doc> {
    pub(crate) fn new(doc: &'doc mut Document) -> Self {
        Self { doc }
    }

    /// Top-level loop: any whitespace-separated sequence of values is
    /// accepted as the document. Each parsed value becomes a root child;
    /// the first failure frees the node being built and stops the run.
    pub(crate) fn parse_document(&mut self, start: usize) -> Result<(), ParseError> {
        let mut pos = start;
        loop {
            match self.identify(pos) {
                Identified::End(_) => return Ok(()),
                Identified::Unknown(at) => return Err(ParseError::new(ErrorCode::Parsing, at)),
                Identified::Node(node, next) => match self.parse_deep(node, next, 0) {
                    Ok(after) => {
                        self.doc.insert_end_child(Parent::Document, node);
                        pos = after;
                    }
                    Err(error) => {
                        self.doc.discard_unlinked(node);
                        return Err(error);
                    }
                },
            }
        }
    }

    fn identify(&mut self, pos: usize) -> Identified {
        let pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        let byte = match byte_at(self.doc.buffer().as_bytes(), pos) {
            Some(byte) => byte,
            None => return Identified::End(pos),
        };
        match byte {
            b'n' | b't' | b'f' => Identified::Node(self.doc.new_literal(), pos),
            b'"' => Identified::Node(self.doc.new_string(), pos + 1),
            b'{' => Identified::Node(self.doc.new_object(), pos + 1),
            b'[' => Identified::Node(self.doc.new_array(), pos + 1),
            b'-' | b'0'..=b'9' => Identified::Node(self.doc.new_number(), pos),
            _ => Identified::Unknown(pos),
        }
    }

    fn parse_deep(&mut self, node: NodeId, pos: usize, depth: usize) -> Result<usize, ParseError> {
        match node.kind() {
            NodeKind::Literal => self.parse_literal(node, pos),
            NodeKind::Number => self.parse_number(node, pos),
            NodeKind::String => self.parse_string(node, pos),
            NodeKind::Element => self.parse_element(node, pos, depth),
            NodeKind::Object => self.parse_object(node, pos, depth),
            NodeKind::Array => self.parse_array(node, pos, depth),
        }
    }

    /// Identifies and parses exactly one value, attaching it to `parent`
    /// on success. `missing` is the code reported when no value starts
    /// here (end of input or an unclassifiable byte).
    fn parse_value_into(
        &mut self,
        parent: NodeId,
        pos: usize,
        depth: usize,
        missing: ErrorCode,
    ) -> Result<usize, ParseError> {
        match self.identify(pos) {
            Identified::End(at) | Identified::Unknown(at) => Err(ParseError::new(missing, at)),
            Identified::Node(node, next) => match self.parse_deep(node, next, depth + 1) {
                Ok(after) => {
                    self.doc.insert_end_child(Parent::Node(parent), node);
                    Ok(after)
                }
                Err(error) => {
                    self.doc.discard_unlinked(node);
                    Err(error)
                }
            },
        }
    }

    fn parse_literal(&mut self, node: NodeId, pos: usize) -> Result<usize, ParseError> {
        let rest = &self.doc.buffer()[pos..];
        let (value, len) = if rest.starts_with("null") {
            (Literal::Null, 4)
        } else if rest.starts_with("true") {
            (Literal::True, 4)
        } else if rest.starts_with("false") {
            (Literal::False, 5)
        } else {
            return Err(ParseError::new(ErrorCode::ParsingReservedLiteral, pos));
        };
        self.doc.set_literal(node, value);
        Ok(pos + len)
    }

    fn parse_number(&mut self, node: NodeId, pos: usize) -> Result<usize, ParseError> {
        let bytes = self.doc.buffer().as_bytes();
        let mut end = pos;
        while end < bytes.len()
            && matches!(bytes[end], b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E')
        {
            end += 1;
        }
        let value: f64 = match self.doc.buffer()[pos..end].parse() {
            Ok(value) => value,
            Err(_) => return Err(ParseError::new(ErrorCode::ParsingNumber, pos)),
        };
        self.doc.set_number(node, value);
        Ok(end)
    }

    fn parse_string(&mut self, node: NodeId, pos: usize) -> Result<usize, ParseError> {
        let bytes = self.doc.buffer().as_bytes();
        let len = bytes.len();
        let mut cursor = pos;
        let close = loop {
            match memchr2(b'"', b'\\', &bytes[cursor..]) {
                None => return Err(ParseError::new(ErrorCode::ParsingString, len)),
                Some(offset) => {
                    let at = cursor + offset;
                    if bytes[at] == b'"' {
                        break at;
                    }
                    // A backslash escapes exactly the next byte, whatever
                    // it is; the pair is kept verbatim in the span.
                    cursor = at + 2;
                    if cursor > len {
                        return Err(ParseError::new(ErrorCode::ParsingString, len));
                    }
                }
            }
        };
        // Quote and backslash bytes never occur inside a UTF-8 sequence,
        // so both span edges are char boundaries.
        self.doc.set_string_span(node, Span { start: pos, end: close });
        Ok(close + 1)
    }

    /// One `"key" : value` member. The key must be the next significant
    /// byte's string; exactly one value child follows the colon.
    fn parse_element(&mut self, node: NodeId, pos: usize, depth: usize) -> Result<usize, ParseError> {
        check_depth(depth, pos)?;
        let pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        if byte_at(self.doc.buffer().as_bytes(), pos) != Some(b'"') {
            return Err(ParseError::new(ErrorCode::ParsingElement, pos));
        }
        let pos = self.parse_value_into(node, pos, depth, ErrorCode::ParsingElement)?;
        let pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        if byte_at(self.doc.buffer().as_bytes(), pos) != Some(b':') {
            return Err(ParseError::new(ErrorCode::ParsingElement, pos));
        }
        self.parse_value_into(node, pos + 1, depth, ErrorCode::ParsingElement)
    }

    fn parse_object(&mut self, node: NodeId, pos: usize, depth: usize) -> Result<usize, ParseError> {
        check_depth(depth, pos)?;
        let mut pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        match byte_at(self.doc.buffer().as_bytes(), pos) {
            None => return Err(ParseError::new(ErrorCode::ObjectMismatch, pos)),
            Some(b'}') => return Ok(pos + 1),
            Some(_) => {}
        }
        pos = self.parse_member(node, pos, depth)?;
        pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        while byte_at(self.doc.buffer().as_bytes(), pos) == Some(b',') {
            pos = self.parse_member(node, pos + 1, depth)?;
            pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        }
        match byte_at(self.doc.buffer().as_bytes(), pos) {
            Some(b'}') => Ok(pos + 1),
            _ => Err(ParseError::new(ErrorCode::ObjectMismatch, pos)),
        }
    }

    fn parse_member(&mut self, object: NodeId, pos: usize, depth: usize) -> Result<usize, ParseError> {
        let element = self.doc.new_element();
        match self.parse_element(element, pos, depth + 1) {
            Ok(after) => {
                self.doc.insert_end_child(Parent::Node(object), element);
                Ok(after)
            }
            Err(error) => {
                self.doc.discard_unlinked(element);
                Err(error)
            }
        }
    }

    fn parse_array(&mut self, node: NodeId, pos: usize, depth: usize) -> Result<usize, ParseError> {
        check_depth(depth, pos)?;
        let mut pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        match byte_at(self.doc.buffer().as_bytes(), pos) {
            None => return Err(ParseError::new(ErrorCode::ArrayMismatch, pos)),
            Some(b']') => return Ok(pos + 1),
            Some(_) => {}
        }
        pos = self.parse_value_into(node, pos, depth, ErrorCode::ArrayMismatch)?;
        pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        while byte_at(self.doc.buffer().as_bytes(), pos) == Some(b',') {
            pos = self.parse_value_into(node, pos + 1, depth, ErrorCode::ArrayMismatch)?;
            pos = skip_whitespace(self.doc.buffer().as_bytes(), pos);
        }
        match byte_at(self.doc.buffer().as_bytes(), pos) {
            Some(b']') => Ok(pos + 1),
            _ => Err(ParseError::new(ErrorCode::ArrayMismatch, pos)),
        }
    }
}

fn check_depth(depth: usize, at: usize) -> Result<(), ParseError> {
    if depth > MAX_DEPTH {
        return Err(ParseError::new(ErrorCode::Parsing, at));
    }
    Ok(())
}
