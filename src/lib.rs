pub mod constants;
pub mod dom;
pub mod error;
pub mod options;
pub mod pool;
pub mod print;
pub mod visit;

mod parse;
mod text;

pub use crate::dom::{Children, Document, Literal, NodeId, NodeKind, Parent, Span};
pub use crate::error::{ErrorCode, Location, ParseError};
pub use crate::options::{Indent, PrintOptions};
pub use crate::pool::PoolStats;
pub use crate::print::Printer;
pub use crate::visit::Visitor;

pub type Result<T> = std::result::Result<T, ParseError>;

pub fn from_str(input: &str) -> Result<Document> {
    let mut doc = Document::new();
    doc.parse(input)?;
    Ok(doc)
}

pub fn from_slice(input: &[u8]) -> Result<Document> {
    let mut doc = Document::new();
    doc.parse_bytes(input)?;
    Ok(doc)
}

pub fn to_string(doc: &Document) -> String {
    to_string_with_options(doc, &PrintOptions::default())
}

pub fn to_string_with_options(doc: &Document, options: &PrintOptions) -> String {
    let mut printer = Printer::with_options(options);
    doc.accept(&mut printer);
    printer.into_string()
}
