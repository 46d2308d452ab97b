use crate::constants::DEFAULT_INDENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
}

impl Indent {
    pub fn spaces(count: usize) -> Self {
        Indent::Spaces(count)
    }

    pub(crate) fn unit(self) -> String {
        match self {
            Indent::Spaces(count) => " ".repeat(count),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(DEFAULT_INDENT)
    }
}

/// Knobs for [`Printer`](crate::print::Printer) output.
///
/// # Examples
///
/// ```
/// use jsondom::{Indent, PrintOptions};
///
/// let options = PrintOptions::new().with_indent(Indent::spaces(2));
/// assert_eq!(options.indent, Indent::Spaces(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrintOptions {
    pub indent: Indent,
}

impl PrintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }
}
