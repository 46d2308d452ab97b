/// Spaces per nesting level in printed output.
pub const DEFAULT_INDENT: usize = 4;

/// Maximum container nesting accepted by the parser. Inputs deeper than
/// this fail with a generic parse error instead of exhausting the stack.
pub const MAX_DEPTH: usize = 256;

/// Target byte size of one pool block. The per-kind slot count is derived
/// from this, so every pool grows in roughly 1 KiB steps.
pub(crate) const POOL_BLOCK_BYTES: usize = 1024;
