//! Label allocation for structured control flow
//!
//! Each compilation run owns one [`LabelAllocator`]. Conditionals and loops
//! draw ids from separate counters that only ever increase, so every label
//! emitted in a run is unique no matter how the constructs nest.

use tiny_common::LabelId;

const IF_PREFIX: &str = "IF_";
const WHILE_PREFIX: &str = "WHILE_";

/// Label names for one conditional or loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPair {
    /// `IF_LBB{n}` (then branch) or `WHILE_LBB{n}` (loop head)
    pub start: String,
    /// `IF_END_LBB{n}` or `WHILE_END_LBB{n}`
    pub end: String,
}

impl LabelPair {
    fn new(prefix: &str, id: LabelId) -> Self {
        Self {
            start: format!("{prefix}LBB{id}"),
            end: format!("{prefix}END_LBB{id}"),
        }
    }
}

/// Per-run label counters
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next_if_id: LabelId,
    next_while_id: LabelId,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next conditional id and its labels
    pub fn next_if(&mut self) -> (LabelId, LabelPair) {
        let id = self.next_if_id;
        self.next_if_id += 1;
        (id, Self::if_labels(id))
    }

    /// Allocate the next loop id and its labels
    pub fn next_while(&mut self) -> (LabelId, LabelPair) {
        let id = self.next_while_id;
        self.next_while_id += 1;
        (id, Self::while_labels(id))
    }

    pub fn if_labels(id: LabelId) -> LabelPair {
        LabelPair::new(IF_PREFIX, id)
    }

    pub fn while_labels(id: LabelId) -> LabelPair {
        LabelPair::new(WHILE_PREFIX, id)
    }

    /// Number of conditionals allocated so far
    pub fn if_count(&self) -> LabelId {
        self.next_if_id
    }

    /// Number of loops allocated so far
    pub fn while_count(&self) -> LabelId {
        self.next_while_id
    }

    /// Start a fresh run
    pub fn reset(&mut self) {
        self.next_if_id = 0;
        self.next_while_id = 0;
    }
}
