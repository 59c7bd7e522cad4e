//! Compile-time evaluation helpers
//!
//! Constancy classification, constant folding and power-of-two detection
//! for multiply strength reduction. All three are pure.

use tiny_common::{BinaryOp, Node};

/// Whether a subtree's value is fully known at compile time
///
/// Literals are constant; an arithmetic binary expression is constant when
/// both operands are. Relational expressions never are, even over literals.
pub fn is_constant(node: &Node) -> bool {
    match node {
        Node::Num { .. } => true,
        Node::BinaryOp(expr) => {
            !expr.op.is_relational() && is_constant(&expr.left) && is_constant(&expr.right)
        }
        _ => false,
    }
}

/// Evaluate a constant subtree with 64-bit two's complement arithmetic
///
/// Division truncates toward zero. Returns `None` when the tree is not
/// constant, or when evaluating it would divide by zero or overflow a
/// division (`i64::MIN / -1`); such trees are left for the runtime path.
pub fn reduce(node: &Node) -> Option<i64> {
    match node {
        Node::Num { value } => Some(*value),
        Node::BinaryOp(expr) => {
            let left = reduce(&expr.left)?;
            let right = reduce(&expr.right)?;
            match expr.op {
                BinaryOp::Add => Some(left.wrapping_add(right)),
                BinaryOp::Sub => Some(left.wrapping_sub(right)),
                BinaryOp::Mul => Some(left.wrapping_mul(right)),
                BinaryOp::Div => left.checked_div(right),
                BinaryOp::Equal | BinaryOp::Less | BinaryOp::Greater => None,
            }
        }
        _ => None,
    }
}

/// Shift amount `k` with `value == 2^k`, or `None` for zero, negative and
/// non-power-of-two values. `1` yields `Some(0)`.
pub fn power_of_two_shift(value: i64) -> Option<u32> {
    if value > 0 && value & (value - 1) == 0 {
        Some(value.trailing_zeros())
    } else {
        None
    }
}
