//! Structural validation run before code generation
//!
//! The code generator assumes a well-formed tree. This pass rejects the
//! shapes it cannot lower: bad variable names, relational operators in value
//! position, arithmetic conditions and trees too deep for the recursive
//! generator. The first problem found (depth-first, left to right) is reported.

use crate::ast::{BinaryExpr, Node};
use crate::error::CompilerError;
use crate::types::VarSlot;

/// Default nesting limit accepted by [`validate`]
///
/// Trees at this depth fit the recursive passes on a 2 MiB thread stack in
/// unoptimized builds. Raising it requires running the passes on a larger stack.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Validate a tree with the default nesting limit
pub fn validate(node: &Node) -> Result<(), CompilerError> {
    validate_with_depth(node, DEFAULT_MAX_DEPTH)
}

/// Validate a tree, rejecting anything nested deeper than `max_depth`
pub fn validate_with_depth(node: &Node, max_depth: usize) -> Result<(), CompilerError> {
    check_node(node, 1, max_depth)
}

fn check_node(node: &Node, depth: usize, limit: usize) -> Result<(), CompilerError> {
    if depth > limit {
        return Err(CompilerError::NestingTooDeep { depth, limit });
    }

    match node {
        Node::Num { .. } => Ok(()),
        Node::Var { name } => VarSlot::new(*name).map(|_| ()),
        Node::Let { var, value } => {
            VarSlot::new(*var)?;
            check_node(value, depth + 1, limit)
        }
        Node::Print { expr } => check_node(expr, depth + 1, limit),
        Node::Sequence { statements } => statements
            .iter()
            .try_for_each(|stmt| check_node(stmt, depth + 1, limit)),
        Node::BinaryOp(expr) => {
            if expr.op.is_relational() {
                return Err(CompilerError::RelationalAsValue { op: expr.op });
            }
            check_operands(expr, depth, limit)
        }
        Node::If {
            condition,
            if_branch,
            else_branch,
        } => {
            check_condition(condition, depth + 1, limit)?;
            check_node(if_branch, depth + 1, limit)?;
            if let Some(else_branch) = else_branch {
                check_node(else_branch, depth + 1, limit)?;
            }
            Ok(())
        }
        Node::While { condition, body } => {
            check_condition(condition, depth + 1, limit)?;
            check_node(body, depth + 1, limit)
        }
    }
}

fn check_condition(cond: &BinaryExpr, depth: usize, limit: usize) -> Result<(), CompilerError> {
    if depth > limit {
        return Err(CompilerError::NestingTooDeep { depth, limit });
    }
    if !cond.op.is_relational() {
        return Err(CompilerError::ArithmeticCondition { op: cond.op });
    }
    check_operands(cond, depth, limit)
}

fn check_operands(expr: &BinaryExpr, depth: usize, limit: usize) -> Result<(), CompilerError> {
    check_node(&expr.left, depth + 1, limit)?;
    check_node(&expr.right, depth + 1, limit)
}
