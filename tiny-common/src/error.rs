//! Error handling for the Tiny compiler
//!
//! This module defines the error type shared by the AST reader, the
//! validation boundary and the code generator. Nothing here is recovered
//! from: an error stops the compilation run before any partial assembly is used.

use crate::ast::BinaryOp;
use thiserror::Error;

/// Main compiler error type that encompasses every rejected input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Invalid variable '{name}': variables are single letters A-Z")]
    InvalidVariable { name: char },

    #[error("Relational operator '{op}' used as a value; it may only appear as an if/while condition")]
    RelationalAsValue { op: BinaryOp },

    #[error("Condition uses arithmetic operator '{op}'; expected one of '=', '<', '>'")]
    ArithmeticCondition { op: BinaryOp },

    #[error("AST nesting depth {depth} exceeds the limit of {limit}")]
    NestingTooDeep { depth: usize, limit: usize },

    #[error("Malformed AST: {message}")]
    Serialization { message: String },
}

impl CompilerError {
    /// Create an error for an AST that could not be read
    pub fn serialization(message: impl Into<String>) -> Self {
        CompilerError::Serialization {
            message: message.into(),
        }
    }
}
