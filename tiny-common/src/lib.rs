//! Tiny Compiler - Common Types and Utilities
//!
//! This crate contains the AST handed over by the parser, the validation
//! boundary that runs before code generation, and the shared error type.

pub mod ast;
pub mod error;
pub mod types;
pub mod validate;

pub use ast::{BinaryExpr, BinaryOp, Node};
pub use error::CompilerError;
pub use types::*;
pub use validate::{validate, validate_with_depth, DEFAULT_MAX_DEPTH};
