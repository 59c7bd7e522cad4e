//! Tiny Compiler - Code Generation Backend
//!
//! This crate handles the final phase of compilation: lowering a validated
//! Tiny AST straight to x86-64 assembly text. It includes:
//!
//! - Assembly instruction model
//! - ABI (register roles, variable frame, entry prologue/epilogue)
//! - Constant folding and multiply strength reduction
//! - Per-run label allocation
//! - The recursive code generator

pub mod abi;
pub mod asm;
pub mod codegen;
pub mod emit;
pub mod fold;
pub mod labels;

pub use abi::{CallingConvention, Frame};
pub use asm::{AsmInst, Cond, Reg};
pub use codegen::{CodeGenerator, CodegenError, CodegenOptions};
pub use emit::{emit_instructions, write_instructions};
pub use fold::{is_constant, power_of_two_shift, reduce};
pub use labels::{LabelAllocator, LabelPair};

use std::io::Write;
use tiny_common::Node;

/// Main entry point for code generation
pub fn compile_to_string(program: &Node, options: CodegenOptions) -> Result<String, CodegenError> {
    let mut gen = CodeGenerator::new(options);
    let instructions = gen.generate_program(program)?;
    Ok(emit_instructions(&instructions))
}

/// Compile a program and write the assembly to `out`
pub fn compile_to_writer<W: Write>(
    program: &Node,
    options: CodegenOptions,
    out: &mut W,
) -> Result<(), CodegenError> {
    let mut gen = CodeGenerator::new(options);
    let instructions = gen.generate_program(program)?;
    write_instructions(&instructions, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_common::BinaryOp;

    #[test]
    fn test_basic_code_generation() {
        let program = Node::print(Node::binary(BinaryOp::Add, Node::num(40), Node::num(2)));

        let result = compile_to_string(&program, CodegenOptions::default());
        assert!(result.is_ok());

        let asm = result.unwrap();
        assert!(asm.contains("basic_main:"));
        assert!(asm.contains("movq $42, %rdi"));
        assert!(asm.contains("call print_int"));
        assert!(asm.ends_with("ret\n"));
    }

    #[test]
    fn test_fragment_mode() {
        let options = CodegenOptions {
            emit_prologue: false,
            ..CodegenOptions::default()
        };
        let asm = compile_to_string(&Node::print(Node::num(1)), options).unwrap();
        assert_eq!(asm, "movq $1, %rdi\ncall print_int\n");
    }

    #[test]
    fn test_compile_to_writer() {
        let mut out = Vec::new();
        compile_to_writer(&Node::let_('A', Node::num(1)), CodegenOptions::default(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("movq %rdi, -0x8(%rbp)"));
    }
}
