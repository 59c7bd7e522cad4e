//! x86-64 Assembly Instruction Definitions
//!
//! This module defines the subset of the x86-64 instruction set the Tiny
//! backend emits, rendered in AT&T syntax (`src, dst` operand order).

use std::fmt;

/// Registers used by generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    Rdi, // Accumulator
    Rsi, // Scratch (popped right operand)
    Rax, // Dividend / quotient
    Rbp, // Frame base
    Rsp, // Stack pointer
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::Rdi => write!(f, "%rdi"),
            Reg::Rsi => write!(f, "%rsi"),
            Reg::Rax => write!(f, "%rax"),
            Reg::Rbp => write!(f, "%rbp"),
            Reg::Rsp => write!(f, "%rsp"),
        }
    }
}

/// Branch conditions, read against the flags set by the last `cmp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    Equal,
    Less,
    Greater,
    NotEqual,
    NotLess,
    NotGreater,
}

impl Cond {
    pub fn negate(self) -> Cond {
        match self {
            Cond::Equal => Cond::NotEqual,
            Cond::Less => Cond::NotLess,
            Cond::Greater => Cond::NotGreater,
            Cond::NotEqual => Cond::Equal,
            Cond::NotLess => Cond::Less,
            Cond::NotGreater => Cond::Greater,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Cond::Equal => "je",
            Cond::Less => "jl",
            Cond::Greater => "jg",
            Cond::NotEqual => "jne",
            Cond::NotLess => "jnl",
            Cond::NotGreater => "jng",
        }
    }
}

/// x86-64 Assembly Instructions
///
/// Operands follow AT&T order: the first register is the source, the last
/// one the destination. Frame offsets are distances below the base register.
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    // Data movement
    MovImm(i64, Reg),             // dst = imm
    Mov(Reg, Reg),                // dst = src
    Load(u32, Reg, Reg),          // dst = memory[base - offset]
    Store(Reg, u32, Reg),         // memory[base - offset] = src
    Push(Reg),                    // Push register to stack
    Pop(Reg),                     // Pop from stack to register

    // Arithmetic
    Add(Reg, Reg),                // dst = dst + src
    Sub(Reg, Reg),                // dst = dst - src
    Imul(Reg, Reg),               // dst = dst * src
    SubImm(u32, Reg),             // dst = dst - imm
    Shl(u32, Reg),                // dst = dst << imm
    Cqto,                         // Sign-extend %rax into %rdx:%rax
    Idiv(Reg),                    // %rax = %rdx:%rax / src

    // Comparison and control flow
    Cmp(Reg, Reg),                // flags = dst - src
    Jmp(String),                  // Unconditional jump
    Jcc(Cond, String),            // Conditional jump
    Call(String),                 // Call function by symbol
    Ret,                          // Return from function

    // Assembly pseudo-instructions
    Global(String),               // Export a symbol
    Label(String),                // Label for jumps/calls
    Comment(String),              // Assembly comment
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Data movement
            AsmInst::MovImm(imm, dst) => write!(f, "movq ${}, {}", imm, dst),
            AsmInst::Mov(src, dst) => write!(f, "movq {}, {}", src, dst),
            AsmInst::Load(offset, base, dst) => write!(f, "movq -{:#x}({}), {}", offset, base, dst),
            AsmInst::Store(src, offset, base) => write!(f, "movq {}, -{:#x}({})", src, offset, base),
            AsmInst::Push(rs) => write!(f, "pushq {}", rs),
            AsmInst::Pop(rd) => write!(f, "popq {}", rd),

            // Arithmetic
            AsmInst::Add(src, dst) => write!(f, "addq {}, {}", src, dst),
            AsmInst::Sub(src, dst) => write!(f, "subq {}, {}", src, dst),
            AsmInst::Imul(src, dst) => write!(f, "imulq {}, {}", src, dst),
            AsmInst::SubImm(imm, dst) => write!(f, "subq ${:#x}, {}", imm, dst),
            AsmInst::Shl(amount, dst) => write!(f, "shl ${}, {}", amount, dst),
            AsmInst::Cqto => write!(f, "cqto"),
            AsmInst::Idiv(src) => write!(f, "idivq {}", src),

            // Control flow
            AsmInst::Cmp(src, dst) => write!(f, "cmp {}, {}", src, dst),
            AsmInst::Jmp(label) => write!(f, "jmp {}", label),
            AsmInst::Jcc(cond, label) => write!(f, "{} {}", cond.mnemonic(), label),
            AsmInst::Call(symbol) => write!(f, "call {}", symbol),
            AsmInst::Ret => write!(f, "ret"),

            // Pseudo
            AsmInst::Global(symbol) => write!(f, ".globl {}", symbol),
            AsmInst::Label(label) => write!(f, "{}:", label),
            AsmInst::Comment(text) => write!(f, "# {}", text),
        }
    }
}
