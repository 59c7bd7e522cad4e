//! x86-64 ABI for Tiny programs
//!
//! This module fixes the register roles used by generated code and the
//! stack frame holding the 26 variable slots, including the optional
//! entry prologue/epilogue wrapped around a compiled program.

use crate::asm::{AsmInst, Reg};
use tiny_common::{VarSlot, FRAME_SIZE};

/// Register roles shared by every lowering in the generator
///
/// Register Usage:
/// - %rdi: accumulator, holds the value of the last compiled expression
///   and is the implicit argument of the print routine
/// - %rsi: scratch, receives the popped right operand of a binary op
/// - %rax: dividend and quotient of `idivq`
/// - %rbp: frame base, variables live at fixed negative offsets from it
/// - %rsp: stack pointer
pub struct CallingConvention;

impl CallingConvention {
    pub const ACCUMULATOR: Reg = Reg::Rdi;
    pub const SCRATCH: Reg = Reg::Rsi;
    pub const DIVIDEND: Reg = Reg::Rax;
    pub const FRAME_PTR: Reg = Reg::Rbp;
    pub const STACK_PTR: Reg = Reg::Rsp;

    /// External routine called by `Print`, argument in the accumulator
    pub const PRINT_ROUTINE: &'static str = "print_int";
}

/// Stack Frame Layout
///
/// ```text
///   %rbp - 0x08   A
///   %rbp - 0x10   B
///   ...
///   %rbp - 0xd0   Z
/// ```
///
/// 208 bytes keeps `%rsp` 16-byte aligned after the saved `%rbp`.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Symbol the prologue exports and labels
    pub entry_symbol: String,

    /// Size of the variable area in bytes
    pub locals_size: u32,
}

impl Frame {
    pub fn new(entry_symbol: impl Into<String>) -> Self {
        Self {
            entry_symbol: entry_symbol.into(),
            locals_size: FRAME_SIZE,
        }
    }

    /// Load a variable slot into `dst`
    pub fn load_slot(slot: VarSlot, dst: Reg) -> AsmInst {
        AsmInst::Load(slot.frame_offset(), CallingConvention::FRAME_PTR, dst)
    }

    /// Store `src` into a variable slot
    pub fn store_slot(src: Reg, slot: VarSlot) -> AsmInst {
        AsmInst::Store(src, slot.frame_offset(), CallingConvention::FRAME_PTR)
    }

    /// Generate the entry prologue
    ///
    /// The prologue:
    /// 1. Exports and labels the entry symbol
    /// 2. Saves the caller's frame pointer
    /// 3. Sets up the new frame pointer
    /// 4. Reserves the variable area
    pub fn gen_prologue(&self) -> Vec<AsmInst> {
        vec![
            AsmInst::Global(self.entry_symbol.clone()),
            AsmInst::Label(self.entry_symbol.clone()),
            AsmInst::Push(CallingConvention::FRAME_PTR),
            AsmInst::Mov(CallingConvention::STACK_PTR, CallingConvention::FRAME_PTR),
            AsmInst::SubImm(self.locals_size, CallingConvention::STACK_PTR),
        ]
    }

    /// Generate the epilogue: drop the frame, restore `%rbp`, return
    pub fn gen_epilogue(&self) -> Vec<AsmInst> {
        vec![
            AsmInst::Mov(CallingConvention::FRAME_PTR, CallingConvention::STACK_PTR),
            AsmInst::Pop(CallingConvention::FRAME_PTR),
            AsmInst::Ret,
        ]
    }
}
