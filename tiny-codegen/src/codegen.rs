//! AST to x86-64 lowering
//!
//! A single recursive pass over the tree. Every expression leaves its value
//! in the accumulator (`%rdi`); binary operators evaluate the right operand
//! first, park it on the machine stack, evaluate the left operand and pop the
//! right one into the scratch register before combining. Relational operators
//! only set flags and are consumed by the branch that follows them in
//! `If`/`While`.

use crate::abi::{CallingConvention, Frame};
use crate::asm::{AsmInst, Cond, Reg};
use crate::fold::{is_constant, power_of_two_shift, reduce};
use crate::labels::LabelAllocator;
use log::{debug, trace};
use thiserror::Error;
use tiny_common::{validate_with_depth, BinaryExpr, BinaryOp, CompilerError, Node, VarSlot};

const ACC: Reg = CallingConvention::ACCUMULATOR;
const SCRATCH: Reg = CallingConvention::SCRATCH;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error(transparent)]
    Compiler(#[from] CompilerError),

    #[error("Failed to write assembly: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for code generation
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Wrap the program in the entry prologue/epilogue
    pub emit_prologue: bool,
    /// Annotate folded and strength-reduced expressions
    pub emit_comments: bool,
    /// Symbol exported by the prologue
    pub entry_symbol: String,
    /// Deepest tree the recursive generator accepts
    pub max_depth: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            emit_prologue: true,
            emit_comments: false,
            entry_symbol: "basic_main".to_string(),
            max_depth: tiny_common::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Code generator for one compilation run
///
/// Owns the label counters of the run, so two generators never share ids
/// and one generator can be [`reset`](CodeGenerator::reset) between programs.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    options: CodegenOptions,
    labels: LabelAllocator,
    instructions: Vec<AsmInst>,
    depth: usize,
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            labels: LabelAllocator::new(),
            instructions: Vec::new(),
            depth: 0,
        }
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn labels(&self) -> &LabelAllocator {
        &self.labels
    }

    /// Instructions emitted so far, in traversal order
    pub fn instructions(&self) -> &[AsmInst] {
        &self.instructions
    }

    /// Drain the emitted instructions
    pub fn take_instructions(&mut self) -> Vec<AsmInst> {
        std::mem::take(&mut self.instructions)
    }

    /// Forget all emitted code and restart label numbering
    pub fn reset(&mut self) {
        self.instructions.clear();
        self.labels.reset();
        self.depth = 0;
    }

    /// Validate and lower a whole program, wrapped in the frame
    /// prologue/epilogue when `emit_prologue` is set
    pub fn generate_program(&mut self, program: &Node) -> Result<Vec<AsmInst>, CodegenError> {
        validate_with_depth(program, self.options.max_depth)?;

        let frame = Frame::new(self.options.entry_symbol.clone());
        if self.options.emit_prologue {
            self.instructions.extend(frame.gen_prologue());
        }

        self.compile_ast(program)?;

        if self.options.emit_prologue {
            self.instructions.extend(frame.gen_epilogue());
        }

        debug!(
            "generate_program complete: {} instructions, {} conditionals, {} loops",
            self.instructions.len(),
            self.labels.if_count(),
            self.labels.while_count()
        );
        Ok(self.take_instructions())
    }

    /// Lower one node, appending its instructions to the buffer
    pub fn compile_ast(&mut self, node: &Node) -> Result<(), CodegenError> {
        self.nested(|gen| gen.compile_node(node))
    }

    /// Lower a relational condition to a `cmp` and return the condition
    /// under which the compared values satisfy it
    pub fn compile_condition(&mut self, condition: &BinaryExpr) -> Result<Cond, CodegenError> {
        self.nested(|gen| {
            let cond = match condition.op {
                BinaryOp::Equal => Cond::Equal,
                BinaryOp::Less => Cond::Less,
                BinaryOp::Greater => Cond::Greater,
                op @ (BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div) => {
                    return Err(CompilerError::ArithmeticCondition { op }.into());
                }
            };
            gen.compile_operands(condition)?;
            gen.emit(AsmInst::Cmp(SCRATCH, ACC));
            Ok(cond)
        })
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CodegenError>,
    ) -> Result<T, CodegenError> {
        self.depth += 1;
        let result = if self.depth > self.options.max_depth {
            Err(CompilerError::NestingTooDeep {
                depth: self.depth,
                limit: self.options.max_depth,
            }
            .into())
        } else {
            f(self)
        };
        self.depth -= 1;
        result
    }

    fn emit(&mut self, inst: AsmInst) {
        trace!("  emit {inst}");
        self.instructions.push(inst);
    }

    fn comment(&mut self, text: impl FnOnce() -> String) {
        if self.options.emit_comments {
            self.instructions.push(AsmInst::Comment(text()));
        }
    }

    fn compile_node(&mut self, node: &Node) -> Result<(), CodegenError> {
        match node {
            Node::Num { value } => {
                self.emit(AsmInst::MovImm(*value, ACC));
            }
            Node::Print { expr } => {
                self.compile_ast(expr)?;
                self.emit(AsmInst::Call(CallingConvention::PRINT_ROUTINE.to_string()));
            }
            Node::Sequence { statements } => {
                for stmt in statements {
                    self.compile_ast(stmt)?;
                }
            }
            Node::Var { name } => {
                let slot = VarSlot::new(*name)?;
                self.emit(Frame::load_slot(slot, ACC));
            }
            Node::Let { var, value } => {
                let slot = VarSlot::new(*var)?;
                self.compile_ast(value)?;
                self.emit(Frame::store_slot(ACC, slot));
            }
            Node::BinaryOp(expr) => self.compile_binary(node, expr)?,
            Node::If {
                condition,
                if_branch,
                else_branch,
            } => self.compile_if(condition, if_branch, else_branch.as_deref())?,
            Node::While { condition, body } => self.compile_while(condition, body)?,
        }
        Ok(())
    }

    fn compile_binary(&mut self, node: &Node, expr: &BinaryExpr) -> Result<(), CodegenError> {
        if expr.op.is_relational() {
            return Err(CompilerError::RelationalAsValue { op: expr.op }.into());
        }

        if is_constant(node) {
            if let Some(value) = reduce(node) {
                debug!("folded constant expression to {value}");
                self.comment(|| format!("constant folded to {value}"));
                self.emit(AsmInst::MovImm(value, ACC));
                return Ok(());
            }
        }

        // Multiplying by 1 has shift 0 and keeps the general path.
        if expr.op == BinaryOp::Mul && is_constant(&expr.right) {
            let shift = reduce(&expr.right)
                .and_then(power_of_two_shift)
                .filter(|&k| k != 0);
            if let Some(k) = shift {
                debug!("strength-reduced multiply to shift by {k}");
                self.compile_ast(&expr.left)?;
                self.comment(|| format!("multiply by {} as shift", 1i64 << k));
                self.emit(AsmInst::Shl(k, ACC));
                return Ok(());
            }
        }

        self.compile_operands(expr)?;
        match expr.op {
            BinaryOp::Add => self.emit(AsmInst::Add(SCRATCH, ACC)),
            BinaryOp::Sub => self.emit(AsmInst::Sub(SCRATCH, ACC)),
            BinaryOp::Mul => self.emit(AsmInst::Imul(SCRATCH, ACC)),
            BinaryOp::Div => {
                let dividend = CallingConvention::DIVIDEND;
                self.emit(AsmInst::Mov(ACC, dividend));
                self.emit(AsmInst::Cqto);
                self.emit(AsmInst::Idiv(SCRATCH));
                self.emit(AsmInst::Mov(dividend, ACC));
            }
            op @ (BinaryOp::Equal | BinaryOp::Less | BinaryOp::Greater) => {
                return Err(CompilerError::RelationalAsValue { op }.into());
            }
        }
        Ok(())
    }

    /// Right operand ends up in the scratch register, left in the accumulator
    fn compile_operands(&mut self, expr: &BinaryExpr) -> Result<(), CodegenError> {
        self.compile_ast(&expr.right)?;
        self.emit(AsmInst::Push(ACC));
        self.compile_ast(&expr.left)?;
        self.emit(AsmInst::Pop(SCRATCH));
        Ok(())
    }

    fn compile_if(
        &mut self,
        condition: &BinaryExpr,
        if_branch: &Node,
        else_branch: Option<&Node>,
    ) -> Result<(), CodegenError> {
        let (id, labels) = self.labels.next_if();
        debug!("compile_if: id={id}, has_else={}", else_branch.is_some());

        let cond = self.compile_condition(condition)?;
        self.emit(AsmInst::Jcc(cond, labels.start.clone()));

        // The else branch is the fallthrough path.
        if let Some(else_branch) = else_branch {
            self.compile_ast(else_branch)?;
        }
        self.emit(AsmInst::Jmp(labels.end.clone()));

        self.emit(AsmInst::Label(labels.start));
        self.compile_ast(if_branch)?;
        self.emit(AsmInst::Label(labels.end));
        Ok(())
    }

    fn compile_while(&mut self, condition: &BinaryExpr, body: &Node) -> Result<(), CodegenError> {
        let (id, labels) = self.labels.next_while();
        debug!("compile_while: id={id}");

        self.emit(AsmInst::Label(labels.start.clone()));
        let cond = self.compile_condition(condition)?;
        self.emit(AsmInst::Jcc(cond.negate(), labels.end.clone()));

        self.compile_ast(body)?;
        self.emit(AsmInst::Jmp(labels.start));
        self.emit(AsmInst::Label(labels.end));
        Ok(())
    }
}
