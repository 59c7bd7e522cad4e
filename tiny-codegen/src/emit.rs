//! Assembly text emission
//!
//! Renders instructions one per line, in the order they were generated.

use crate::asm::AsmInst;
use std::io::{self, Write};

/// Render instructions as assembly source text
pub fn emit_instructions(instructions: &[AsmInst]) -> String {
    let mut out = String::new();
    for inst in instructions {
        out.push_str(&inst.to_string());
        out.push('\n');
    }
    out
}

/// Write instructions to a caller-supplied sink
pub fn write_instructions<W: Write>(instructions: &[AsmInst], out: &mut W) -> io::Result<()> {
    for inst in instructions {
        writeln!(out, "{inst}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::Reg;

    fn sample() -> Vec<AsmInst> {
        vec![
            AsmInst::Label("WHILE_LBB0".to_string()),
            AsmInst::MovImm(3, Reg::Rdi),
            AsmInst::Call("print_int".to_string()),
        ]
    }

    #[test]
    fn test_emit_one_line_per_instruction() {
        assert_eq!(
            emit_instructions(&sample()),
            "WHILE_LBB0:\nmovq $3, %rdi\ncall print_int\n"
        );
        assert_eq!(emit_instructions(&[]), "");
    }

    #[test]
    fn test_writer_matches_string_output() {
        let mut buf = Vec::new();
        write_instructions(&sample(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), emit_instructions(&sample()));
    }
}
