//! Whole-program tests: JSON AST in, assembly listing out

use indoc::indoc;
use pretty_assertions::assert_eq;
use tiny_codegen::{compile_to_string, CodegenError, CodegenOptions};
use tiny_common::{CompilerError, Node};

fn parse(json: &str) -> Node {
    serde_json::from_str(json).expect("valid AST json")
}

fn fragment_options() -> CodegenOptions {
    CodegenOptions {
        emit_prologue: false,
        ..CodegenOptions::default()
    }
}

#[test]
fn test_factorial_program() {
    // A = 5; F = 1; while (A > 0) { F = F * A; A = A - 1 }; print F
    let program = parse(indoc! {r#"
        {
          "type": "Sequence",
          "statements": [
            { "type": "Let", "var": "A", "value": { "type": "Num", "value": 5 } },
            { "type": "Let", "var": "F", "value": { "type": "Num", "value": 1 } },
            {
              "type": "While",
              "condition": {
                "op": ">",
                "left": { "type": "Var", "name": "A" },
                "right": { "type": "Num", "value": 0 }
              },
              "body": {
                "type": "Sequence",
                "statements": [
                  {
                    "type": "Let", "var": "F",
                    "value": {
                      "type": "BinaryOp", "op": "*",
                      "left": { "type": "Var", "name": "F" },
                      "right": { "type": "Var", "name": "A" }
                    }
                  },
                  {
                    "type": "Let", "var": "A",
                    "value": {
                      "type": "BinaryOp", "op": "-",
                      "left": { "type": "Var", "name": "A" },
                      "right": { "type": "Num", "value": 1 }
                    }
                  }
                ]
              }
            },
            { "type": "Print", "expr": { "type": "Var", "name": "F" } }
          ]
        }
    "#});

    let asm = compile_to_string(&program, fragment_options()).unwrap();
    assert_eq!(
        asm,
        indoc! {"
            movq $5, %rdi
            movq %rdi, -0x8(%rbp)
            movq $1, %rdi
            movq %rdi, -0x30(%rbp)
            WHILE_LBB0:
            movq $0, %rdi
            pushq %rdi
            movq -0x8(%rbp), %rdi
            popq %rsi
            cmp %rsi, %rdi
            jng WHILE_END_LBB0
            movq -0x8(%rbp), %rdi
            pushq %rdi
            movq -0x30(%rbp), %rdi
            popq %rsi
            imulq %rsi, %rdi
            movq %rdi, -0x30(%rbp)
            movq $1, %rdi
            pushq %rdi
            movq -0x8(%rbp), %rdi
            popq %rsi
            subq %rsi, %rdi
            movq %rdi, -0x8(%rbp)
            jmp WHILE_LBB0
            WHILE_END_LBB0:
            movq -0x30(%rbp), %rdi
            call print_int
        "}
    );
}

#[test]
fn test_if_inside_loop_gets_fresh_labels() {
    let program = parse(indoc! {r#"
        {
          "type": "Sequence",
          "statements": [
            {
              "type": "If",
              "condition": { "op": "=", "left": { "type": "Var", "name": "A" }, "right": { "type": "Num", "value": 0 } },
              "if_branch": { "type": "Print", "expr": { "type": "Num", "value": 0 } }
            },
            {
              "type": "While",
              "condition": { "op": "<", "left": { "type": "Var", "name": "A" }, "right": { "type": "Num", "value": 3 } },
              "body": {
                "type": "If",
                "condition": { "op": "=", "left": { "type": "Var", "name": "A" }, "right": { "type": "Num", "value": 1 } },
                "if_branch": { "type": "Print", "expr": { "type": "Var", "name": "A" } },
                "else_branch": { "type": "Let", "var": "A", "value": { "type": "Num", "value": 3 } }
              }
            }
          ]
        }
    "#});

    let asm = compile_to_string(&program, fragment_options()).unwrap();
    let labels: Vec<&str> = asm.lines().filter(|line| line.ends_with(':')).collect();
    assert_eq!(
        labels,
        vec![
            "IF_LBB0:",
            "IF_END_LBB0:",
            "WHILE_LBB0:",
            "IF_LBB1:",
            "IF_END_LBB1:",
            "WHILE_END_LBB0:",
        ]
    );
    assert!(asm.contains("jnl WHILE_END_LBB0\n"));
}

#[test]
fn test_full_program_has_frame() {
    let program = parse(r#"{ "type": "Print", "expr": { "type": "Num", "value": 14 } }"#);
    let options = CodegenOptions {
        entry_symbol: "main".to_string(),
        ..CodegenOptions::default()
    };
    let asm = compile_to_string(&program, options).unwrap();
    assert!(asm.starts_with(".globl main\nmain:\npushq %rbp\n"));
    assert!(asm.ends_with("movq %rbp, %rsp\npopq %rbp\nret\n"));
}

#[test]
fn test_invalid_program_is_rejected() {
    let program = parse(indoc! {r#"
        {
          "type": "Let", "var": "A",
          "value": {
            "type": "BinaryOp", "op": "<",
            "left": { "type": "Num", "value": 1 },
            "right": { "type": "Num", "value": 2 }
          }
        }
    "#});

    let err = compile_to_string(&program, CodegenOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::Compiler(CompilerError::RelationalAsValue { .. })
    ));
}
