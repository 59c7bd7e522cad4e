//! Abstract Syntax Tree for the Tiny language
//!
//! The tree is built by an external parser and handed to the backend as-is.
//! Every consumer matches exhaustively on [`Node`]; there are no downcasts.
//!
//! The serde form is the interchange format read by the driver: nodes carry
//! an internally tagged `"type"` field and operators are their one-character
//! source symbol, e.g.
//!
//! ```json
//! { "type": "Print", "expr": { "type": "Num", "value": 42 } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators
///
/// Arithmetic operators produce a value; relational operators only set the
/// machine flags and are legal solely as the condition of `If`/`While`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
}

impl BinaryOp {
    pub fn is_relational(&self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::Less | BinaryOp::Greater)
    }

    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Equal => '=',
            BinaryOp::Less => '<',
            BinaryOp::Greater => '>',
        }
    }

    /// Map a source symbol onto an operator; anything outside the seven
    /// recognized symbols is rejected here, before code generation.
    pub fn from_symbol(symbol: char) -> Option<BinaryOp> {
        match symbol {
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Sub),
            '*' => Some(BinaryOp::Mul),
            '/' => Some(BinaryOp::Div),
            '=' => Some(BinaryOp::Equal),
            '<' => Some(BinaryOp::Less),
            '>' => Some(BinaryOp::Greater),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A binary expression, also used directly as an `If`/`While` condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Node>,
    pub right: Box<Node>,
}

impl BinaryExpr {
    pub fn new(op: BinaryOp, left: Node, right: Node) -> Self {
        Self {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// AST node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Num {
        value: i64,
    },
    Var {
        name: char,
    },
    Let {
        var: char,
        value: Box<Node>,
    },
    Print {
        expr: Box<Node>,
    },
    Sequence {
        statements: Vec<Node>,
    },
    BinaryOp(BinaryExpr),
    If {
        condition: BinaryExpr,
        if_branch: Box<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_branch: Option<Box<Node>>,
    },
    While {
        condition: BinaryExpr,
        body: Box<Node>,
    },
}

impl Node {
    pub fn num(value: i64) -> Self {
        Node::Num { value }
    }

    pub fn var(name: char) -> Self {
        Node::Var { name }
    }

    pub fn let_(var: char, value: Node) -> Self {
        Node::Let {
            var,
            value: Box::new(value),
        }
    }

    pub fn print(expr: Node) -> Self {
        Node::Print {
            expr: Box::new(expr),
        }
    }

    pub fn seq(statements: Vec<Node>) -> Self {
        Node::Sequence { statements }
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::BinaryOp(BinaryExpr::new(op, left, right))
    }

    pub fn if_(condition: BinaryExpr, if_branch: Node, else_branch: Option<Node>) -> Self {
        Node::If {
            condition,
            if_branch: Box::new(if_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn while_(condition: BinaryExpr, body: Node) -> Self {
        Node::While {
            condition,
            body: Box::new(body),
        }
    }

    /// Nesting depth of the tree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        let children = match self {
            Node::Num { .. } | Node::Var { .. } => 0,
            Node::Let { value, .. } => value.depth(),
            Node::Print { expr } => expr.depth(),
            Node::Sequence { statements } => {
                statements.iter().map(Node::depth).max().unwrap_or(0)
            }
            Node::BinaryOp(expr) => expr.left.depth().max(expr.right.depth()),
            Node::If {
                condition,
                if_branch,
                else_branch,
            } => {
                let cond = condition.left.depth().max(condition.right.depth()) + 1;
                let else_depth = else_branch.as_ref().map_or(0, |e| e.depth());
                cond.max(if_branch.depth()).max(else_depth)
            }
            Node::While { condition, body } => {
                let cond = condition.left.depth().max(condition.right.depth()) + 1;
                cond.max(body.depth())
            }
        };
        children + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operator_symbols() {
        for op in [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::Equal,
            BinaryOp::Less,
            BinaryOp::Greater,
        ] {
            assert_eq!(BinaryOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinaryOp::from_symbol('%'), None);
        assert_eq!(format!("{}", BinaryOp::Greater), ">");
    }

    #[test]
    fn test_relational_classification() {
        assert!(BinaryOp::Equal.is_relational());
        assert!(BinaryOp::Less.is_relational());
        assert!(BinaryOp::Greater.is_relational());
        assert!(!BinaryOp::Add.is_relational());
        assert!(!BinaryOp::Div.is_relational());
    }

    #[test]
    fn test_depth() {
        assert_eq!(Node::num(1).depth(), 1);
        assert_eq!(Node::print(Node::num(1)).depth(), 2);

        let expr = Node::binary(
            BinaryOp::Add,
            Node::num(2),
            Node::binary(BinaryOp::Mul, Node::num(3), Node::num(4)),
        );
        assert_eq!(expr.depth(), 3);

        let lp = Node::while_(
            BinaryExpr::new(BinaryOp::Greater, Node::var('A'), Node::num(0)),
            Node::let_('A', Node::num(0)),
        );
        assert_eq!(lp.depth(), 3);
    }

    #[test]
    fn test_deserialize_program() {
        let json = r#"{
            "type": "Sequence",
            "statements": [
                { "type": "Let", "var": "A", "value": { "type": "Num", "value": 3 } },
                {
                    "type": "If",
                    "condition": {
                        "op": "<",
                        "left": { "type": "Var", "name": "A" },
                        "right": { "type": "Num", "value": 5 }
                    },
                    "if_branch": { "type": "Print", "expr": { "type": "Var", "name": "A" } }
                }
            ]
        }"#;

        let node: Node = serde_json::from_str(json).unwrap();
        let expected = Node::seq(vec![
            Node::let_('A', Node::num(3)),
            Node::if_(
                BinaryExpr::new(BinaryOp::Less, Node::var('A'), Node::num(5)),
                Node::print(Node::var('A')),
                None,
            ),
        ]);
        assert_eq!(node, expected);
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let json = r#"{
            "type": "BinaryOp",
            "op": "%",
            "left": { "type": "Num", "value": 1 },
            "right": { "type": "Num", "value": 2 }
        }"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn test_serialize_binary_op() {
        let node = Node::binary(BinaryOp::Sub, Node::var('X'), Node::num(1));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "BinaryOp");
        assert_eq!(json["op"], "-");
        assert_eq!(json["left"]["name"], "X");
    }
}
