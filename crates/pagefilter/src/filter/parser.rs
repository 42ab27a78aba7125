//! Filter parser: recursive descent over the token stream.
//!
//! OR binds loosest, AND tighter, comparisons tightest, and parentheses
//! override both. Chains of the same combinator are left-associated, so
//! `a AND b AND c` becomes `(a AND b) AND c`. The parser knows nothing about
//! the schema.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lexer::{tokenize, Lexeme, Token};
use crate::error::{FilterError, FilterResult};

/// Deepest parenthesis nesting accepted.
const MAX_NESTING_DEPTH: usize = 64;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparisonOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "!=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
        }
    }

    /// Whether `ordering` (record value compared to operand) satisfies the operator.
    pub fn accepts(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            ComparisonOp::Eq => ordering == Equal,
            ComparisonOp::Neq => ordering != Equal,
            ComparisonOp::Gt => ordering == Greater,
            ComparisonOp::Gte => matches!(ordering, Greater | Equal),
            ComparisonOp::Lt => ordering == Less,
            ComparisonOp::Lte => matches!(ordering, Less | Equal),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical combinator joining two sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("AND"),
            Combinator::Or => f.write_str("OR"),
        }
    }
}

/// Filter AST. Always binary; parentheses leave no trace in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum FilterNode {
    Comparison {
        path: String,
        op: ComparisonOp,
        literal: String,
    },
    Logical {
        combinator: Combinator,
        left: Box<FilterNode>,
        right: Box<FilterNode>,
    },
}

impl FilterNode {
    pub fn comparison(path: impl Into<String>, op: ComparisonOp, literal: impl Into<String>) -> Self {
        FilterNode::Comparison {
            path: path.into(),
            op,
            literal: literal.into(),
        }
    }

    pub fn and(left: FilterNode, right: FilterNode) -> Self {
        FilterNode::Logical {
            combinator: Combinator::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: FilterNode, right: FilterNode) -> Self {
        FilterNode::Logical {
            combinator: Combinator::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of comparison leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            FilterNode::Comparison { .. } => 1,
            FilterNode::Logical { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Canonical, fully parenthesised form. Re-parses to an equal tree.
impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Comparison { path, op, literal } => write!(f, "{path} {op} \"{literal}\""),
            FilterNode::Logical {
                combinator,
                left,
                right,
            } => write!(f, "({left} {combinator} {right})"),
        }
    }
}

/// Parse a filter expression into an AST.
pub fn parse(input: &str) -> FilterResult<FilterNode> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: input.chars().count(),
        depth: 0,
    };

    if tokens.is_empty() {
        return Err(FilterError::syntax(0, "empty filter expression"));
    }

    let node = parser.parse_expr()?;

    if let Some(lexeme) = parser.peek() {
        let message = match &lexeme.token {
            Token::RParen => "unbalanced parenthesis: unexpected ')'",
            Token::Identifier(_) | Token::LParen => "expected AND or OR between comparisons",
            _ => "unexpected token after complete expression",
        };
        return Err(FilterError::syntax(lexeme.offset, message));
    }

    tracing::debug!(leaves = node.leaf_count(), "parsed filter expression");
    Ok(node)
}

struct Parser<'a> {
    tokens: &'a [Lexeme],
    pos: usize,
    /// Position reported for errors at end of input.
    end: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Lexeme> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, token: &Token) -> bool {
        matches!(self.peek(), Some(l) if &l.token == token)
    }

    fn position(&self) -> usize {
        self.peek().map(|l| l.offset).unwrap_or(self.end)
    }

    fn parse_expr(&mut self) -> FilterResult<FilterNode> {
        let mut left = self.parse_and_expr()?;
        while self.peek_is(&Token::Or) {
            self.pos += 1;
            let right = self.parse_and_expr()?;
            left = FilterNode::or(left, right);
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> FilterResult<FilterNode> {
        let mut left = self.parse_term()?;
        while self.peek_is(&Token::And) {
            self.pos += 1;
            let right = self.parse_term()?;
            left = FilterNode::and(left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> FilterResult<FilterNode> {
        if !self.peek_is(&Token::LParen) {
            return self.parse_comparison();
        }

        let open = self.position();
        self.pos += 1;
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(FilterError::syntax(
                open,
                format!("parentheses nested deeper than {MAX_NESTING_DEPTH}"),
            ));
        }

        let inner = self.parse_expr()?;

        match self.peek() {
            Some(Lexeme {
                token: Token::RParen,
                ..
            }) => {
                self.pos += 1;
                self.depth -= 1;
                Ok(inner)
            }
            None => Err(FilterError::syntax(
                open,
                "unbalanced parenthesis: missing ')'",
            )),
            Some(other) => Err(FilterError::syntax(
                other.offset,
                "expected AND, OR or ')'",
            )),
        }
    }

    fn parse_comparison(&mut self) -> FilterResult<FilterNode> {
        let path = match self.peek() {
            Some(Lexeme {
                token: Token::Identifier(path),
                ..
            }) => {
                self.pos += 1;
                path.clone()
            }
            Some(Lexeme {
                token: Token::RParen,
                offset,
            }) => {
                return Err(FilterError::syntax(
                    *offset,
                    "unbalanced parenthesis: unexpected ')'",
                ))
            }
            Some(other) => {
                return Err(FilterError::syntax(other.offset, "expected attribute path"))
            }
            None => {
                return Err(FilterError::syntax(
                    self.end,
                    "expected attribute path, found end of input",
                ))
            }
        };

        let op = match self.peek() {
            Some(Lexeme {
                token: Token::Operator(op),
                ..
            }) => {
                self.pos += 1;
                *op
            }
            _ => {
                return Err(FilterError::syntax(
                    self.position(),
                    format!("missing operator after '{path}'"),
                ))
            }
        };

        let literal = match self.peek() {
            Some(Lexeme {
                token: Token::Literal { raw, .. },
                ..
            }) => {
                self.pos += 1;
                raw.clone()
            }
            _ => {
                return Err(FilterError::syntax(
                    self.position(),
                    format!("missing value after '{path} {op}'"),
                ))
            }
        };

        Ok(FilterNode::Comparison { path, op, literal })
    }
}
