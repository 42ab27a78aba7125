//! Filter expression language: lexer and recursive-descent parser.
//!
//! ```text
//! expr       := andExpr (OR andExpr)*
//! andExpr    := term (AND term)*
//! term       := '(' expr ')' | comparison
//! comparison := path operator literal
//! operator   := '=' | '!=' | '>' | '>=' | '<' | '<='
//! ```

pub mod lexer;
pub mod parser;

pub use lexer::{tokenize, Lexeme, Token};
pub use parser::{parse, Combinator, ComparisonOp, FilterNode};
