//! Recursive-descent parser producing a predicate tree.

use simpledao_core::{DaoError, DaoResult, FieldValue};

use crate::lexer::{tokenize, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Right-hand side of a comparison: a literal, or the n-th `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(FieldValue),
    Param(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare {
        field: String,
        op: CompareOp,
        operand: Operand,
    },
    Like {
        field: String,
        pattern: Operand,
        negated: bool,
    },
    IsNull {
        field: String,
        negated: bool,
    },
}

impl Expr {
    /// Visit every field name referenced by the expression.
    pub fn for_each_field<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.for_each_field(f);
                r.for_each_field(f);
            }
            Expr::Not(inner) => inner.for_each_field(f),
            Expr::Compare { field, .. } | Expr::Like { field, .. } | Expr::IsNull { field, .. } => {
                f(field)
            }
        }
    }

    /// Visit every LIKE pattern operand.
    pub fn for_each_like_pattern<'a>(&'a self, f: &mut impl FnMut(&'a Operand)) {
        match self {
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.for_each_like_pattern(f);
                r.for_each_like_pattern(f);
            }
            Expr::Not(inner) => inner.for_each_like_pattern(f),
            Expr::Like { pattern, .. } => f(pattern),
            Expr::Compare { .. } | Expr::IsNull { .. } => {}
        }
    }
}

/// A parsed (but unbound) query.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    /// `None` for an empty filter, which matches everything.
    pub filter: Option<Expr>,
    pub placeholders: usize,
}

pub fn parse(input: &str) -> DaoResult<ParsedQuery> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        placeholders: 0,
        depth: 0,
        terms: 0,
    };

    parser.eat(&Token::Where);
    let filter = if parser.at_end() {
        None
    } else {
        Some(parser.or_expr()?)
    };

    if let Some(token) = parser.peek() {
        return Err(DaoError::malformed_query(format!(
            "unexpected trailing token {token:?}"
        )));
    }

    Ok(ParsedQuery {
        filter,
        placeholders: parser.placeholders,
    })
}

/// Deepest allowed nesting of parentheses and `NOT`.
pub const MAX_DEPTH: usize = 128;

/// Most comparisons a single query may contain.
pub const MAX_TERMS: usize = 1024;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    placeholders: usize,
    depth: usize,
    terms: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> DaoResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(DaoError::malformed_query(format!(
                "expected {expected:?}, found {:?}",
                self.peek()
            )))
        }
    }

    fn or_expr(&mut self) -> DaoResult<Expr> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> DaoResult<Expr> {
        let mut left = self.unary()?;
        while self.eat(&Token::And) {
            let right = self.unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> DaoResult<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(DaoError::malformed_query(format!(
                "query nested too deeply (limit {MAX_DEPTH})"
            )));
        }
        self.depth += 1;
        let expr = self.primary();
        self.depth -= 1;
        expr
    }

    fn primary(&mut self) -> DaoResult<Expr> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if self.eat(&Token::LParen) {
            let inner = self.or_expr()?;
            self.expect(&Token::RParen)?;
            return Ok(inner);
        }
        self.comparison()
    }

    fn comparison(&mut self) -> DaoResult<Expr> {
        self.terms += 1;
        if self.terms > MAX_TERMS {
            return Err(DaoError::malformed_query(format!(
                "query has too many terms (limit {MAX_TERMS})"
            )));
        }

        let field = match self.advance() {
            Some(Token::Ident(name)) => name,
            other => {
                return Err(DaoError::malformed_query(format!(
                    "expected field name, found {other:?}"
                )));
            }
        };

        let op = match self.advance() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::NotEq) => CompareOp::NotEq,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Le) => CompareOp::Le,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Ge) => CompareOp::Ge,
            Some(Token::Like) => {
                let pattern = self.operand()?;
                return Ok(Expr::Like {
                    field,
                    pattern,
                    negated: false,
                });
            }
            Some(Token::Not) => {
                self.expect(&Token::Like)?;
                let pattern = self.operand()?;
                return Ok(Expr::Like {
                    field,
                    pattern,
                    negated: true,
                });
            }
            Some(Token::Is) => {
                let negated = self.eat(&Token::Not);
                self.expect(&Token::Null)?;
                return Ok(Expr::IsNull { field, negated });
            }
            other => {
                return Err(DaoError::malformed_query(format!(
                    "expected comparison operator after '{field}', found {other:?}"
                )));
            }
        };

        let operand = self.operand()?;
        Ok(Expr::Compare { field, op, operand })
    }

    fn operand(&mut self) -> DaoResult<Operand> {
        let operand = match self.advance() {
            Some(Token::Str(s)) => Operand::Value(FieldValue::Text(s)),
            Some(Token::Int(i)) => Operand::Value(FieldValue::Int(i)),
            Some(Token::Float(x)) => Operand::Value(FieldValue::Float(x)),
            Some(Token::True) => Operand::Value(FieldValue::Bool(true)),
            Some(Token::False) => Operand::Value(FieldValue::Bool(false)),
            Some(Token::Null) => Operand::Value(FieldValue::Null),
            Some(Token::Placeholder) => {
                let index = self.placeholders;
                self.placeholders += 1;
                Operand::Param(index)
            }
            other => {
                return Err(DaoError::malformed_query(format!(
                    "expected value or '?', found {other:?}"
                )));
            }
        };
        Ok(operand)
    }
}
