//! Tokenizer for the predicate grammar.

use simpledao_core::{DaoError, DaoResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Placeholder,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    Where,
    And,
    Or,
    Not,
    Like,
    Is,
    Null,
    True,
    False,
}

impl Token {
    fn keyword(word: &str) -> Option<Token> {
        let token = match word.to_ascii_lowercase().as_str() {
            "where" => Token::Where,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "like" => Token::Like,
            "is" => Token::Is,
            "null" => Token::Null,
            "true" => Token::True,
            "false" => Token::False,
            _ => return None,
        };
        Some(token)
    }
}

/// Split a query string into tokens.
pub(crate) fn tokenize(input: &str) -> DaoResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => {}
            '?' => tokens.push(Token::Placeholder),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '=' => {
                // Accept both `=` and `==`.
                if chars.peek().map(|(_, c)| *c) == Some('=') {
                    chars.next();
                }
                tokens.push(Token::Eq);
            }
            '!' => match chars.next() {
                Some((_, '=')) => tokens.push(Token::NotEq),
                _ => {
                    return Err(DaoError::malformed_query(format!(
                        "expected '=' after '!' at offset {pos}"
                    )));
                }
            },
            '<' => match chars.peek().map(|(_, c)| *c) {
                Some('=') => {
                    chars.next();
                    tokens.push(Token::Le);
                }
                Some('>') => {
                    chars.next();
                    tokens.push(Token::NotEq);
                }
                _ => tokens.push(Token::Lt),
            },
            '>' => {
                if chars.peek().map(|(_, c)| *c) == Some('=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '\'' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == '\'' {
                        // '' is an escaped quote inside a string literal.
                        if chars.peek().map(|(_, c)| *c) == Some('\'') {
                            chars.next();
                            value.push('\'');
                        } else {
                            closed = true;
                            break;
                        }
                    } else {
                        value.push(c);
                    }
                }
                if !closed {
                    return Err(DaoError::malformed_query(format!(
                        "unterminated string literal starting at offset {pos}"
                    )));
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() || (c == '-' && next_is_digit(&mut chars)) => {
                let mut literal = String::from(c);
                while let Some((_, c)) = chars.peek().copied() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(number(&literal, pos)?);
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some((_, c)) = chars.peek().copied() {
                    if c.is_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::keyword(&word).unwrap_or(Token::Ident(word)));
            }
            other => {
                return Err(DaoError::malformed_query(format!(
                    "unexpected character '{other}' at offset {pos}"
                )));
            }
        }
    }

    Ok(tokens)
}

fn next_is_digit(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> bool {
    chars.peek().is_some_and(|(_, c)| c.is_ascii_digit())
}

fn number(literal: &str, pos: usize) -> DaoResult<Token> {
    if literal.contains('.') {
        literal
            .parse::<f64>()
            .map(Token::Float)
            .map_err(|e| DaoError::malformed_query(format!("bad number '{literal}' at offset {pos}: {e}")))
    } else {
        literal
            .parse::<i64>()
            .map(Token::Int)
            .map_err(|e| DaoError::malformed_query(format!("bad number '{literal}' at offset {pos}: {e}")))
    }
}
