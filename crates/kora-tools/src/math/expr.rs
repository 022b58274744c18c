//! Arithmetic expression evaluator
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := number | constant | function '(' expr ')' | '(' expr ')'
//! ```
//!
//! Exponentiation is right-associative and binds tighter than unary minus,
//! so `-2^2` is `-4`.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ToolError, ToolResult};

/// Deepest nesting of parentheses, signs and exponents accepted
pub const MAX_DEPTH: usize = 256;

/// Evaluate `input` to a finite number
pub fn evaluate(input: &str) -> ToolResult<f64> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(syntax("empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(syntax(format!("unexpected {token:?}")));
    }
    finite(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

fn syntax(message: impl Into<String>) -> ToolError {
    ToolError::invalid("calculate", message)
}

fn finite(value: f64) -> ToolResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ToolError::computation("result is not a finite number"))
    }
}

fn tokenize(input: &str) -> ToolResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => tokens.push(Token::Number(number(&mut chars)?)),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident.to_ascii_lowercase()));
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '^' => Token::Caret,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    other => return Err(syntax(format!("unexpected character '{other}'"))),
                };
                chars.next();
                tokens.push(token);
            }
        }
    }

    Ok(tokens)
}

fn number(chars: &mut Peekable<Chars<'_>>) -> ToolResult<f64> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    text.parse()
        .map_err(|_| syntax(format!("malformed number '{text}'")))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ToolResult<()> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(syntax(format!("expected {token:?}")))
        }
    }

    fn expr(&mut self) -> ToolResult<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                value += self.term()?;
            } else if self.eat(&Token::Minus) {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> ToolResult<f64> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                value *= self.unary()?;
            } else if self.eat(&Token::Slash) {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return Err(ToolError::computation("division by zero"));
                }
                value /= rhs;
            } else if self.eat(&Token::Percent) {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return Err(ToolError::computation("modulo by zero"));
                }
                value %= rhs;
            } else {
                return Ok(value);
            }
        }
    }

    // every recursive path (signs, exponents, parentheses, calls) passes here
    fn unary(&mut self) -> ToolResult<f64> {
        if self.depth >= MAX_DEPTH {
            return Err(syntax("expression nested too deeply"));
        }
        self.depth += 1;
        let value = if self.eat(&Token::Minus) {
            self.unary().map(|v| -v)
        } else if self.eat(&Token::Plus) {
            self.unary()
        } else {
            self.power()
        };
        self.depth -= 1;
        value
    }

    fn power(&mut self) -> ToolResult<f64> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return finite(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> ToolResult<f64> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                _ => {
                    self.expect(Token::LParen)?;
                    let arg = self.expr()?;
                    self.expect(Token::RParen)?;
                    apply(&name, arg)
                }
            },
            Some(token) => Err(syntax(format!("unexpected {token:?}"))),
            None => Err(syntax("unexpected end of expression")),
        }
    }
}

fn apply(function: &str, x: f64) -> ToolResult<f64> {
    let value = match function {
        "sqrt" => {
            if x < 0.0 {
                return Err(ToolError::computation("square root of a negative number"));
            }
            x.sqrt()
        }
        "ln" | "log" if x <= 0.0 => {
            return Err(ToolError::computation("logarithm of a non-positive number"));
        }
        "ln" => x.ln(),
        "log" => x.log10(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "abs" => x.abs(),
        "exp" => x.exp(),
        other => return Err(syntax(format!("unknown function or variable '{other}'"))),
    };
    finite(value)
}

/// Round to `digits` significant digits
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || digits >= 17 {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits as i32 - 1 - magnitude;
    if shift > 300 || shift < -300 {
        return value;
    }
    let factor = 10f64.powi(shift.abs());
    if shift >= 0 {
        (value * factor).round() / factor
    } else {
        (value / factor).round() * factor
    }
}
