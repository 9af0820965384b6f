//! Cell expression grammar: lexer, parser and evaluator
//!
//! This module provides the small, explicitly scoped expression language
//! used inside table cells. Value cells are folded to a constant at compile
//! time; condition cells compile to an [`Expr`] that is evaluated against
//! the query value bound to a single-letter variable.
//!
//! The grammar covers literals (integers, floats, quoted strings, booleans,
//! null), arithmetic (`+ - * / %`), comparisons with chaining
//! (`7 <= a < 18`), and boolean connectives (`and`/`or`/`not`, also spelled
//! `&&`/`||`/`!`). It is deliberately closed: no calls, no indexing, no
//! access to anything beyond the bound variable and the compile-time
//! bindings.
//!
//! # Example
//!
//! ```rust
//! use inline_table::core::bindings::Bindings;
//! use inline_table::core::expr::parse_expr;
//! use inline_table::core::value::Value;
//!
//! let expr = parse_expr("7 <= a < 18", Some('a'), &Bindings::new()).unwrap();
//! let result = expr.eval(Some(&Value::Int(10))).unwrap();
//! assert!(result.is_truthy());
//! ```

use crate::core::bindings::Bindings;
use crate::core::value::Value;
use crate::utils::error::{TableError, TableResult};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Token types for the lexer
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),

    // Identifiers (bound variable, binding names, keywords)
    Ident(String),

    // Symbols
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    LParen,  // (
    RParen,  // )
    Lt,      // <
    Le,      // <=
    Gt,      // >
    Ge,      // >=
    EqEq,    // ==
    Ne,      // !=
    AndAnd,  // &&
    OrOr,    // ||
    Bang,    // !

    Eof,
}

/// Lexer for cell expressions
struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        self.input.next()
    }

    fn read_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> String {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if predicate(c) {
                result.push(c);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> TableResult<String> {
        // Consume opening quote
        self.advance();
        let mut result = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(result),
                Some('\\') => match self.advance() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('r') => result.push('\r'),
                    Some('\\') => result.push('\\'),
                    Some(c) if c == quote => result.push(c),
                    Some(c) => {
                        result.push('\\');
                        result.push(c);
                    }
                    None => return Err(TableError::markup("unterminated string literal")),
                },
                Some(c) => result.push(c),
                None => return Err(TableError::markup("unterminated string literal")),
            }
        }
    }

    fn read_number(&mut self) -> TableResult<Token> {
        let mut text = self.read_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.advance();
            text.push_str(&self.read_while(|c| c.is_ascii_digit()));
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            text.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.advance();
            }
            let digits = self.read_while(|c| c.is_ascii_digit());
            if digits.is_empty() {
                return Err(TableError::markup(format!("invalid number '{}'", text)));
            }
            text.push_str(&digits);
        }

        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| TableError::markup(format!("invalid number '{}'", text)))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| TableError::markup(format!("invalid number '{}'", text)))
        }
    }

    fn next_token(&mut self) -> TableResult<Token> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        if c.is_ascii_digit() {
            return self.read_number();
        }
        if c == '\'' || c == '"' {
            return self.read_string(c).map(Token::Str);
        }
        if c.is_alphabetic() || c == '_' {
            let ident = self.read_while(|c| c.is_alphanumeric() || c == '_');
            return Ok(Token::Ident(ident));
        }

        self.advance();
        match c {
            '+' => Ok(Token::Plus),
            '-' => Ok(Token::Minus),
            '*' => Ok(Token::Star),
            '/' => Ok(Token::Slash),
            '%' => Ok(Token::Percent),
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Le)
                } else {
                    Ok(Token::Lt)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Ge)
                } else {
                    Ok(Token::Gt)
                }
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::EqEq)
                } else {
                    Err(TableError::markup("expected '==' (assignment is not supported)"))
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Ne)
                } else {
                    Ok(Token::Bang)
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    Ok(Token::AndAnd)
                } else {
                    Err(TableError::markup("unexpected character '&'"))
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    Ok(Token::OrOr)
                } else {
                    Err(TableError::markup("unexpected character '|'"))
                }
            }
            other => Err(TableError::markup(format!(
                "unexpected character '{}' in expression",
                other
            ))),
        }
    }

    fn tokenize(mut self) -> TableResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Comparison operators, chainable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Arithmetic and boolean binary operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A compiled cell expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant (literal or resolved binding)
    Lit(Value),
    /// The bound variable of a condition column
    Var,
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// Chained comparison: `lhs op1 e1 op2 e2 ...`
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
}

/// Evaluation failure inside a compiled expression
///
/// At compile time (constant folding) this is surfaced as a markup error;
/// at query time a failing condition simply does not match.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    TypeMismatch { message: String },
    DivisionByZero,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::TypeMismatch { message } => write!(f, "type mismatch: {}", message),
            EvalError::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Recursive-descent parser over the token stream
struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    /// Bound variable of the enclosing condition column, if any
    var: Option<char>,
    bindings: &'a Bindings,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token, what: &str) -> TableResult<()> {
        if *self.peek() == token {
            self.advance();
            Ok(())
        } else {
            Err(TableError::markup(format!(
                "expected {}, found {:?}",
                what,
                self.peek()
            )))
        }
    }

    fn parse_expr(&mut self) -> TableResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> TableResult<Expr> {
        let mut lhs = self.parse_and()?;
        loop {
            let is_or = match self.peek() {
                Token::OrOr => true,
                Token::Ident(s) if s == "or" => true,
                _ => false,
            };
            if !is_or {
                return Ok(lhs);
            }
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_and(&mut self) -> TableResult<Expr> {
        let mut lhs = self.parse_not()?;
        loop {
            let is_and = match self.peek() {
                Token::AndAnd => true,
                Token::Ident(s) if s == "and" => true,
                _ => false,
            };
            if !is_and {
                return Ok(lhs);
            }
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_not(&mut self) -> TableResult<Expr> {
        let is_not = match self.peek() {
            Token::Bang => true,
            Token::Ident(s) if s == "not" => true,
            _ => false,
        };
        if is_not {
            self.advance();
            let operand = self.parse_not()?;
            Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> TableResult<Expr> {
        let lhs = self.parse_additive()?;
        let mut chain = Vec::new();
        loop {
            let op = match self.peek() {
                Token::Lt => CmpOp::Lt,
                Token::Le => CmpOp::Le,
                Token::Gt => CmpOp::Gt,
                Token::Ge => CmpOp::Ge,
                Token::EqEq => CmpOp::Eq,
                Token::Ne => CmpOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            chain.push((op, rhs));
        }
        if chain.is_empty() {
            Ok(lhs)
        } else {
            Ok(Expr::Compare(Box::new(lhs), chain))
        }
    }

    fn parse_additive(&mut self) -> TableResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_multiplicative(&mut self) -> TableResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> TableResult<Expr> {
        if *self.peek() == Token::Minus {
            self.advance();
            let operand = self.parse_unary()?;
            Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> TableResult<Expr> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Lit(Value::Int(n))),
            Token::Float(x) => Ok(Expr::Lit(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Lit(Value::Str(s))),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Ident(name) => self.resolve_ident(&name),
            other => Err(TableError::markup(format!(
                "expected a literal, found {:?}",
                other
            ))),
        }
    }

    /// Resolve an identifier: keyword literal, bound variable, or binding
    fn resolve_ident(&self, name: &str) -> TableResult<Expr> {
        match name {
            "true" | "True" => return Ok(Expr::Lit(Value::Bool(true))),
            "false" | "False" => return Ok(Expr::Lit(Value::Bool(false))),
            "null" | "none" | "None" => return Ok(Expr::Lit(Value::Null)),
            _ => {}
        }
        if let Some(var) = self.var {
            // The bound variable shadows any binding with the same name
            let mut chars = name.chars();
            if chars.next() == Some(var) && chars.next().is_none() {
                return Ok(Expr::Var);
            }
        }
        if let Some(value) = self.bindings.get(name) {
            return Ok(Expr::Lit(value.clone()));
        }
        Err(TableError::unknown_name(name))
    }
}

/// Parse a cell expression.
///
/// `var` is the bound variable of a condition column; `None` for value and
/// regex cells, where only literals and bindings are allowed.
pub fn parse_expr(src: &str, var: Option<char>, bindings: &Bindings) -> TableResult<Expr> {
    let tokens = Lexer::new(src).tokenize()?;
    if tokens.len() == 1 {
        return Err(TableError::markup("empty expression"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        var,
        bindings,
    };
    let expr = parser.parse_expr()?;
    if *parser.peek() != Token::Eof {
        return Err(TableError::markup(format!(
            "unexpected trailing input after expression: {:?}",
            parser.peek()
        )));
    }
    Ok(expr)
}

/// Parse and immediately fold a literal cell to a constant.
///
/// Evaluation failures are reported as markup errors since they happen at
/// compile time.
pub fn eval_literal(src: &str, bindings: &Bindings) -> TableResult<Value> {
    let expr = parse_expr(src, None, bindings)?;
    expr.eval(None)
        .map_err(|e| TableError::markup(format!("cannot evaluate '{}': {}", src, e)))
}

impl Expr {
    /// Evaluate the expression with the bound variable set to `x`
    pub fn eval(&self, x: Option<&Value>) -> Result<Value, EvalError> {
        match self {
            Expr::Lit(v) => Ok(v.clone()),
            Expr::Var => match x {
                Some(v) => Ok(v.clone()),
                // Unreachable through the public API: conditions are always
                // evaluated with a query value
                None => Ok(Value::Null),
            },
            Expr::Unary(UnaryOp::Neg, operand) => match operand.eval(x)? {
                Value::Int(n) => Ok(Value::Int(-n)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(EvalError::TypeMismatch {
                    message: format!("cannot negate {}", other.repr()),
                }),
            },
            Expr::Unary(UnaryOp::Not, operand) => {
                Ok(Value::Bool(!operand.eval(x)?.is_truthy()))
            }
            Expr::Binary(BinOp::And, lhs, rhs) => {
                if !lhs.eval(x)?.is_truthy() {
                    Ok(Value::Bool(false))
                } else {
                    Ok(Value::Bool(rhs.eval(x)?.is_truthy()))
                }
            }
            Expr::Binary(BinOp::Or, lhs, rhs) => {
                if lhs.eval(x)?.is_truthy() {
                    Ok(Value::Bool(true))
                } else {
                    Ok(Value::Bool(rhs.eval(x)?.is_truthy()))
                }
            }
            Expr::Binary(op, lhs, rhs) => arith(*op, &lhs.eval(x)?, &rhs.eval(x)?),
            Expr::Compare(first, chain) => {
                let mut lhs = first.eval(x)?;
                for (op, rhs_expr) in chain {
                    let rhs = rhs_expr.eval(x)?;
                    if !compare(*op, &lhs, &rhs)? {
                        return Ok(Value::Bool(false));
                    }
                    lhs = rhs;
                }
                Ok(Value::Bool(true))
            }
        }
    }
}

fn arith(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    // String concatenation is the only non-numeric arithmetic
    if let (BinOp::Add, Value::Str(a), Value::Str(b)) = (op, lhs, rhs) {
        return Ok(Value::Str(format!("{}{}", a, b)));
    }

    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let result = match op {
            BinOp::Add => a.checked_add(*b),
            BinOp::Sub => a.checked_sub(*b),
            BinOp::Mul => a.checked_mul(*b),
            BinOp::Div => {
                if *b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                // Integer division falls back to float when inexact
                if a % b != 0 {
                    return Ok(Value::Float(*a as f64 / *b as f64));
                }
                a.checked_div(*b)
            }
            BinOp::Rem => {
                if *b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                a.checked_rem(*b)
            }
            BinOp::And | BinOp::Or => unreachable!("handled in eval"),
        };
        return result.map(Value::Int).ok_or(EvalError::TypeMismatch {
            message: "integer overflow".to_string(),
        });
    }

    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => match op {
            BinOp::Add => Ok(Value::Float(a + b)),
            BinOp::Sub => Ok(Value::Float(a - b)),
            BinOp::Mul => Ok(Value::Float(a * b)),
            BinOp::Div => {
                if b == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(Value::Float(a / b))
                }
            }
            BinOp::Rem => {
                if b == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(Value::Float(a % b))
                }
            }
            BinOp::And | BinOp::Or => unreachable!("handled in eval"),
        },
        _ => Err(EvalError::TypeMismatch {
            message: format!("cannot apply {:?} to {} and {}", op, lhs.repr(), rhs.repr()),
        }),
    }
}

fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
    match op {
        CmpOp::Eq => Ok(lhs == rhs),
        CmpOp::Ne => Ok(lhs != rhs),
        _ => {
            let ordering = lhs.compare(rhs).ok_or_else(|| EvalError::TypeMismatch {
                message: format!("cannot order {} and {}", lhs.repr(), rhs.repr()),
            })?;
            Ok(match op {
                CmpOp::Lt => ordering == Ordering::Less,
                CmpOp::Le => ordering != Ordering::Greater,
                CmpOp::Gt => ordering == Ordering::Greater,
                CmpOp::Ge => ordering != Ordering::Less,
                CmpOp::Eq | CmpOp::Ne => unreachable!(),
            })
        }
    }
}
