//! Scalar formulas over `x, y, z`
//!
//! A small recursive-descent parser producing an [`Expr`] tree and an
//! interpreter that evaluates it at a point. Nothing outside the grammar below
//! can be expressed, so formulas read from scene files are safe to evaluate.
//!
//! ```text
//! expr    = term (('+' | '-') term)*
//! term    = unary (('*' | '/') unary)*
//! unary   = '-' unary | '+' unary | power
//! power   = atom ('^' unary)?
//! atom    = number | ident | ident '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! Identifiers may carry a `Math.` prefix (`Math.sin(x)`), matching the way
//! older scene files wrote their field functions.

use glam::DVec3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    X,
    Y,
    Z,
    /// Distance from the origin
    R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Ln,
    Log10,
    Sqrt,
    Abs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFn {
    Atan2,
    Pow,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(Var),
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call1(UnaryFn, Box<Expr>),
    Call2(BinaryFn, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("expected {expected} at offset {offset}")]
    Expected {
        expected: &'static str,
        offset: usize,
    },
    #[error("unknown name '{name}' at offset {offset}")]
    UnknownName { name: String, offset: usize },
    #[error("'{name}' takes {expected} argument(s), got {found} (offset {offset})")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
        offset: usize,
    },
    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("formula nests too deeply at offset {offset}")]
    TooDeep { offset: usize },
}

impl Expr {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let mut parser = Parser::new(source);
        let expr = parser.expr()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(expr),
            Some(c) => Err(ExprError::UnexpectedChar {
                found: c,
                offset: parser.pos,
            }),
        }
    }

    /// Evaluate at `point`. Domain errors follow IEEE rules (`sqrt(-1)` is NaN).
    pub fn eval(&self, point: DVec3) -> f64 {
        match self {
            Expr::Num(v) => *v,
            Expr::Var(Var::X) => point.x,
            Expr::Var(Var::Y) => point.y,
            Expr::Var(Var::Z) => point.z,
            Expr::Var(Var::R) => point.length(),
            Expr::Neg(e) => -e.eval(point),
            Expr::Bin(op, a, b) => {
                let (a, b) = (a.eval(point), b.eval(point));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
            Expr::Call1(f, a) => {
                let a = a.eval(point);
                match f {
                    UnaryFn::Sin => a.sin(),
                    UnaryFn::Cos => a.cos(),
                    UnaryFn::Tan => a.tan(),
                    UnaryFn::Asin => a.asin(),
                    UnaryFn::Acos => a.acos(),
                    UnaryFn::Atan => a.atan(),
                    UnaryFn::Exp => a.exp(),
                    UnaryFn::Ln => a.ln(),
                    UnaryFn::Log10 => a.log10(),
                    UnaryFn::Sqrt => a.sqrt(),
                    UnaryFn::Abs => a.abs(),
                }
            }
            Expr::Call2(f, a, b) => {
                let (a, b) = (a.eval(point), b.eval(point));
                match f {
                    BinaryFn::Atan2 => a.atan2(b),
                    BinaryFn::Pow => a.powf(b),
                    BinaryFn::Min => a.min(b),
                    BinaryFn::Max => a.max(b),
                }
            }
        }
    }

    /// True when the formula does not mention any variable.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Num(_) => true,
            Expr::Var(_) => false,
            Expr::Neg(e) | Expr::Call1(_, e) => e.is_constant(),
            Expr::Bin(_, a, b) | Expr::Call2(_, a, b) => a.is_constant() && b.is_constant(),
        }
    }
}

impl FromStr for Expr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expr::parse(s)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(v) => write!(f, "{v}"),
            Expr::Var(v) => f.write_str(match v {
                Var::X => "x",
                Var::Y => "y",
                Var::Z => "z",
                Var::R => "r",
            }),
            Expr::Neg(e) => write!(f, "(-{e})"),
            Expr::Bin(op, a, b) => {
                let op = match op {
                    BinOp::Add => "+",
                    BinOp::Sub => "-",
                    BinOp::Mul => "*",
                    BinOp::Div => "/",
                    BinOp::Pow => "^",
                };
                write!(f, "({a} {op} {b})")
            }
            Expr::Call1(func, a) => write!(f, "{}({a})", unary_name(*func)),
            Expr::Call2(func, a, b) => write!(f, "{}({a}, {b})", binary_name(*func)),
        }
    }
}

fn unary_name(f: UnaryFn) -> &'static str {
    match f {
        UnaryFn::Sin => "sin",
        UnaryFn::Cos => "cos",
        UnaryFn::Tan => "tan",
        UnaryFn::Asin => "asin",
        UnaryFn::Acos => "acos",
        UnaryFn::Atan => "atan",
        UnaryFn::Exp => "exp",
        UnaryFn::Ln => "ln",
        UnaryFn::Log10 => "log",
        UnaryFn::Sqrt => "sqrt",
        UnaryFn::Abs => "abs",
    }
}

fn binary_name(f: BinaryFn) -> &'static str {
    match f {
        BinaryFn::Atan2 => "atan2",
        BinaryFn::Pow => "pow",
        BinaryFn::Min => "min",
        BinaryFn::Max => "max",
    }
}

enum Name {
    Const(f64),
    Var(Var),
    Unary(UnaryFn),
    Binary(BinaryFn),
}

fn lookup(name: &str) -> Option<Name> {
    let name = name.strip_prefix("Math.").unwrap_or(name);
    Some(match name.to_ascii_lowercase().as_str() {
        "pi" => Name::Const(std::f64::consts::PI),
        "e" => Name::Const(std::f64::consts::E),
        "x" => Name::Var(Var::X),
        "y" => Name::Var(Var::Y),
        "z" => Name::Var(Var::Z),
        "r" => Name::Var(Var::R),
        "sin" => Name::Unary(UnaryFn::Sin),
        "cos" => Name::Unary(UnaryFn::Cos),
        "tan" => Name::Unary(UnaryFn::Tan),
        "asin" => Name::Unary(UnaryFn::Asin),
        "acos" => Name::Unary(UnaryFn::Acos),
        "atan" => Name::Unary(UnaryFn::Atan),
        "exp" => Name::Unary(UnaryFn::Exp),
        "ln" => Name::Unary(UnaryFn::Ln),
        "log" | "log10" => Name::Unary(UnaryFn::Log10),
        "sqrt" => Name::Unary(UnaryFn::Sqrt),
        "abs" => Name::Unary(UnaryFn::Abs),
        "atan2" => Name::Binary(BinaryFn::Atan2),
        "pow" => Name::Binary(BinaryFn::Pow),
        "min" => Name::Binary(BinaryFn::Min),
        "max" => Name::Binary(BinaryFn::Max),
        _ => return None,
    })
}

/// Deepest expression tree the parser builds, counting both nesting and
/// operator chains.
pub const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn too_deep(&self, extra: usize) -> Result<(), ExprError> {
        if self.depth + extra > MAX_DEPTH {
            return Err(ExprError::TooDeep { offset: self.pos });
        }
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consume `c` if it is the next non-blank character.
    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        for chain in 1.. {
            let op = if self.eat('+') {
                BinOp::Add
            } else if self.eat('-') {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            self.too_deep(chain)?;
            let rhs = self.term()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        for chain in 1.. {
            let op = if self.eat('*') {
                BinOp::Mul
            } else if self.eat('/') {
                BinOp::Div
            } else {
                return Ok(lhs);
            };
            self.too_deep(chain)?;
            let rhs = self.unary()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// Every recursive path passes through here, so this is where depth is counted.
    fn unary(&mut self) -> Result<Expr, ExprError> {
        self.too_deep(1)?;
        self.depth += 1;
        let result = self.signed();
        self.depth -= 1;
        result
    }

    fn signed(&mut self) -> Result<Expr, ExprError> {
        if self.eat('-') {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat('+') {
            return self.unary();
        }
        self.power()
    }

    /// `^` is right-associative and binds tighter than unary minus on its left.
    fn power(&mut self) -> Result<Expr, ExprError> {
        let base = self.atom()?;
        if self.eat('^') {
            let exponent = self.unary()?;
            return Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some('(') => {
                self.bump();
                let inner = self.expr()?;
                if !self.eat(')') {
                    return Err(self.expected("')'"));
                }
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(start),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.name(start),
            Some(c) => Err(ExprError::UnexpectedChar {
                found: c,
                offset: start,
            }),
        }
    }

    fn number(&mut self, start: usize) -> Result<Expr, ExprError> {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        // Exponent, only when a digit follows so `2e` stays an error rather than `2*e`
        if matches!(self.peek(), Some('e' | 'E')) {
            let rest = &self.src[self.pos + 1..];
            let after_sign = rest.strip_prefix(['+', '-']).unwrap_or(rest);
            if after_sign.starts_with(|c: char| c.is_ascii_digit()) {
                self.pos += 1 + (rest.len() - after_sign.len());
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        let text = &self.src[start..self.pos];
        text.parse::<f64>()
            .map(Expr::Num)
            .map_err(|_| ExprError::InvalidNumber {
                text: text.to_string(),
                offset: start,
            })
    }

    fn name(&mut self, start: usize) -> Result<Expr, ExprError> {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.bump();
        }
        let src = self.src;
        let text = &src[start..self.pos];
        let unknown = || ExprError::UnknownName {
            name: text.to_string(),
            offset: start,
        };

        match lookup(text).ok_or_else(unknown)? {
            Name::Const(v) => Ok(Expr::Num(v)),
            Name::Var(v) => Ok(Expr::Var(v)),
            Name::Unary(f) => {
                let mut args = self.arguments(text, 1, start)?;
                let a = args.remove(0);
                Ok(Expr::Call1(f, Box::new(a)))
            }
            Name::Binary(f) => {
                let mut args = self.arguments(text, 2, start)?;
                let b = args.remove(1);
                let a = args.remove(0);
                Ok(Expr::Call2(f, Box::new(a), Box::new(b)))
            }
        }
    }

    fn arguments(
        &mut self,
        name: &str,
        expected: usize,
        offset: usize,
    ) -> Result<Vec<Expr>, ExprError> {
        if !self.eat('(') {
            return Err(self.expected("'('"));
        }
        let mut args = vec![self.expr()?];
        while self.eat(',') {
            args.push(self.expr()?);
        }
        if !self.eat(')') {
            return Err(self.expected("')'"));
        }
        if args.len() != expected {
            return Err(ExprError::Arity {
                name: name.to_string(),
                expected,
                found: args.len(),
                offset,
            });
        }
        Ok(args)
    }

    fn expected(&mut self, expected: &'static str) -> ExprError {
        self.skip_whitespace();
        if self.peek().is_none() {
            ExprError::UnexpectedEnd
        } else {
            ExprError::Expected {
                expected,
                offset: self.pos,
            }
        }
    }
}
