//! Scientific Calculator Tool
//!
//! Evaluates arithmetic expressions with scientific functions and constants.
//! Nothing is executed beyond the grammar below.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := number | ident | ident '(' expr (',' expr)* ')' | '(' expr ')'
//! ```

use async_trait::async_trait;

use agent_core::{
    ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::error::{Result, ToolError};

pub const TOOL_NAME: &str = "calculator";

/// Longest expression accepted, in bytes
const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest nesting of parentheses, calls and unary signs
const MAX_DEPTH: usize = 64;

/// Tool for evaluating mathematical expressions
#[derive(Debug, Default, Clone, Copy)]
pub struct CalculatorTool;

impl CalculatorTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Performs complex mathematical calculations. Supports + - * / % and ^ (or **), \
                parentheses, constants pi and e, and the functions sqrt, sin, cos, tan, asin, acos, atan, \
                log (base 10, or log(x, base)), ln, exp, abs, round, floor, ceil, min, max and pow. \
                Examples: '2 + 2', 'sqrt(16)', 'sin(pi/2)', 'log(100, 10)'."
                .into(),
            parameters: vec![ParameterSchema::required_string(
                "expression",
                "Mathematical expression to evaluate",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let expression = call.str_arg("expression").unwrap_or_default();

        match evaluate(expression) {
            Ok(value) => Ok(ToolResult::success(TOOL_NAME, format_number(value))),
            Err(e) => Ok(ToolResult::failure(TOOL_NAME, e.to_string())),
        }
    }
}

/// Evaluate an expression to a finite number
pub fn evaluate(expression: &str) -> Result<f64> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(ToolError::calc(format!(
            "expression is longer than {MAX_EXPRESSION_LEN} bytes"
        )));
    }

    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ToolError::calc("empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(ToolError::calc(format!("unexpected '{token}'")));
    }
    if !value.is_finite() {
        return Err(ToolError::calc("result is not a finite number"));
    }
    Ok(value)
}

/// Integers print without a fractional part; everything else as-is
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    Pow,
    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Ident(name) => f.write_str(name),
            Self::Op(c) => write!(f, "{c}"),
            Self::Pow => f.write_str("**"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Comma => f.write_str(","),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Scientific notation: 1e-3, 2.5E10
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ToolError::calc(format!("invalid number '{literal}'")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '^' => {
                tokens.push(Token::Pow);
                i += 1;
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            other => return Err(ToolError::calc(format!("unsupported character '{other}'"))),
        }
    }

    Ok(tokens)
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

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.next() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(ToolError::calc(format!(
                "expected '{expected}' but found '{token}'"
            ))),
            None => Err(ToolError::calc(format!("expected '{expected}'"))),
        }
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                '*' => value * rhs,
                _ if rhs == 0.0 => return Err(ToolError::calc("division by zero")),
                '/' => value / rhs,
                // Python-style modulo: result takes the sign of the divisor
                _ => value - rhs * (value / rhs).floor(),
            };
        }
        Ok(value)
    }

    // Every recursive path passes through here
    fn unary(&mut self) -> Result<f64> {
        if self.depth >= MAX_DEPTH {
            return Err(ToolError::calc("expression nested too deeply"));
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let args = self.arguments()?;
                    apply_function(&name, &args)
                } else {
                    constant(&name)
                }
            }
            Some(token) => Err(ToolError::calc(format!("unexpected '{token}'"))),
            None => Err(ToolError::calc("unexpected end of expression")),
        }
    }

    fn arguments(&mut self) -> Result<Vec<f64>> {
        let mut args = vec![self.expr()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            args.push(self.expr()?);
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }
}

fn constant(name: &str) -> Result<f64> {
    match name {
        "pi" => Ok(std::f64::consts::PI),
        "e" => Ok(std::f64::consts::E),
        "tau" => Ok(std::f64::consts::TAU),
        _ => Err(ToolError::calc(format!("unknown name '{name}'"))),
    }
}

fn apply_function(name: &str, args: &[f64]) -> Result<f64> {
    let one = |f: fn(f64) -> f64| -> Result<f64> {
        match args {
            [x] => Ok(f(*x)),
            _ => Err(ToolError::calc(format!("{name}() takes exactly one argument"))),
        }
    };

    match name {
        "sqrt" => match args {
            [x] if *x < 0.0 => Err(ToolError::calc("math domain error")),
            _ => one(f64::sqrt),
        },
        "sin" => one(f64::sin),
        "cos" => one(f64::cos),
        "tan" => one(f64::tan),
        "asin" => one(f64::asin),
        "acos" => one(f64::acos),
        "atan" => one(f64::atan),
        "exp" => one(f64::exp),
        "abs" => one(f64::abs),
        "round" => one(f64::round),
        "floor" => one(f64::floor),
        "ceil" => one(f64::ceil),
        "ln" => match args {
            [x] if *x <= 0.0 => Err(ToolError::calc("math domain error")),
            _ => one(f64::ln),
        },
        "log" => match args {
            [x] | [x, _] if *x <= 0.0 => Err(ToolError::calc("math domain error")),
            [x] => Ok(x.log10()),
            [x, base] if *base > 0.0 && (*base - 1.0).abs() > f64::EPSILON => Ok(x.log(*base)),
            [_, _] => Err(ToolError::calc("math domain error")),
            _ => Err(ToolError::calc("log() takes one or two arguments")),
        },
        "pow" => match args {
            [base, exponent] => Ok(base.powf(*exponent)),
            _ => Err(ToolError::calc("pow() takes exactly two arguments")),
        },
        "min" => Ok(args.iter().copied().fold(f64::INFINITY, f64::min)),
        "max" => Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        _ => Err(ToolError::calc(format!("unknown function '{name}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(expression: &str, expected: f64) {
        let value = evaluate(expression).unwrap();
        assert!(
            (value - expected).abs() < 1e-9,
            "{expression} = {value}, expected {expected}"
        );
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        approx("2 + 2", 4.0);
        approx("2 + 3 * 4", 14.0);
        approx("(2 + 3) * 4", 20.0);
        approx("10 / 4", 2.5);
        approx("2 ^ 8", 256.0);
        approx("2 ** 3 ** 2", 512.0);
        approx("-2 ^ 2", -4.0);
        approx("7 % 3", 1.0);
        approx("-7 % 3", 2.0);
        approx("1.5e3 + 1", 1501.0);
    }

    #[test]
    fn test_functions_and_constants() {
        approx("sqrt(16)", 4.0);
        approx("sin(pi/2)", 1.0);
        approx("sin(pi/2) + cos(0) + sqrt(16)", 6.0);
        approx("log(100)", 2.0);
        approx("log(8, 2)", 3.0);
        approx("ln(e)", 1.0);
        approx("exp(0)", 1.0);
        approx("max(1, 7, 3) - min(4, 2)", 5.0);
        approx("pow(3, 2)", 9.0);
        approx("abs(-3.5)", 3.5);
    }

    #[test]
    fn test_errors() {
        assert!(evaluate("").is_err());
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("sqrt(-1)").is_err());
        assert!(evaluate("log(0)").is_err());
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("foo(1)").is_err());
        assert!(evaluate("__import__('os')").is_err());
        assert!(evaluate("1 2").is_err());
    }

    #[test]
    fn test_nesting_is_bounded() {
        let shallow = format!("{}1{}", "(".repeat(30), ")".repeat(30));
        approx(&shallow, 1.0);

        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        let err = evaluate(&deep).unwrap_err();
        assert_eq!(err.to_string(), "Calculation error: expression nested too deeply");

        assert!(evaluate(&format!("{}1", "-".repeat(200))).is_err());
        assert!(evaluate(&format!("{}1{}", "sqrt(".repeat(80), ")".repeat(80))).is_err());
    }

    #[tokio::test]
    async fn test_huge_expression_fails_cleanly() {
        let expression = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let call = ToolCall::new(TOOL_NAME).with_argument("expression", serde_json::json!(expression));
        let result = CalculatorTool.execute(&call).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("longer than"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[tokio::test]
    async fn test_tool_execution() {
        let call = ToolCall::new(TOOL_NAME).with_argument("expression", serde_json::json!("2+2"));
        let result = CalculatorTool.execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "4");

        let call = ToolCall::new(TOOL_NAME).with_argument("expression", serde_json::json!("1/0"));
        let result = CalculatorTool.execute(&call).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.output, "Calculation error: division by zero");
    }
}
