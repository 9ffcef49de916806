use super::{CmpOp, Expr, ExprAnd, ExprCmp, ExprNot, ExprOr};
use crate::{Error, Path, Result, Value};

impl Expr {
    /// Parses an expression from its textual form.
    ///
    /// Grammar, loosest binding first: `or` / `||`, `and` / `&&`,
    /// `!` / `not`, comparison, then literals, parenthesized groups,
    /// and property paths.
    pub fn parse(src: &str) -> Result<Expr> {
        let tokens = tokenize(src)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.or_expr()?;

        if parser.pos != parser.tokens.len() {
            return Err(Error::expression(format!(
                "unexpected trailing input in expression `{src}`"
            )));
        }

        Ok(expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Path(String),
    Num(String),
    Str(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Cmp(CmpOp),
    LParen,
    RParen,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut operands = vec![self.and_expr()?];

        while self.peek() == Some(&Token::Or) {
            self.bump();
            operands.push(self.and_expr()?);
        }

        if operands.len() == 1 {
            Ok(operands.pop().unwrap())
        } else {
            Ok(ExprOr { operands }.into())
        }
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut operands = vec![self.not_expr()?];

        while self.peek() == Some(&Token::And) {
            self.bump();
            operands.push(self.not_expr()?);
        }

        if operands.len() == 1 {
            Ok(operands.pop().unwrap())
        } else {
            Ok(ExprAnd { operands }.into())
        }
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Not) {
            self.bump();
            let expr = self.not_expr()?;
            return Ok(ExprNot {
                expr: Box::new(expr),
            }
            .into());
        }

        self.cmp_expr()
    }

    fn cmp_expr(&mut self) -> Result<Expr> {
        let lhs = self.operand()?;

        if let Some(Token::Cmp(op)) = self.peek() {
            let op = *op;
            self.bump();
            let rhs = self.operand()?;
            return Ok(ExprCmp {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            }
            .into());
        }

        Ok(lhs)
    }

    fn operand(&mut self) -> Result<Expr> {
        match self.bump() {
            Some(Token::Null) => Ok(Expr::Value(Value::Null)),
            Some(Token::True) => Ok(Expr::Value(Value::Bool(true))),
            Some(Token::False) => Ok(Expr::Value(Value::Bool(false))),
            Some(Token::Str(s)) => Ok(Expr::Value(Value::String(s))),
            Some(Token::Num(n)) => {
                if n.contains('.') {
                    Ok(Expr::Value(Value::F64(n.parse::<f64>()?)))
                } else {
                    Ok(Expr::Value(Value::I64(n.parse::<i64>()?)))
                }
            }
            Some(Token::Path(p)) => Ok(Expr::Path(Path::parse(&p)?)),
            Some(Token::LParen) => {
                let expr = self.or_expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(Error::expression("unbalanced parenthesis in expression")),
                }
            }
            other => Err(Error::expression(format!(
                "expected operand, found {other:?}"
            ))),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>> {
    let mut tokens = vec![];
    let mut chars = src.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '\'' | '"' => {
                let quote = ch;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => s.push(c),
                        None => {
                            return Err(Error::expression(format!(
                                "unterminated string literal in `{src}`"
                            )))
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            '=' => {
                chars.next();
                // `=` and `==` both mean equality
                if chars.peek() == Some(&'=') {
                    chars.next();
                }
                tokens.push(Token::Cmp(CmpOp::Eq));
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(CmpOp::Ne));
                } else {
                    tokens.push(Token::Not);
                }
            }
            '<' => {
                chars.next();
                match chars.peek() {
                    Some('=') => {
                        chars.next();
                        tokens.push(Token::Cmp(CmpOp::Le));
                    }
                    Some('>') => {
                        chars.next();
                        tokens.push(Token::Cmp(CmpOp::Ne));
                    }
                    _ => tokens.push(Token::Cmp(CmpOp::Lt)),
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(CmpOp::Ge));
                } else {
                    tokens.push(Token::Cmp(CmpOp::Gt));
                }
            }
            '&' => {
                chars.next();
                if chars.next() != Some('&') {
                    return Err(Error::expression(format!("stray `&` in `{src}`")));
                }
                tokens.push(Token::And);
            }
            '|' => {
                chars.next();
                if chars.next() != Some('|') {
                    return Err(Error::expression(format!("stray `|` in `{src}`")));
                }
                tokens.push(Token::Or);
            }
            c if c.is_ascii_digit() || c == '-' => {
                chars.next();
                let mut n = String::from(c);
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        n.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Num(n));
            }
            c if c.is_alphanumeric() || c == '_' || c == '$' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' || c == '[' || c == ']'
                    {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    _ => Token::Path(word),
                });
            }
            other => {
                return Err(Error::expression(format!(
                    "unexpected character `{other}` in `{src}`"
                )))
            }
        }
    }

    if tokens.is_empty() {
        return Err(Error::expression("empty expression"));
    }

    Ok(tokens)
}
