//! Expression parser
//!
//! ```text
//! expr    := or
//! or      := and ("||" and)*
//! and     := unary ("&&" unary)*
//! unary   := "!" unary | compare
//! compare := primary (("==" | "!=") primary)?
//! primary := "true" | "false" | string | ident | ident "(" args ")" | "(" expr ")"
//! ```
//!
//! Chains of `&&` or `||` parse to one node each. Parentheses, `!` and calls
//! nest at most [`MAX_NESTING`] deep.

use std::fmt;

/// Deepest nesting of parentheses, negations and calls an expression may use.
pub(crate) const MAX_NESTING: usize = 64;

/// Functions an expression may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    /// `reachable(graph, a, b)`: chain of friendships of any length
    Reachable,
    /// `declares(graph, a, b)`: `a` itself lists `b` as a friend
    Declares,
    /// `friends_of(graph, a)`: undirected neighbors of `a`
    FriendsOf,
    /// `contains(list, x)`
    Contains,
}

impl Builtin {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "reachable" => Some(Self::Reachable),
            "declares" => Some(Self::Declares),
            "friends_of" => Some(Self::FriendsOf),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Reachable => "reachable",
            Self::Declares => "declares",
            Self::FriendsOf => "friends_of",
            Self::Contains => "contains",
        }
    }

    fn arity(self) -> usize {
        match self {
            Self::Reachable | Self::Declares => 3,
            Self::FriendsOf | Self::Contains => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expr {
    Bool(bool),
    Text(String),
    Binding(String),
    Not(Box<Expr>),
    All(Vec<Expr>),
    Any(Vec<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Call(Builtin, Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    True,
    False,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "`{name}`"),
            Token::Str(value) => write!(f, "{value:?}"),
            Token::True => f.write_str("`true`"),
            Token::False => f.write_str("`false`"),
            Token::EqEq => f.write_str("`==`"),
            Token::NotEq => f.write_str("`!=`"),
            Token::AndAnd => f.write_str("`&&`"),
            Token::OrOr => f.write_str("`||`"),
            Token::Bang => f.write_str("`!`"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::Comma => f.write_str("`,`"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '=' if chars.next_if(|&(_, c)| c == '=').is_some() => Token::EqEq,
            '!' if chars.next_if(|&(_, c)| c == '=').is_some() => Token::NotEq,
            '!' => Token::Bang,
            '&' if chars.next_if(|&(_, c)| c == '&').is_some() => Token::AndAnd,
            '|' if chars.next_if(|&(_, c)| c == '|').is_some() => Token::OrOr,
            '"' | '\'' => {
                let quote = c;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => value.push(c),
                        None => return Err(format!("unterminated string starting at {offset}")),
                    }
                }
                Token::Str(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = c.to_string();
                while let Some((_, c)) = chars.next_if(|&(_, c)| c.is_alphanumeric() || c == '_') {
                    word.push(c);
                }
                match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word),
                }
            }
            other => return Err(format!("unexpected {other:?} at {offset}")),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, String>,
    ) -> Result<T, String> {
        if self.depth >= MAX_NESTING {
            return Err(format!("expression nests deeper than {MAX_NESTING} levels"));
        }
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }

    fn or(&mut self) -> Result<Expr, String> {
        let mut options = vec![self.and()?];
        while self.eat(&Token::OrOr) {
            options.push(self.and()?);
        }
        Ok(if options.len() == 1 {
            options.remove(0)
        } else {
            Expr::Any(options)
        })
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut parts = vec![self.unary()?];
        while self.eat(&Token::AndAnd) {
            parts.push(self.unary()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Expr::All(parts)
        })
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Bang) {
            return self.nested(|p| Ok(Expr::Not(Box::new(p.unary()?))));
        }
        self.compare()
    }

    fn compare(&mut self) -> Result<Expr, String> {
        let left = self.primary()?;
        if self.eat(&Token::EqEq) {
            Ok(Expr::Eq(Box::new(left), Box::new(self.primary()?)))
        } else if self.eat(&Token::NotEq) {
            Ok(Expr::Ne(Box::new(left), Box::new(self.primary()?)))
        } else {
            Ok(left)
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Str(value)) => Ok(Expr::Text(value)),
            Some(Token::LParen) => {
                let inner = self.nested(Self::or)?;
                if !self.eat(&Token::RParen) {
                    return Err("expected `)`".to_string());
                }
                Ok(inner)
            }
            Some(Token::Ident(name)) if self.peek() == Some(&Token::LParen) => {
                self.nested(|p| p.call(&name))
            }
            Some(Token::Ident(name)) => Ok(Expr::Binding(name)),
            Some(token) => Err(format!("unexpected {token}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn call(&mut self, name: &str) -> Result<Expr, String> {
        let builtin = Builtin::lookup(name).ok_or_else(|| format!("unknown function `{name}`"))?;
        self.position += 1;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.or()?);
                if self.eat(&Token::RParen) {
                    break;
                }
                if !self.eat(&Token::Comma) {
                    return Err(format!("expected `,` or `)` in call to `{name}`"));
                }
            }
        }

        if args.len() != builtin.arity() {
            return Err(format!(
                "`{name}` takes {} arguments, got {}",
                builtin.arity(),
                args.len()
            ));
        }
        Ok(Expr::Call(builtin, args))
    }
}

/// Parse one boolean expression.
pub(crate) fn parse_expression(source: &str) -> Result<Expr, String> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        position: 0,
        depth: 0,
    };
    let expr = parser.or()?;
    match parser.advance() {
        None => Ok(expr),
        Some(token) => Err(format!("unexpected {token} after expression")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str) -> Box<Expr> {
        Box::new(Expr::Binding(name.to_string()))
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            parse_expression("actor == owner").unwrap(),
            Expr::Eq(binding("actor"), binding("owner"))
        );
    }

    #[test]
    fn test_precedence() {
        let expr = parse_expression("!a == b || c && d").unwrap();
        assert_eq!(
            expr,
            Expr::Any(vec![
                Expr::Not(Box::new(Expr::Eq(binding("a"), binding("b")))),
                Expr::All(vec![*binding("c"), *binding("d")]),
            ])
        );
    }

    #[test]
    fn test_calls_and_literals() {
        let expr = parse_expression("contains(friends_of(friends, actor), 'Bob') != false").unwrap();
        let Expr::Ne(call, literal) = expr else {
            panic!("expected `!=`");
        };
        assert_eq!(*literal, Expr::Bool(false));
        assert!(matches!(*call, Expr::Call(Builtin::Contains, ref args) if args.len() == 2));
    }

    #[test]
    fn test_rejections() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("actor ==").is_err());
        assert!(parse_expression("actor = owner").is_err());
        assert!(parse_expression("escalate(actor)").is_err());
        assert!(parse_expression("reachable(friends, actor)").is_err());
        assert!(parse_expression("(actor == owner").is_err());
        assert!(parse_expression("actor owner").is_err());
        assert!(parse_expression("\"open").is_err());
    }

    #[test]
    fn test_long_chains_stay_flat() {
        let source = vec!["actor == owner"; 5_000].join(" || ");
        let Expr::Any(options) = parse_expression(&source).unwrap() else {
            panic!("expected `||`");
        };
        assert_eq!(options.len(), 5_000);
    }

    #[test]
    fn test_nesting_is_capped() {
        let within = format!("{}true{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse_expression(&within).is_ok());

        let deep = 100_000;
        let parens = format!("{}true{}", "(".repeat(deep), ")".repeat(deep));
        assert!(parse_expression(&parens).unwrap_err().contains("nests deeper"));
        assert!(parse_expression(&"!".repeat(deep)).unwrap_err().contains("nests deeper"));
        let calls = format!("{}x{}", "contains(".repeat(deep), ", x)".repeat(deep));
        assert!(parse_expression(&calls).is_err());
    }
}
