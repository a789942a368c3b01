//! Parser for the Horn-clause policy language
//!
//! ```text
//! program  := clause*
//! clause   := atom ("if" body)? ";"
//! body     := conj ("or" conj)*
//! conj     := literal ("and" literal)*
//! literal  := atom | term "=" term | "(" body ")"
//! atom     := ident "(" (term ("," term)*)? ")"
//! term     := ident | "_" | string
//! ```
//!
//! Unquoted identifiers in argument position are variables, quoted strings
//! are constants and `_` matches anything. `#` starts a line comment.
//! Disjunctions are normalized away: a clause whose body has N alternatives
//! becomes N clauses with the same head. Parentheses nest at most
//! [`MAX_NESTING`] deep and one clause expands to at most
//! [`MAX_ALTERNATIVES`] clauses.

use super::prover::{Atom, Clause, Literal, Term};

/// Deepest parenthesized body a clause may use.
pub(crate) const MAX_NESTING: usize = 64;

/// Most clauses a single source clause may expand into.
pub(crate) const MAX_ALTERNATIVES: usize = 256;

/// Parse failure with a 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub(crate) line: usize,
    pub(crate) message: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Wildcard,
    LParen,
    RParen,
    Comma,
    Semi,
    Equals,
    If,
    And,
    Or,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier `{name}`"),
            Token::Str(value) => format!("string {value:?}"),
            Token::Wildcard => "`_`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Semi => "`;`".to_string(),
            Token::Equals => "`=`".to_string(),
            Token::If => "`if`".to_string(),
            Token::And => "`and`".to_string(),
            Token::Or => "`or`".to_string(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while chars.next_if(|&c| c != '\n').is_some() {}
            }
            '(' | ')' | ',' | ';' | '=' => {
                chars.next();
                let token = match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    ';' => Token::Semi,
                    _ => Token::Equals,
                };
                tokens.push((token, line));
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    let next = match chars.next() {
                        Some('\\') => chars.next().filter(|&c| c != '\n'),
                        Some('"') => break,
                        other => other.filter(|&c| c != '\n'),
                    };
                    match next {
                        Some(c) => value.push(c),
                        None => {
                            return Err(SyntaxError {
                                line,
                                message: "unterminated string".to_string(),
                            })
                        }
                    }
                }
                tokens.push((Token::Str(value), line));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
                    word.push(c);
                }
                let token = match word.as_str() {
                    "_" => Token::Wildcard,
                    "if" => Token::If,
                    "and" => Token::And,
                    "or" => Token::Or,
                    _ => Token::Ident(word),
                };
                tokens.push((token, line));
            }
            other => {
                return Err(SyntaxError {
                    line,
                    message: format!("unexpected character {other:?}"),
                })
            }
        }
    }
    Ok(tokens)
}

/// Body expression before normalization.
enum Body {
    Literal(Literal),
    All(Vec<Body>),
    Any(Vec<Body>),
}

impl Body {
    /// Disjunctive normal form: each inner vector is one alternative.
    fn alternatives(self) -> Result<Vec<Vec<Literal>>, String> {
        let too_many = || format!("body expands to more than {MAX_ALTERNATIVES} alternatives");
        match self {
            Body::Literal(literal) => Ok(vec![vec![literal]]),
            Body::Any(options) => {
                let mut all = Vec::new();
                for option in options {
                    all.extend(option.alternatives()?);
                    if all.len() > MAX_ALTERNATIVES {
                        return Err(too_many());
                    }
                }
                Ok(all)
            }
            Body::All(parts) => {
                let mut acc = vec![Vec::new()];
                for part in parts {
                    let choices = part.alternatives()?;
                    if acc.len().saturating_mul(choices.len()) > MAX_ALTERNATIVES {
                        return Err(too_many());
                    }
                    acc = acc
                        .iter()
                        .flat_map(|prefix| {
                            choices.iter().map(move |choice| {
                                let mut combined: Vec<Literal> = prefix.clone();
                                combined.extend(choice.iter().cloned());
                                combined
                            })
                        })
                        .collect();
                }
                Ok(acc)
            }
        }
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    position: usize,
    fresh: usize,
    depth: usize,
}

impl Parser {
    fn line(&self) -> usize {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or(1, |(_, line)| *line)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).map(|(token, _)| token.clone());
        self.position += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.line(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), SyntaxError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                token.describe()
            ))),
            None => Err(self.error(format!("expected {}, found end of input", expected.describe()))),
        }
    }

    fn clause(&mut self) -> Result<Vec<Clause>, SyntaxError> {
        let head = match self.next() {
            Some(Token::Ident(name)) => self.atom(name)?,
            Some(token) => {
                return Err(self.error(format!(
                    "expected a rule head, found {}",
                    token.describe()
                )))
            }
            None => return Err(self.error("expected a rule head")),
        };

        let alternatives = if self.peek() == Some(&Token::If) {
            self.next();
            let body = self.body()?;
            body.alternatives().map_err(|message| self.error(message))?
        } else {
            vec![Vec::new()]
        };
        self.expect(Token::Semi)?;

        Ok(alternatives
            .into_iter()
            .map(|body| Clause {
                head: head.clone(),
                body,
            })
            .collect())
    }

    fn body(&mut self) -> Result<Body, SyntaxError> {
        let mut options = vec![self.conjunction()?];
        while self.peek() == Some(&Token::Or) {
            self.next();
            options.push(self.conjunction()?);
        }
        Ok(if options.len() == 1 {
            options.remove(0)
        } else {
            Body::Any(options)
        })
    }

    fn conjunction(&mut self) -> Result<Body, SyntaxError> {
        let mut parts = vec![self.literal()?];
        while self.peek() == Some(&Token::And) {
            self.next();
            parts.push(self.literal()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Body::All(parts)
        })
    }

    fn literal(&mut self) -> Result<Body, SyntaxError> {
        match self.next() {
            Some(Token::LParen) => {
                if self.depth >= MAX_NESTING {
                    return Err(self.error(format!(
                        "parentheses nest deeper than {MAX_NESTING} levels"
                    )));
                }
                self.depth += 1;
                let inner = self.body();
                self.depth -= 1;
                let inner = inner?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) if self.peek() == Some(&Token::LParen) => {
                Ok(Body::Literal(Literal::Call(self.atom(name)?)))
            }
            Some(token) => {
                let left = self.term_from(token)?;
                self.expect(Token::Equals)?;
                let right = self.term()?;
                Ok(Body::Literal(Literal::Unify(left, right)))
            }
            None => Err(self.error("expected a condition")),
        }
    }

    fn atom(&mut self, predicate: String) -> Result<Atom, SyntaxError> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.next();
        } else {
            loop {
                args.push(self.term()?);
                match self.next() {
                    Some(Token::Comma) => continue,
                    Some(Token::RParen) => break,
                    Some(token) => {
                        return Err(self.error(format!(
                            "expected `,` or `)`, found {}",
                            token.describe()
                        )))
                    }
                    None => return Err(self.error("unclosed argument list")),
                }
            }
        }
        Ok(Atom { predicate, args })
    }

    fn term(&mut self) -> Result<Term, SyntaxError> {
        match self.next() {
            Some(token) => self.term_from(token),
            None => Err(self.error("expected a term")),
        }
    }

    fn term_from(&mut self, token: Token) -> Result<Term, SyntaxError> {
        match token {
            Token::Ident(name) => Ok(Term::Var(name)),
            Token::Str(value) => Ok(Term::Const(value)),
            Token::Wildcard => {
                self.fresh += 1;
                Ok(Term::Var(format!("?{}", self.fresh)))
            }
            other => Err(self.error(format!("expected a term, found {}", other.describe()))),
        }
    }
}

/// Parse a program into clauses.
pub(crate) fn parse_program(source: &str) -> Result<Vec<Clause>, SyntaxError> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        position: 0,
        fresh: 0,
        depth: 0,
    };
    let mut clauses = Vec::new();
    while parser.peek().is_some() {
        clauses.extend(parser.clause()?);
    }
    Ok(clauses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Term {
        Term::Var(name.to_string())
    }

    #[test]
    fn test_fact_clause() {
        let clauses = parse_program("allow(user, user);").unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].head.args, vec![var("user"), var("user")]);
        assert!(clauses[0].body.is_empty());
    }

    #[test]
    fn test_or_splits_into_clauses() {
        let clauses =
            parse_program("connected(x, y) if friends(x, y) or friends(y, x);").unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[1].body.len(), 1);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let clauses = parse_program("p(x) if a(x) and b(x) or c(x);").unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].body.len(), 2);
        assert_eq!(clauses[1].body.len(), 1);
    }

    #[test]
    fn test_parenthesized_disjunction_distributes() {
        let clauses = parse_program("p(x) if (a(x) or b(x)) and c(x);").unwrap();
        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(|c| c.body.len() == 2));
    }

    #[test]
    fn test_unification_constants_and_wildcards() {
        let clauses =
            parse_program("# comment\nallow(p, _) if p = \"root\";").unwrap();
        let clause = &clauses[0];
        assert_eq!(clause.head.args[1], var("?1"));
        assert_eq!(
            clause.body,
            vec![Literal::Unify(var("p"), Term::Const("root".to_string()))]
        );
    }

    #[test]
    fn test_nesting_is_capped() {
        let within = format!(
            "p(x) if {}a(x){};",
            "(".repeat(MAX_NESTING),
            ")".repeat(MAX_NESTING)
        );
        assert_eq!(parse_program(&within).unwrap().len(), 1);

        let deep = 100_000;
        let source = format!("p(x) if {}a(x){};", "(".repeat(deep), ")".repeat(deep));
        let err = parse_program(&source).unwrap_err();
        assert!(err.message.contains("nest deeper"));
    }

    #[test]
    fn test_disjunctive_expansion_is_capped() {
        let group = "(a(x) or b(x))";
        let fits = format!("p(x) if {};", vec![group; 8].join(" and "));
        assert_eq!(parse_program(&fits).unwrap().len(), MAX_ALTERNATIVES);

        let explodes = format!("p(x) if {};", vec![group; 30].join(" and "));
        let err = parse_program(&explodes).unwrap_err();
        assert!(err.message.contains("alternatives"));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_program("allow(a, b);\nallow(a b);").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(parse_program("allow(a, b)").is_err());
        assert!(parse_program("allow(\"open);").is_err());
    }
}
