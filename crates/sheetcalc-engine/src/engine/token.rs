//! Formula tokenizer.
//!
//! Splits formula text into parentheses, the four arithmetic operators,
//! identifiers and unsigned numeric literals. Whitespace only separates
//! tokens and is never emitted. Text that matches none of the recognized
//! patterns is surfaced as [`TokenKind::Unrecognized`] so the parser can
//! reject it instead of silently dropping it.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// One of the four binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// Apply the operator with IEEE-754 semantics. Division by zero is the
    /// evaluator's concern, not this function's.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Sub => left - right,
            Operator::Mul => left * right,
            Operator::Div => left / right,
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operator::Mul | Operator::Div)
    }

    fn from_symbol(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Semantic kind of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Identifier,
    Operator(Operator),
    LeftParen,
    RightParen,
    Unrecognized,
}

/// A token borrowed from the formula text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl Token<'_> {
    /// Number, identifier, or `(`: what may start an operand.
    pub fn starts_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number | TokenKind::Identifier | TokenKind::LeftParen
        )
    }

    /// Number, identifier, or `)`: what may end an operand.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number | TokenKind::Identifier | TokenKind::RightParen
        )
    }
}

/// Lazily tokenize `input`. The returned iterator is cheap to clone, so a
/// token stream can be restarted from any point.
pub fn tokenize(input: &str) -> Tokens<'_> {
    Tokens { input, pos: 0 }
}

/// Iterator over the tokens of a formula string.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while self.pos < self.input.len() {
            let Some(m) = token_re().find_at(self.input, self.pos) else {
                // Trailing garbage with no recognizable token after it.
                let text = &self.input[self.pos..];
                self.pos = self.input.len();
                return Some(Token {
                    kind: TokenKind::Unrecognized,
                    text,
                });
            };

            if m.start() > self.pos {
                let text = &self.input[self.pos..m.start()];
                self.pos = m.start();
                return Some(Token {
                    kind: TokenKind::Unrecognized,
                    text,
                });
            }

            self.pos = m.end();
            let text = m.as_str();
            if let Some(kind) = classify(text) {
                return Some(Token { kind, text });
            }
        }
        None
    }
}

/// Classify a regex match; `None` for whitespace.
fn classify(text: &str) -> Option<TokenKind> {
    let first = text.chars().next()?;
    let kind = match first {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        c if c.is_whitespace() => return None,
        c if c.is_ascii_alphabetic() || c == '_' => TokenKind::Identifier,
        c => match Operator::from_symbol(c) {
            Some(op) => TokenKind::Operator(op),
            None => TokenKind::Number,
        },
    };
    Some(kind)
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            \( | \) | [+\-*/]
            | [a-zA-Z_][a-zA-Z_0-9]*
            | (?: [0-9]+\.[0-9]* | [0-9]*\.[0-9]+ | [0-9]+ ) (?: [eE][+-]?[0-9]+ )?
            | \s+
            ",
        )
        .expect("formula token regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        tokenize(input).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_tokenize_simple_expression() {
        assert_eq!(
            kinds("x1 + 2.5*(y)"),
            vec![
                (TokenKind::Identifier, "x1"),
                (TokenKind::Operator(Operator::Add), "+"),
                (TokenKind::Number, "2.5"),
                (TokenKind::Operator(Operator::Mul), "*"),
                (TokenKind::LeftParen, "("),
                (TokenKind::Identifier, "y"),
                (TokenKind::RightParen, ")"),
            ]
        );
    }

    #[test]
    fn test_tokenize_numeric_forms() {
        for literal in ["10", "10.", ".5", "10.000", "1e3", "1E-3", "2.5e+10"] {
            assert_eq!(kinds(literal), vec![(TokenKind::Number, literal)]);
        }
    }

    #[test]
    fn test_tokenize_no_unary_sign() {
        assert_eq!(
            kinds("-5"),
            vec![
                (TokenKind::Operator(Operator::Sub), "-"),
                (TokenKind::Number, "5"),
            ]
        );
    }

    #[test]
    fn test_tokenize_number_then_identifier() {
        assert_eq!(
            kinds("2x"),
            vec![(TokenKind::Number, "2"), (TokenKind::Identifier, "x")]
        );
    }

    #[test]
    fn test_tokenize_surfaces_unrecognized_text() {
        assert_eq!(
            kinds("a $# b"),
            vec![
                (TokenKind::Identifier, "a"),
                (TokenKind::Unrecognized, "$#"),
                (TokenKind::Identifier, "b"),
            ]
        );
        assert_eq!(kinds("1 %"), vec![(TokenKind::Number, "1"), (TokenKind::Unrecognized, "%")]);
    }

    #[test]
    fn test_tokenize_whitespace_only() {
        assert!(tokenize("").next().is_none());
        assert!(tokenize(" \t\n ").next().is_none());
    }

    #[test]
    fn test_tokens_restartable() {
        let mut tokens = tokenize("a+b");
        tokens.next();
        let rest: Vec<_> = tokens.clone().map(|t| t.text).collect();
        assert_eq!(rest, vec!["+", "b"]);
        assert_eq!(tokens.count(), 2);
    }
}
