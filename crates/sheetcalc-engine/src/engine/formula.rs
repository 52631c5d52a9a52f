//! Infix formulas: grammar validation and canonical form.
//!
//! A [`Formula`] is built from text, a variable normalizer and a variable
//! validator. Construction enforces the infix grammar, rewrites every
//! variable to its normalized form and every number to a canonical decimal
//! rendering, and records the set of referenced variables. The result is
//! immutable.
//!
//! Two formulas are equal when their canonical token sequences match, so
//! `"x + 1"`, `"x+1.0"` and `"x+1e0"` all compare (and hash) equal.

use log::trace;
use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

use super::eval::{FormulaError, evaluate};
use super::name::is_legal_name;
use super::token::{Operator, Token, TokenKind, tokenize};

/// A formula that violates the infix grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("formula has no tokens")]
    Empty,

    #[error("formula must start with a number, a variable, or '(' (found '{0}')")]
    InvalidStart(String),

    #[error("formula must end with a number, a variable, or ')' (found '{0}')")]
    InvalidEnd(String),

    #[error("'{found}' cannot follow '{after}': expected a number, a variable, or '('")]
    ExpectedOperand { after: String, found: String },

    #[error("'{found}' cannot follow '{after}': expected an operator or ')'")]
    ExpectedOperator { after: String, found: String },

    #[error("')' at token {position} has no matching '('")]
    UnmatchedRightParen { position: usize },

    #[error("unbalanced parentheses: {open} '(' but {close} ')'")]
    Unbalanced { open: usize, close: usize },

    #[error("invalid variable '{0}'")]
    InvalidVariable(String),

    #[error("unrecognized token '{0}'")]
    Unrecognized(String),

    #[error("numeric literal '{0}' is out of range")]
    NumberOutOfRange(String),
}

/// One canonical token of a validated formula.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Term {
    Number(f64),
    Variable(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl Term {
    fn write_canonical(&self, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = match self {
            Term::Number(n) => write!(out, "{}", n),
            Term::Variable(name) => write!(out, "{}", name),
            Term::Operator(op) => write!(out, "{}", op),
            Term::LeftParen => write!(out, "("),
            Term::RightParen => write!(out, ")"),
        };
    }
}

/// An immutable, validated infix formula.
#[derive(Clone, Debug)]
pub struct Formula {
    terms: Vec<Term>,
    canonical: String,
    variables: HashSet<String>,
}

impl Formula {
    /// Parse `text` into a formula.
    ///
    /// Every variable `v` is replaced by `normalize(v)`; the normalized name
    /// must itself be a legal variable and satisfy `is_valid`, otherwise
    /// [`FormatError::InvalidVariable`] names the offending token.
    pub fn new<N, V>(text: &str, normalize: N, is_valid: V) -> Result<Formula, FormatError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let tokens: Vec<Token<'_>> = tokenize(text).collect();

        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return Err(FormatError::Empty);
        };
        if !first.starts_operand() {
            return Err(FormatError::InvalidStart(first.text.to_string()));
        }
        if !last.ends_operand() {
            return Err(FormatError::InvalidEnd(last.text.to_string()));
        }

        let mut open = 0usize;
        let mut close = 0usize;
        let mut terms = Vec::with_capacity(tokens.len());
        let mut canonical = String::with_capacity(text.len());
        let mut variables = HashSet::new();

        for (position, token) in tokens.iter().enumerate() {
            let next = tokens.get(position + 1);
            let term = match token.kind {
                TokenKind::LeftParen => {
                    open += 1;
                    expect_operand(token, next)?;
                    Term::LeftParen
                }
                TokenKind::RightParen => {
                    close += 1;
                    expect_operator(token, next)?;
                    Term::RightParen
                }
                TokenKind::Operator(op) => {
                    expect_operand(token, next)?;
                    Term::Operator(op)
                }
                TokenKind::Number => {
                    expect_operator(token, next)?;
                    Term::Number(parse_number(token.text)?)
                }
                TokenKind::Identifier => {
                    expect_operator(token, next)?;
                    let name = normalize(token.text);
                    if !is_legal_name(&name) || !is_valid(&name) {
                        return Err(FormatError::InvalidVariable(token.text.to_string()));
                    }
                    variables.insert(name.clone());
                    Term::Variable(name)
                }
                TokenKind::Unrecognized => {
                    return Err(FormatError::Unrecognized(token.text.to_string()));
                }
            };

            if close > open {
                return Err(FormatError::UnmatchedRightParen { position });
            }

            term.write_canonical(&mut canonical);
            terms.push(term);
        }

        if open != close {
            return Err(FormatError::Unbalanced { open, close });
        }

        trace!("parsed formula {:?} as {}", text, canonical);
        Ok(Formula {
            terms,
            canonical,
            variables,
        })
    }

    /// The distinct normalized variables referenced by this formula.
    pub fn variables(&self) -> &HashSet<String> {
        &self.variables
    }

    /// The canonical, whitespace-free text of this formula.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Evaluate the formula, resolving variables through `lookup`.
    ///
    /// `lookup` returns `None` for a variable without a numeric value. This
    /// never panics on a validated formula: undefined variables and division
    /// by zero come back as a [`FormulaError`].
    pub fn evaluate<F>(&self, lookup: F) -> Result<f64, FormulaError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        evaluate(&self.terms, lookup)
    }
}

/// The token after an operand (number, variable, `)`) must be an operator or `)`.
fn expect_operator(token: &Token<'_>, next: Option<&Token<'_>>) -> Result<(), FormatError> {
    match next {
        Some(n) if !matches!(n.kind, TokenKind::Operator(_) | TokenKind::RightParen) => {
            Err(FormatError::ExpectedOperator {
                after: token.text.to_string(),
                found: n.text.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// The token after `(` or an operator must start an operand.
fn expect_operand(token: &Token<'_>, next: Option<&Token<'_>>) -> Result<(), FormatError> {
    match next {
        Some(n) if !n.starts_operand() => Err(FormatError::ExpectedOperand {
            after: token.text.to_string(),
            found: n.text.to_string(),
        }),
        _ => Ok(()),
    }
}

fn parse_number(text: &str) -> Result<f64, FormatError> {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(FormatError::NumberOutOfRange(text.to_string())),
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Formula {
    type Err = FormatError;

    /// Parse with the identity normalizer and a validator that accepts every
    /// legal variable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::new(s, |v| v.to_string(), |_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;

    fn upper(s: &str) -> String {
        s.to_ascii_uppercase()
    }

    /// One letter followed by one digit.
    fn letter_digit(s: &str) -> bool {
        let b = s.as_bytes();
        b.len() == 2 && b[0].is_ascii_alphabetic() && b[1].is_ascii_digit()
    }

    fn hash_of(f: &Formula) -> u64 {
        let mut hasher = DefaultHasher::new();
        f.hash(&mut hasher);
        hasher.finish()
    }

    fn parse(s: &str) -> Formula {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalizer_and_validator() {
        assert!(Formula::new("x2+y3", upper, letter_digit).is_ok());
        assert_eq!(
            Formula::new("x+y3", upper, letter_digit),
            Err(FormatError::InvalidVariable("x".to_string()))
        );
        assert!(Formula::new("2x+y3", upper, letter_digit).is_err());
    }

    #[test]
    fn test_normalized_form_must_be_legal() {
        let result = Formula::new("a1", |_| "1a".to_string(), |_| true);
        assert_eq!(result, Err(FormatError::InvalidVariable("a1".to_string())));
    }

    #[test]
    fn test_canonical_string() {
        assert_eq!(Formula::new("x + y", upper, |_| true).unwrap().to_string(), "X+Y");
        assert_eq!(parse("x + Y").to_string(), "x+Y");
        assert_eq!(parse("1e3 * ( 2.50 )").to_string(), "1000*(2.5)");
    }

    #[test]
    fn test_equality() {
        assert_eq!(Formula::new("x1+y2", upper, |_| true).unwrap(), parse("X1  +  Y2"));
        assert_ne!(parse("x1+y2"), parse("X1+Y2"));
        assert_ne!(parse("x1+y2"), parse("y2+x1"));
        assert_eq!(parse("2.0 + x7"), parse("2.000 + x7"));
    }

    #[test]
    fn test_numeric_spellings_hash_equal() {
        let forms = ["10", "10.000", "1e1", "10.", "100e-1"];
        let first = parse(forms[0]);
        for form in &forms[1..] {
            let other = parse(form);
            assert_eq!(first, other);
            assert_eq!(hash_of(&first), hash_of(&other));
        }
    }

    #[test]
    fn test_variables_collapse_duplicates() {
        let f = Formula::new("x+y*z", upper, |_| true).unwrap();
        let mut vars: Vec<_> = f.variables().iter().cloned().collect();
        vars.sort();
        assert_eq!(vars, vec!["X", "Y", "Z"]);

        let f = Formula::new("x+X*z", upper, |_| true).unwrap();
        assert_eq!(f.variables().len(), 2);

        let f = parse("x+X*z");
        assert_eq!(f.variables().len(), 3);
    }

    #[test]
    fn test_no_variables() {
        assert!(parse("1 + 2").variables().is_empty());
    }

    #[test]
    fn test_one_token_rule() {
        assert_eq!("".parse::<Formula>(), Err(FormatError::Empty));
        assert_eq!("   ".parse::<Formula>(), Err(FormatError::Empty));
    }

    #[test]
    fn test_start_and_end_rules() {
        assert!(matches!("+1".parse::<Formula>(), Err(FormatError::InvalidStart(_))));
        assert!(matches!(")1".parse::<Formula>(), Err(FormatError::InvalidStart(_))));
        assert!(matches!("1+".parse::<Formula>(), Err(FormatError::InvalidEnd(_))));
        assert!(matches!("(1".parse::<Formula>(), Err(FormatError::InvalidEnd(_))));
    }

    #[test]
    fn test_following_rules() {
        assert!(matches!(
            "(+1)".parse::<Formula>(),
            Err(FormatError::ExpectedOperand { .. })
        ));
        assert!(matches!(
            "1+*2".parse::<Formula>(),
            Err(FormatError::ExpectedOperand { .. })
        ));
        assert!(matches!(
            "()".parse::<Formula>(),
            Err(FormatError::ExpectedOperand { .. })
        ));
        assert!(matches!(
            "1 2".parse::<Formula>(),
            Err(FormatError::ExpectedOperator { .. })
        ));
        assert!(matches!(
            "x (1)".parse::<Formula>(),
            Err(FormatError::ExpectedOperator { .. })
        ));
        assert!(matches!(
            "(1)(2)".parse::<Formula>(),
            Err(FormatError::ExpectedOperator { .. })
        ));
    }

    #[test]
    fn test_parenthesis_rules() {
        assert_eq!(
            "1)+(2".parse::<Formula>(),
            Err(FormatError::UnmatchedRightParen { position: 1 })
        );
        assert_eq!(
            "((1+2)".parse::<Formula>(),
            Err(FormatError::Unbalanced { open: 2, close: 1 })
        );
    }

    #[test]
    fn test_unrecognized_token_rejected() {
        assert!("1 + $".parse::<Formula>().is_err());
        assert!("$".parse::<Formula>().is_err());
        assert!("1 & 2".parse::<Formula>().is_err());
    }

    #[test]
    fn test_number_out_of_range() {
        assert_eq!(
            "1e400".parse::<Formula>(),
            Err(FormatError::NumberOutOfRange("1e400".to_string()))
        );
    }

    #[test]
    fn test_round_trip_examples() {
        for text in ["x+1", "(a1 - 2.5e2) / _b * 3", "((((x))))", "1.5e-7"] {
            let f = Formula::new(text, upper, |_| true).unwrap();
            let again = Formula::new(&f.to_string(), upper, |_| true).unwrap();
            assert_eq!(f, again);
        }
    }

    fn operand() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z_][a-zA-Z0-9_]{0,3}",
            (0u32..100_000).prop_map(|n| n.to_string()),
            (0u32..1000, 0u32..1000).prop_map(|(a, b)| format!("{a}.{b}")),
            (1u32..100, 0i32..20).prop_map(|(m, e)| format!("{m}e{e}")),
        ]
    }

    fn expression() -> impl Strategy<Value = String> {
        operand().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                (inner.clone(), "[+*/-]", inner.clone()).prop_map(|(l, op, r)| format!("{l}{op}{r}")),
                inner.prop_map(|e| format!("({e})")),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_canonical_round_trip(text in expression()) {
            let f = Formula::new(&text, upper, |_| true).unwrap();
            let again = Formula::new(&f.to_string(), upper, |_| true).unwrap();
            prop_assert_eq!(&f, &again);
            prop_assert_eq!(hash_of(&f), hash_of(&again));
        }

        #[test]
        fn prop_whitespace_insensitive(text in expression()) {
            let spaced: String = tokenize(&text).map(|t| format!(" {} ", t.text)).collect();
            prop_assert_eq!(parse(&text), parse(&spaced));
        }
    }
}
