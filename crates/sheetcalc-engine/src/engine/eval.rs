//! Two-stack infix evaluation.
//!
//! Values and pending operators live on stacks local to a single call.
//! `*` and `/` are applied as soon as their right operand is known, `+` and
//! `-` are resolved left to right when the next additive operator or a `)`
//! arrives. Every division checks its divisor first, so division by zero is
//! reported as a [`FormulaError`] rather than producing an infinity.

use log::trace;
use thiserror::Error;

use super::formula::Term;
use super::token::Operator;

/// The reason a formula could not produce a number. This is a value stored
/// in cells and propagated through recalculation, not a failure of the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("Division by 0.")]
    DivisionByZero,

    #[error("Undefined variable.")]
    UndefinedVariable { name: String },
}

impl FormulaError {
    /// Human-readable explanation.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Pending {
    Op(Operator),
    LeftParen,
}

pub(crate) fn evaluate<F>(terms: &[Term], lookup: F) -> Result<f64, FormulaError>
where
    F: Fn(&str) -> Option<f64>,
{
    let mut values: Vec<f64> = Vec::new();
    let mut pending: Vec<Pending> = Vec::new();

    for term in terms {
        match term {
            Term::Number(n) => push_operand(*n, &mut values, &mut pending)?,
            Term::Variable(name) => {
                let Some(value) = lookup(name) else {
                    trace!("undefined variable {}", name);
                    return Err(FormulaError::UndefinedVariable { name: name.clone() });
                };
                push_operand(value, &mut values, &mut pending)?;
            }
            Term::Operator(op) if op.is_multiplicative() => pending.push(Pending::Op(*op)),
            Term::Operator(op) => {
                resolve_additive(&mut values, &mut pending)?;
                pending.push(Pending::Op(*op));
            }
            Term::LeftParen => pending.push(Pending::LeftParen),
            Term::RightParen => {
                resolve_additive(&mut values, &mut pending)?;
                if pending.last() == Some(&Pending::LeftParen) {
                    pending.pop();
                }
                if let Some(&Pending::Op(op)) = pending.last()
                    && op.is_multiplicative()
                {
                    pending.pop();
                    reduce(op, &mut values)?;
                }
            }
        }
    }

    match pending.pop() {
        None => Ok(pop(&mut values)),
        Some(Pending::Op(op)) => {
            reduce(op, &mut values)?;
            Ok(pop(&mut values))
        }
        Some(Pending::LeftParen) => unreachable!("validated formula has balanced parentheses"),
    }
}

/// Push a new operand, first applying a pending `*` or `/` against the
/// value below it.
fn push_operand(
    value: f64,
    values: &mut Vec<f64>,
    pending: &mut Vec<Pending>,
) -> Result<(), FormulaError> {
    if let Some(&Pending::Op(op)) = pending.last()
        && op.is_multiplicative()
    {
        pending.pop();
        let left = pop(values);
        values.push(apply(op, left, value)?);
    } else {
        values.push(value);
    }
    Ok(())
}

/// Resolve a pending `+` or `-` on top of the operator stack, if any.
fn resolve_additive(values: &mut Vec<f64>, pending: &mut Vec<Pending>) -> Result<(), FormulaError> {
    if let Some(&Pending::Op(op)) = pending.last()
        && !op.is_multiplicative()
    {
        pending.pop();
        reduce(op, values)?;
    }
    Ok(())
}

/// Pop two values, apply `op` (the lower value is the left operand) and push
/// the result.
fn reduce(op: Operator, values: &mut Vec<f64>) -> Result<(), FormulaError> {
    let right = pop(values);
    let left = pop(values);
    values.push(apply(op, left, right)?);
    Ok(())
}

fn apply(op: Operator, left: f64, right: f64) -> Result<f64, FormulaError> {
    if op == Operator::Div && right == 0.0 {
        return Err(FormulaError::DivisionByZero);
    }
    Ok(op.apply(left, right))
}

fn pop(values: &mut Vec<f64>) -> f64 {
    values
        .pop()
        .expect("validated formula always leaves an operand on the value stack")
}
