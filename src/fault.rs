//! Faults: broken contracts between composition steps
//!
//! A `{:error, reason}` value is ordinary data and flows through every
//! combinator. A `Fault` is different: it means a step or continuation did
//! not honour the result contract at all, and it always ends the current call.
//!
//! Fault messages quote the caller's source text verbatim:
//!
//! ```
//! use sluice::{Fault, Term};
//!
//! let fault = Fault::BindMismatch {
//!     pattern: "b".to_string(),
//!     expr: "bar(a)".to_string(),
//!     actual: Term::tuple([Term::atom("bad"), Term::from(6)]),
//! };
//!
//! let message = fault.to_string();
//! assert!(message.contains("b <- bar(a)"));
//! assert!(message.contains("bar(a) :: {:ok, b} | {:error, reason}"));
//! assert!(message.contains("bar(a) :: {:bad, 6}"));
//! ```

use std::fmt;

use crate::Term;

/// A violated result contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// A binding step produced something other than `{:error, _}` or an
    /// `{:ok, _}` whose payload matches the step's pattern.
    BindMismatch {
        /// Pattern source text
        pattern: String,
        /// Expression source text
        expr: String,
        /// The value the expression produced
        actual: Term,
    },
    /// A plain step's value did not match its pattern.
    PlainMismatch {
        /// Pattern source text
        pattern: String,
        /// Expression source text
        expr: String,
        /// The value the expression produced
        actual: Term,
    },
    /// A value required to be a result was not one.
    BadFinalValue {
        /// Expression source text
        expr: String,
        /// The value the expression produced
        actual: Term,
    },
    /// A continuation was not callable with a single payload argument.
    ContractViolation {
        /// The combinator that rejected the continuation
        operation: &'static str,
        /// Name of the continuation
        callable: String,
        /// Arity the continuation was declared with
        arity: usize,
        /// Arity the combinator needed
        expected_arity: usize,
    },
    /// A combinator was handed a left-hand value that is not a result.
    NotAResult {
        /// The combinator that received the value
        operation: &'static str,
        /// The offending value
        actual: Term,
    },
}

impl Fault {
    /// Short machine-friendly name of the fault kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::BindMismatch { .. } => "bind_mismatch",
            Fault::PlainMismatch { .. } => "plain_mismatch",
            Fault::BadFinalValue { .. } => "bad_final_value",
            Fault::ContractViolation { .. } => "contract_violation",
            Fault::NotAResult { .. } => "not_a_result",
        }
    }
}

fn block(f: &mut fmt::Formatter<'_>, heading: &str, line: fmt::Arguments<'_>) -> fmt::Result {
    write!(f, "\n\n{}:\n\n    {}", heading, line)
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::BindMismatch {
                pattern,
                expr,
                actual,
            } => {
                write!(f, "no match of right hand side value in binding step")?;
                write!(f, "\n\n    {} <- {}", pattern, expr)?;
                block(
                    f,
                    "expected",
                    format_args!("{} :: {{:ok, {}}} | {{:error, reason}}", expr, pattern),
                )?;
                block(f, "actual", format_args!("{} :: {}", expr, actual))
            }
            Fault::PlainMismatch {
                pattern,
                expr,
                actual,
            } => {
                write!(f, "no match of right hand side value in step")?;
                write!(f, "\n\n    {} = {}", pattern, expr)?;
                block(f, "expected", format_args!("{} :: {}", expr, pattern))?;
                block(f, "actual", format_args!("{} :: {}", expr, actual))
            }
            Fault::BadFinalValue { expr, actual } => {
                write!(f, "final value is not a result")?;
                write!(f, "\n\n    {}", expr)?;
                block(
                    f,
                    "expected",
                    format_args!("{} :: {{:ok, value}} | {{:error, reason}}", expr),
                )?;
                block(f, "actual", format_args!("{} :: {}", expr, actual))
            }
            Fault::ContractViolation {
                operation,
                callable,
                arity,
                expected_arity,
            } => write!(
                f,
                "{} expects a function of arity {}, got {}/{}",
                operation, expected_arity, callable, arity
            ),
            Fault::NotAResult { operation, actual } => write!(
                f,
                "{} expects {{:ok, value}} | {{:error, reason}}, got {}",
                operation, actual
            ),
        }
    }
}

impl std::error::Error for Fault {}
