//! Bind, map and friends over dynamically shaped results
//!
//! These mirror the [`Outcome`](crate::Outcome) combinators for [`Term`]
//! values. Because terms carry no static type, the contracts the compiler
//! would normally enforce are checked at runtime instead and reported as
//! [`Fault`]s: a continuation must take exactly one argument, the left-hand
//! value must be a result, and a bind continuation must itself return one.
//!
//! # Examples
//!
//! ```
//! use sluice::callable::{self, Callable};
//! use sluice::Term;
//!
//! let half = Callable::unary("half", |n| match n.as_i64() {
//!     Some(n) if n % 2 == 0 => Term::ok(n / 2),
//!     _ => Term::error(Term::atom("odd")),
//! });
//!
//! assert_eq!(callable::bind(Term::ok(8), &half), Ok(Term::ok(4)));
//! assert_eq!(
//!     callable::bind(Term::ok(3), &half),
//!     Ok(Term::error(Term::atom("odd")))
//! );
//! ```

use std::fmt;
use std::rc::Rc;

use crate::{Fault, Outcome, Term};

/// Default failure reason used by [`required`].
pub const VALUE_REQUIRED: &str = "value_required";

/// A named function over terms with a fixed arity.
#[derive(Clone)]
pub struct Callable {
    name: String,
    arity: usize,
    func: Rc<dyn Fn(&[Term]) -> Term>,
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({}/{})", self.name, self.arity)
    }
}

impl Callable {
    /// Wrap a function taking `arity` positional arguments.
    ///
    /// `func` always receives a slice of exactly `arity` terms.
    pub fn new<F>(name: impl Into<String>, arity: usize, func: F) -> Self
    where
        F: Fn(&[Term]) -> Term + 'static,
    {
        Callable {
            name: name.into(),
            arity,
            func: Rc::new(func),
        }
    }

    /// Wrap a single-argument function.
    pub fn unary<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Term) -> Term + 'static,
    {
        Callable::new(name, 1, move |args| func(&args[0]))
    }

    /// The function's name, used in fault messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of arguments the function takes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Ensure this function can be called with `expected` arguments.
    pub(crate) fn expect_arity(&self, operation: &'static str, expected: usize) -> Result<(), Fault> {
        if self.arity == expected {
            Ok(())
        } else {
            Err(Fault::ContractViolation {
                operation,
                callable: self.name.clone(),
                arity: self.arity,
                expected_arity: expected,
            })
        }
    }

    /// Call with `first` followed by `rest`; the arity must already be checked.
    pub(crate) fn call_with(&self, first: Term, rest: &[Term]) -> Term {
        let mut args = Vec::with_capacity(rest.len() + 1);
        args.push(first);
        args.extend_from_slice(rest);
        (self.func)(&args)
    }
}

/// Split a result-shaped term, faulting when it is not one.
pub(crate) fn expect_result(
    operation: &'static str,
    value: Term,
) -> Result<Outcome<Term, Term>, Fault> {
    value
        .into_outcome()
        .map_err(|actual| Fault::NotAResult { operation, actual })
}

/// Apply `f` to the payload of `{:ok, v}`; `{:error, r}` passes through.
///
/// # Errors
///
/// * [`Fault::ContractViolation`] if `f` does not take exactly one argument,
///   checked before anything else.
/// * [`Fault::NotAResult`] if `result` is not result-shaped.
/// * [`Fault::BadFinalValue`] if `f` returns something that is not a result.
pub fn bind(result: Term, f: &Callable) -> Result<Term, Fault> {
    f.expect_arity("bind", 1)?;
    bind_with("bind", result, f, &[])
}

/// Apply `f` to the payload of `{:ok, v}` and wrap its return as `{:ok, _}`.
///
/// # Errors
///
/// Same as [`bind`], except that `f` may return any term.
pub fn map(result: Term, f: &Callable) -> Result<Term, Fault> {
    f.expect_arity("map", 1)?;
    map_with("map", result, f, &[])
}

pub(crate) fn bind_with(
    operation: &'static str,
    result: Term,
    f: &Callable,
    rest: &[Term],
) -> Result<Term, Fault> {
    match expect_result(operation, result)? {
        Outcome::Success(value) => {
            let next = f.call_with(value, rest);
            if next.is_result() {
                Ok(next)
            } else {
                Err(Fault::BadFinalValue {
                    expr: describe_call(f, rest),
                    actual: next,
                })
            }
        }
        Outcome::Failure(reason) => Ok(Term::error(reason)),
    }
}

pub(crate) fn map_with(
    operation: &'static str,
    result: Term,
    f: &Callable,
    rest: &[Term],
) -> Result<Term, Fault> {
    match expect_result(operation, result)? {
        Outcome::Success(value) => Ok(Term::ok(f.call_with(value, rest))),
        Outcome::Failure(reason) => Ok(Term::error(reason)),
    }
}

fn describe_call(f: &Callable, rest: &[Term]) -> String {
    let mut call = format!("{}(value", f.name);
    for arg in rest {
        call.push_str(&format!(", {}", arg));
    }
    call.push(')');
    call
}

/// Keep `{:ok, v}` only if `predicate(v)` holds, else `{:error, reason}`.
///
/// # Errors
///
/// [`Fault::NotAResult`] if `result` is not result-shaped.
pub fn check<P>(result: Term, predicate: P, reason: Term) -> Result<Term, Fault>
where
    P: FnOnce(&Term) -> bool,
{
    match expect_result("check", result)? {
        Outcome::Success(value) if predicate(&value) => Ok(Term::ok(value)),
        Outcome::Success(_) => Ok(Term::error(reason)),
        Outcome::Failure(failed) => Ok(Term::error(failed)),
    }
}

/// Wrap `value` as `{:ok, value}`, or fail when it is `nil`.
///
/// The failure reason defaults to `:value_required`.
///
/// # Examples
///
/// ```
/// use sluice::callable::required;
/// use sluice::Term;
///
/// assert_eq!(required(Term::from(1), None), Term::ok(1));
/// assert_eq!(
///     required(Term::nil(), None),
///     Term::error(Term::atom("value_required"))
/// );
/// ```
pub fn required(value: Term, reason: Option<Term>) -> Term {
    if value.is_nil() {
        Term::error(reason.unwrap_or_else(|| Term::atom(VALUE_REQUIRED)))
    } else {
        Term::ok(value)
    }
}

/// Apply `f` to every item in order, collecting payloads into a list.
///
/// Stops at the first `{:error, reason}` and returns it unchanged; items
/// after it are never visited and no partial list is returned.
///
/// # Errors
///
/// * [`Fault::ContractViolation`] if `f` does not take exactly one argument.
/// * [`Fault::BadFinalValue`] if `f` returns something that is not a result.
///
/// # Examples
///
/// ```
/// use sluice::callable::{map_all, Callable};
/// use sluice::Term;
///
/// let inverse = Callable::unary("inverse", |n| match n.as_f64() {
///     Some(x) if x != 0.0 => Term::ok(1.0 / x),
///     _ => Term::error(Term::atom("zero_division")),
/// });
///
/// assert_eq!(
///     map_all(vec![Term::from(-1), Term::from(0), Term::from(1)], &inverse),
///     Ok(Term::error(Term::atom("zero_division")))
/// );
/// ```
pub fn map_all<I>(items: I, f: &Callable) -> Result<Term, Fault>
where
    I: IntoIterator<Item = Term>,
{
    f.expect_arity("map_all", 1)?;
    let mut collected = Vec::new();
    for item in items {
        let next = f.call_with(item, &[]);
        match expect_result("map_all", next) {
            Ok(Outcome::Success(value)) => collected.push(value),
            Ok(Outcome::Failure(reason)) => return Ok(Term::error(reason)),
            Err(Fault::NotAResult { actual, .. }) => {
                return Err(Fault::BadFinalValue {
                    expr: describe_call(f, &[]),
                    actual,
                })
            }
            Err(other) => return Err(other),
        }
    }
    Ok(Term::ok(Term::List(collected)))
}
