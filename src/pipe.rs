//! The chained-pipe operator
//!
//! A pipe takes a result on the left and a call on the right. On success the
//! payload is inserted as the call's first argument; on failure the call is
//! skipped and the failure flows on. Two flavours exist:
//!
//! - `bind`: the call returns a result, used as-is
//! - `map`: the call returns a plain value, wrapped as a success
//!
//! For [`Outcome`](crate::Outcome) values the [`pipe!`](crate::pipe!) macro
//! provides the sugar. For [`Term`] values use [`Term::pipe_bind`] and
//! [`Term::pipe_map`].

use crate::callable::{bind_with, map_with, Callable};
use crate::{Fault, Term};

/// Chain fallible calls, feeding each success payload into the next call's
/// first argument.
///
/// Each stage is written `=> bind f(args..)` or `=> map f(args..)`, where `f`
/// is a function path. Remaining arguments are evaluated only when the stage
/// actually runs.
///
/// # Examples
///
/// ```
/// use sluice::{pipe, Outcome};
///
/// fn safe_div(a: f64, b: f64) -> Outcome<f64, &'static str> {
///     if b == 0.0 {
///         Outcome::failure("zero_division")
///     } else {
///         Outcome::success(a / b)
///     }
/// }
///
/// fn add(a: f64, b: f64) -> f64 {
///     a + b
/// }
///
/// let result = pipe!(safe_div(8.0, 2.0) => bind safe_div(2.0) => map add(1.0));
/// assert_eq!(result, Outcome::Success(3.0));
///
/// let result = pipe!(safe_div(8.0, 0.0) => bind safe_div(2.0) => map add(1.0));
/// assert_eq!(result, Outcome::Failure("zero_division"));
/// ```
#[macro_export]
macro_rules! pipe {
    (@bind $acc:expr, $($f:ident)::+, ($($arg:expr),*)) => {
        $crate::Outcome::bind($acc, |value| $($f)::+(value $(, $arg)*))
    };
    (@map $acc:expr, $($f:ident)::+, ($($arg:expr),*)) => {
        $crate::Outcome::map($acc, |value| $($f)::+(value $(, $arg)*))
    };
    ($value:expr $(=> $kind:ident $($f:ident)::+ ( $($arg:expr),* $(,)? ))*) => {{
        let acc = $value;
        $( let acc = $crate::pipe!(@$kind acc, $($f)::+, ($($arg),*)); )*
        acc
    }};
}

impl Term {
    /// Bind-flavoured pipe: call `f(payload, args..)` on `{:ok, payload}`.
    ///
    /// # Errors
    ///
    /// * [`Fault::ContractViolation`] unless `f` takes `1 + args.len()`
    ///   arguments.
    /// * [`Fault::NotAResult`] if `self` is not a result.
    /// * [`Fault::BadFinalValue`] if `f` returns something that is not a result.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::callable::Callable;
    /// use sluice::Term;
    ///
    /// let safe_div = Callable::new("safe_div", 2, |args| {
    ///     match (args[0].as_f64(), args[1].as_f64()) {
    ///         (Some(_), Some(b)) if b == 0.0 => Term::error(Term::atom("zero_division")),
    ///         (Some(a), Some(b)) => Term::ok(a / b),
    ///         _ => Term::error(Term::atom("badarg")),
    ///     }
    /// });
    ///
    /// let result = Term::ok(8.0)
    ///     .pipe_bind(&safe_div, &[Term::from(2.0)])
    ///     .and_then(|r| r.pipe_bind(&safe_div, &[Term::from(2.0)]));
    /// assert_eq!(result, Ok(Term::ok(2.0)));
    /// ```
    pub fn pipe_bind(self, f: &Callable, args: &[Term]) -> Result<Term, Fault> {
        f.expect_arity("pipe_bind", args.len() + 1)?;
        bind_with("pipe_bind", self, f, args)
    }

    /// Map-flavoured pipe: call `f(payload, args..)` and wrap its return.
    ///
    /// # Errors
    ///
    /// * [`Fault::ContractViolation`] unless `f` takes `1 + args.len()`
    ///   arguments.
    /// * [`Fault::NotAResult`] if `self` is not a result.
    pub fn pipe_map(self, f: &Callable, args: &[Term]) -> Result<Term, Fault> {
        f.expect_arity("pipe_map", args.len() + 1)?;
        map_with("pipe_map", self, f, args)
    }
}
