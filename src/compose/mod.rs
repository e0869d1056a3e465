//! Sequential composition with short-circuiting and recovery
//!
//! A composition is an ordered list of steps:
//!
//! - **binding steps** (`pattern <- expr`) whose expression must produce a
//!   result; a success payload is destructured into the pattern, a failure
//!   stops the walk,
//! - **plain steps** (`pattern = expr`) for ordinary computation in between,
//! - one **final step** whose value becomes the composition's result.
//!
//! Bound names are visible to every later step. When a binding step fails,
//! the optional recovery clauses are tried against the unwrapped reason; the
//! first matching clause supplies the result, and an unmatched reason flows
//! on as `{:error, reason}`.
//!
//! Two modes share the same walk:
//!
//! - [`Mode::Strict`]: the final value must already be a result.
//! - [`Mode::AutoWrap`]: a final value that is not a result becomes
//!   `{:ok, value}`. Auto-wrap compositions may instead take
//!   [`otherwise`](CompositionBuilder::otherwise) clauses, whose value is
//!   returned raw, for any failure including a failing final value.
//!
//! # Examples
//!
//! ```
//! use sluice::compose::{Clauses, Composition};
//! use sluice::{Bindings, Term};
//!
//! fn safe_div(a: f64, b: f64) -> Term {
//!     if b == 0.0 {
//!         Term::error(Term::atom("zero_division"))
//!     } else {
//!         Term::ok(a / b)
//!     }
//! }
//!
//! let f = |env: &Bindings, name: &str| env.f64(name).unwrap_or(f64::NAN);
//!
//! let c = Composition::strict()
//!     .bind("a", "safe_div(8, 2)", |_| safe_div(8.0, 2.0))
//!     .bind("b", "safe_div(a, 2)", move |env| safe_div(f(env, "a"), 2.0))
//!     .finish("{:ok, a + b}", move |env| Term::ok(f(env, "a") + f(env, "b")))
//!     .unwrap();
//! assert_eq!(c.run(), Ok(Term::ok(6.0)));
//!
//! let c = Composition::strict()
//!     .bind("a", "safe_div(8, 0)", |_| safe_div(8.0, 0.0))
//!     .recover(Clauses::new().on(":zero_division", "{:ok, :inf}", |_| {
//!         Term::ok(Term::atom("inf"))
//!     }))
//!     .finish("{:ok, a}", |env| Term::ok(env["a"].clone()))
//!     .unwrap();
//! assert_eq!(c.run(), Ok(Term::ok(Term::atom("inf"))));
//! ```

mod clauses;
mod engine;
mod step;

#[cfg(feature = "async")]
mod asynchronous;

#[cfg(test)]
mod tests;

pub use clauses::{Clause, ClauseBody, Clauses};
pub use engine::{BuildError, Composition, CompositionBuilder, Mode};
pub use step::{Expr, Step, StepExpr};

#[cfg(feature = "async")]
pub use asynchronous::{AsyncComposition, AsyncExpr};
