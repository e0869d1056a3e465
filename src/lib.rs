//! # Sluice
//!
//! Result pipelines for Rust: bind, map, pipe and sequential composition
//! with recovery.
//!
//! A result is one of two shapes, a success carrying a payload or a failure
//! carrying a reason. Sluice works with them at two levels:
//!
//! - [`Outcome<T, E>`] is the statically typed result, with the usual
//!   `bind`, `map`, `check` and `required` combinators and the [`pipe!`]
//!   macro for left-to-right chains.
//! - [`Term`] is a dynamically shaped value where a result is the tuple
//!   `{:ok, value}` or `{:error, reason}`. The [`callable`] combinators and
//!   the [`compose`] engine work on terms, checking at runtime the contracts
//!   the compiler would otherwise enforce and reporting breaches as
//!   [`Fault`]s.
//!
//! ## Quick Example
//!
//! ```rust
//! use sluice::compose::Composition;
//! use sluice::Term;
//!
//! fn parse(s: &str) -> Term {
//!     match s.parse::<i64>() {
//!         Ok(n) => Term::ok(n),
//!         Err(_) => Term::error(Term::atom("not_a_number")),
//!     }
//! }
//!
//! let c = Composition::auto_wrap()
//!     .bind("a", "parse(\"20\")", |_| parse("20"))
//!     .bind("b", "parse(\"x\")", |_| parse("x"))
//!     .finish("a + b", |env| {
//!         Term::from(env.i64("a").unwrap_or(0) + env.i64("b").unwrap_or(0))
//!     })
//!     .unwrap();
//!
//! assert_eq!(c.run(), Ok(Term::error(Term::atom("not_a_number"))));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod bindings;
pub mod callable;
pub mod compose;
pub mod fault;
pub mod outcome;
pub mod pattern;
pub mod pipe;
pub mod term;
pub mod testing;
pub mod traverse;

// Re-exports
pub use bindings::Bindings;
pub use callable::Callable;
pub use compose::{BuildError, Clauses, Composition, Mode};
pub use fault::Fault;
pub use outcome::Outcome;
pub use pattern::{Pattern, PatternError};
pub use term::Term;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bindings::Bindings;
    pub use crate::callable::Callable;
    pub use crate::compose::{BuildError, Clauses, Composition, Mode};
    pub use crate::fault::Fault;
    pub use crate::outcome::Outcome;
    pub use crate::pattern::{Pattern, PatternError};
    pub use crate::pipe;
    pub use crate::term::Term;
    pub use crate::traverse::{map_all, sequence};
}
