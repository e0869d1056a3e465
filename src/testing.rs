//! Testing utilities and helpers for Sluice
//!
//! Assertion macros for outcomes and faults, plus property-based testing
//! support behind the `proptest` feature.
//!
//! # Examples
//!
//! ```rust
//! use sluice::{Outcome, assert_success, assert_failure, assert_reason};
//!
//! let success = Outcome::<_, &str>::success(42);
//! assert_success!(success);
//!
//! let failure = Outcome::<i32, _>::failure("zero_division");
//! assert_failure!(failure);
//! assert_reason!(Outcome::<i32, _>::failure("zero_division"), "zero_division");
//! ```

/// Assert that an outcome succeeds.
///
/// This macro will panic if the outcome is a `Failure`.
///
/// # Example
///
/// ```rust
/// use sluice::{Outcome, assert_success};
///
/// let val = Outcome::<_, String>::success(42);
/// assert_success!(val);
/// ```
#[macro_export]
macro_rules! assert_success {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Success(_) => {}
            $crate::Outcome::Failure(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
}

/// Assert that an outcome fails.
///
/// This macro will panic if the outcome is a `Success`.
///
/// # Example
///
/// ```rust
/// use sluice::{Outcome, assert_failure};
///
/// let val = Outcome::<i32, _>::failure("error".to_string());
/// assert_failure!(val);
/// ```
#[macro_export]
macro_rules! assert_failure {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Failure(_) => {}
            $crate::Outcome::Success(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

/// Assert that an outcome fails with a specific reason.
///
/// # Example
///
/// ```rust
/// use sluice::{Outcome, assert_reason};
///
/// let val = Outcome::<i32, _>::failure("timeout");
/// assert_reason!(val, "timeout");
/// ```
#[macro_export]
macro_rules! assert_reason {
    ($outcome:expr, $expected:expr) => {
        match $outcome {
            $crate::Outcome::Failure(reason) => {
                assert_eq!(reason, $expected);
            }
            $crate::Outcome::Success(v) => {
                panic!(
                    "Expected Failure with reason {:?}, got Success: {:?}",
                    $expected, v
                );
            }
        }
    };
}

/// Assert that a `Result<_, Fault>` holds a fault of the given kind.
///
/// # Example
///
/// ```rust
/// use sluice::compose::Composition;
/// use sluice::{assert_fault, Term};
///
/// let c = Composition::strict().finish("42", |_| Term::from(42)).unwrap();
/// assert_fault!(c.run(), "bad_final_value");
/// ```
#[macro_export]
macro_rules! assert_fault {
    ($result:expr, $kind:expr) => {
        match $result {
            Err(fault) => {
                let fault: $crate::Fault = fault;
                assert_eq!(fault.kind(), $kind, "unexpected fault: {}", fault);
            }
            Ok(v) => {
                panic!("Expected {} fault, got Ok: {:?}", $kind, v);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
use crate::{Outcome, Term};

#[cfg(feature = "proptest")]
impl<T, E> Arbitrary for Outcome<T, E>
where
    T: Arbitrary + 'static,
    E: Arbitrary + 'static,
    T::Strategy: 'static,
    E::Strategy: 'static,
{
    type Parameters = (T::Parameters, E::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (t_params, e_params) = args;
        prop_oneof![
            any_with::<T>(t_params).prop_map(Outcome::success),
            any_with::<E>(e_params).prop_map(Outcome::failure),
        ]
        .boxed()
    }
}

/// Strategy producing terms up to a few levels deep.
///
/// Floats are drawn from normal values only so generated terms compare equal
/// to themselves.
#[cfg(feature = "proptest")]
pub fn any_term() -> BoxedStrategy<Term> {
    let leaf = prop_oneof![
        "[a-z][a-z_]{0,8}".prop_map(Term::atom),
        any::<i64>().prop_map(Term::Int),
        proptest::num::f64::NORMAL.prop_map(Term::Float),
        ".{0,12}".prop_map(Term::Str),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Term::Tuple),
            prop::collection::vec(inner, 0..4).prop_map(Term::List),
        ]
    })
    .boxed()
}
