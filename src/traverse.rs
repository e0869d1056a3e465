//! Traverse and sequence utilities for collections of outcomes
//!
//! - **`map_all`**: apply a fallible function to each element in order,
//!   collecting the payloads
//! - **`sequence`**: turn a collection of outcomes into an outcome of a
//!   collection
//!
//! Both are fail-fast: the first `Failure` is returned unchanged, later
//! elements are never visited, and no partial collection is ever returned.
//!
//! # Examples
//!
//! ```
//! use sluice::{Outcome, traverse::map_all};
//!
//! fn parse_number(s: &str) -> Outcome<i32, String> {
//!     s.parse()
//!         .map(Outcome::success)
//!         .unwrap_or_else(|_| Outcome::failure(format!("Invalid number: {}", s)))
//! }
//!
//! let result = map_all(vec!["1", "2", "3"], parse_number);
//! assert_eq!(result, Outcome::Success(vec![1, 2, 3]));
//!
//! let result = map_all(vec!["1", "x", "y"], parse_number);
//! assert_eq!(result, Outcome::Failure("Invalid number: x".to_string()));
//! ```

use crate::Outcome;

/// Apply `f` to each element, stopping at the first failure.
///
/// # Type Parameters
///
/// * `T` - Input element type
/// * `U` - Output element type
/// * `E` - Failure reason type
/// * `F` - Function type that transforms `T` into `Outcome<U, E>`
/// * `I` - Input iterator type
///
/// # Examples
///
/// ```
/// use sluice::{Outcome, traverse::map_all};
///
/// fn inverse(x: i32) -> Outcome<f64, &'static str> {
///     if x == 0 {
///         Outcome::failure("zero_division")
///     } else {
///         Outcome::success(1.0 / x as f64)
///     }
/// }
///
/// assert_eq!(map_all(vec![-1, 0, 1], inverse), Outcome::Failure("zero_division"));
/// assert_eq!(map_all(vec![1, 2, 4], inverse), Outcome::Success(vec![1.0, 0.5, 0.25]));
/// ```
pub fn map_all<T, U, E, F, I>(iter: I, mut f: F) -> Outcome<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Outcome<U, E>,
{
    let iter = iter.into_iter();
    let mut collected = Vec::with_capacity(iter.size_hint().0);
    for item in iter {
        match f(item) {
            Outcome::Success(value) => collected.push(value),
            Outcome::Failure(reason) => return Outcome::Failure(reason),
        }
    }
    Outcome::Success(collected)
}

/// Sequence a collection of outcomes.
///
/// # Examples
///
/// ```
/// use sluice::{Outcome, traverse::sequence};
///
/// let all = vec![Outcome::<_, &str>::success(1), Outcome::success(2)];
/// assert_eq!(sequence(all), Outcome::Success(vec![1, 2]));
///
/// let mixed = vec![
///     Outcome::success(1),
///     Outcome::failure("first"),
///     Outcome::failure("second"),
/// ];
/// assert_eq!(sequence(mixed), Outcome::Failure("first"));
/// ```
pub fn sequence<T, E, I>(iter: I) -> Outcome<Vec<T>, E>
where
    I: IntoIterator<Item = Outcome<T, E>>,
{
    map_all(iter, |outcome| outcome)
}
