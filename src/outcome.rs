//! The two-variant result type and its combinators
//!
//! `Outcome<T, E>` is either a `Success` carrying a value or a `Failure`
//! carrying a reason. Every combinator in this module passes failures through
//! untouched, so a chain of fallible steps reads top to bottom and stops at
//! the first failure.
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use sluice::Outcome;
//!
//! let ok = Outcome::<_, &str>::success(42);
//! let err = Outcome::<i32, _>::failure("boom");
//!
//! assert!(ok.is_success());
//! assert!(err.is_failure());
//! ```
//!
//! ## Binding and mapping
//!
//! ```
//! use sluice::Outcome;
//!
//! fn safe_div(a: f64, b: f64) -> Outcome<f64, &'static str> {
//!     if b == 0.0 {
//!         Outcome::failure("zero_division")
//!     } else {
//!         Outcome::success(a / b)
//!     }
//! }
//!
//! let result = safe_div(8.0, 2.0)
//!     .bind(|a| safe_div(a, 2.0))
//!     .map(|b| b + 1.0);
//! assert_eq!(result, Outcome::Success(3.0));
//!
//! let result = safe_div(8.0, 0.0).bind(|a| safe_div(a, 2.0));
//! assert_eq!(result, Outcome::Failure("zero_division"));
//! ```

/// A value that is either a success with a payload or a failure with a reason
///
/// Unlike `Validation`-style types, `Outcome` never accumulates: the first
/// failure wins and every later step is skipped.
///
/// # Type Parameters
///
/// * `T` - The type of the success payload
/// * `E` - The type of the failure reason
///
/// # Examples
///
/// ```
/// use sluice::Outcome;
///
/// let v = Outcome::<_, String>::success(42);
/// assert_eq!(v.into_result(), Ok(42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Outcome<T, E> {
    /// Success with a payload
    Success(T),
    /// Failure with a reason
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Create a successful outcome
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let v = Outcome::<i32, String>::success(42);
    /// assert!(v.is_success());
    /// ```
    #[inline]
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    /// Create a failed outcome
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let v = Outcome::<i32, &str>::failure("not_found");
    /// assert!(v.is_failure());
    /// ```
    #[inline]
    pub fn failure(reason: E) -> Self {
        Outcome::Failure(reason)
    }

    /// Treat an absent value as a failure
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// assert_eq!(Outcome::required(Some(3), "missing"), Outcome::Success(3));
    /// assert_eq!(Outcome::<i32, _>::required(None, "missing"), Outcome::Failure("missing"));
    /// ```
    #[inline]
    pub fn required(value: Option<T>, reason: E) -> Self {
        match value {
            Some(value) => Outcome::Success(value),
            None => Outcome::Failure(reason),
        }
    }

    /// Create an outcome from a `Result`
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let v = Outcome::from_result(Ok::<_, String>(42));
    /// assert_eq!(v, Outcome::Success(42));
    ///
    /// let v = Outcome::from_result(Err::<i32, _>("error".to_string()));
    /// assert_eq!(v, Outcome::Failure("error".to_string()));
    /// ```
    #[inline]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(reason) => Outcome::Failure(reason),
        }
    }

    /// Convert this outcome to a `Result`
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let v = Outcome::<i32, _>::failure("error");
    /// assert_eq!(v.into_result(), Err("error"));
    /// ```
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(reason) => Err(reason),
        }
    }

    /// Check if this outcome is a success
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Check if this outcome is a failure
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Returns the success payload if present, consuming self.
    #[inline]
    pub fn success_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Returns the failure reason if present, consuming self.
    #[inline]
    pub fn failure_reason(self) -> Option<E> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }

    /// Convert to `Outcome<&T, &E>`.
    #[inline]
    pub fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(reason) => Outcome::Failure(reason),
        }
    }

    /// Apply a fallible continuation to the success payload
    ///
    /// `f` is only invoked on `Success`; a `Failure` is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let half = |x: i32| {
    ///     if x % 2 == 0 {
    ///         Outcome::success(x / 2)
    ///     } else {
    ///         Outcome::failure("odd")
    ///     }
    /// };
    ///
    /// assert_eq!(Outcome::success(8).bind(half), Outcome::Success(4));
    /// assert_eq!(Outcome::success(7).bind(half), Outcome::Failure("odd"));
    /// ```
    #[inline]
    pub fn bind<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Outcome<U, E>,
    {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Failure(reason) => Outcome::Failure(reason),
        }
    }

    /// Alias for [`Outcome::bind`], named after `Result::and_then`.
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Outcome<U, E>,
    {
        self.bind(f)
    }

    /// Transform the success payload, wrapping the result as a success
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let v = Outcome::<_, String>::success(5);
    /// assert_eq!(v.map(|x| x * 2), Outcome::Success(10));
    /// ```
    #[inline]
    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(reason) => Outcome::Failure(reason),
        }
    }

    /// Transform the failure reason if present
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let v = Outcome::<i32, _>::failure("timeout");
    /// assert_eq!(v.map_failure(str::len), Outcome::Failure(7));
    /// ```
    #[inline]
    pub fn map_failure<E2, F>(self, f: F) -> Outcome<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(reason) => Outcome::Failure(f(reason)),
        }
    }

    /// Keep a success only if `predicate` holds for its payload
    ///
    /// A success that fails the predicate becomes `Failure(reason)`. A
    /// failure passes through and the predicate is not evaluated.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let adult = Outcome::<_, &str>::success(21).check(|age| *age >= 18, "too_young");
    /// assert_eq!(adult, Outcome::Success(21));
    ///
    /// let minor = Outcome::<_, &str>::success(12).check(|age| *age >= 18, "too_young");
    /// assert_eq!(minor, Outcome::Failure("too_young"));
    /// ```
    #[inline]
    pub fn check<P>(self, predicate: P, reason: E) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        match self {
            Outcome::Success(value) if predicate(&value) => Outcome::Success(value),
            Outcome::Success(_) => Outcome::Failure(reason),
            failure @ Outcome::Failure(_) => failure,
        }
    }

    /// Recover from a failure with a fallible handler
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let v = Outcome::<f64, _>::failure("zero_division")
    ///     .or_else(|reason| match reason {
    ///         "zero_division" => Outcome::<_, &str>::success(f64::INFINITY),
    ///         other => Outcome::failure(other),
    ///     });
    /// assert_eq!(v, Outcome::Success(f64::INFINITY));
    /// ```
    #[inline]
    pub fn or_else<E2, F>(self, f: F) -> Outcome<T, E2>
    where
        F: FnOnce(E) -> Outcome<T, E2>,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(reason) => f(reason),
        }
    }

    /// Returns the success payload or `default`.
    #[inline]
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(_) => default,
        }
    }

    /// Returns the success payload or computes one from the failure reason.
    #[inline]
    pub fn unwrap_or_else<F>(self, f: F) -> T
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(reason) => f(reason),
        }
    }
}

impl<T, E: Default> Outcome<T, E> {
    /// Like [`Outcome::required`], using `E::default()` as the reason.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let v = Outcome::<i32, String>::required_or_default(None);
    /// assert_eq!(v, Outcome::Failure(String::new()));
    /// ```
    #[inline]
    pub fn required_or_default(value: Option<T>) -> Self {
        Outcome::required(value, E::default())
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Outcome::from_result(result)
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}
