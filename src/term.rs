//! Dynamically shaped values
//!
//! The composition engine has to tell a well-formed result apart from
//! anything else a step might produce, so it works over `Term` instead of a
//! statically typed `Outcome`. A result is the two-element tuple
//! `{:ok, value}` or `{:error, reason}`; every other term is "not a result".
//!
//! Terms render in literal syntax, which is what fault messages show:
//!
//! ```
//! use sluice::Term;
//!
//! let t = Term::tuple([Term::atom("bad"), Term::from(6)]);
//! assert_eq!(t.to_string(), "{:bad, 6}");
//! assert_eq!(Term::ok(4.0).to_string(), "{:ok, 4.0}");
//! assert_eq!(Term::list([1, 2]).to_string(), "[1, 2]");
//! ```

use std::fmt;

use crate::Outcome;

/// Atom tagging a successful result.
pub const OK: &str = "ok";
/// Atom tagging a failed result.
pub const ERROR: &str = "error";

/// A dynamically shaped value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Term {
    /// A named constant such as `:ok` or `nil`
    Atom(String),
    /// A signed integer
    Int(i64),
    /// A float
    Float(f64),
    /// A string
    Str(String),
    /// A fixed-size tuple
    Tuple(Vec<Term>),
    /// A list
    List(Vec<Term>),
}

impl Term {
    /// Create an atom.
    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }

    /// The `nil` atom.
    pub fn nil() -> Self {
        Term::atom("nil")
    }

    /// Create a tuple from anything convertible to terms.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Term::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Create a list from anything convertible to terms.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Term::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a successful result `{:ok, value}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Term;
    ///
    /// let t = Term::ok(42);
    /// assert!(t.is_success());
    /// assert_eq!(t.to_string(), "{:ok, 42}");
    /// ```
    pub fn ok(value: impl Into<Term>) -> Self {
        Term::Tuple(vec![Term::atom(OK), value.into()])
    }

    /// Build a failed result `{:error, reason}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Term;
    ///
    /// let t = Term::error(Term::atom("zero_division"));
    /// assert!(t.is_failure());
    /// assert_eq!(t.to_string(), "{:error, :zero_division}");
    /// ```
    pub fn error(reason: impl Into<Term>) -> Self {
        Term::Tuple(vec![Term::atom(ERROR), reason.into()])
    }

    /// Classify this term as a result without taking it apart.
    ///
    /// Returns `None` when the term is not result-shaped.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::{Outcome, Term};
    ///
    /// assert_eq!(Term::ok(1).as_result(), Some(Outcome::Success(&Term::Int(1))));
    /// assert_eq!(Term::from(1).as_result(), None);
    /// ```
    pub fn as_result(&self) -> Option<Outcome<&Term, &Term>> {
        match self {
            Term::Tuple(items) => match items.as_slice() {
                [Term::Atom(tag), payload] if tag == OK => Some(Outcome::Success(payload)),
                [Term::Atom(tag), reason] if tag == ERROR => Some(Outcome::Failure(reason)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Consume a result-shaped term into an `Outcome`.
    ///
    /// A term that is not result-shaped is handed back unchanged in `Err`.
    pub fn into_outcome(self) -> Result<Outcome<Term, Term>, Term> {
        match self {
            Term::Tuple(items) if items.len() == 2 => {
                let mut items = items.into_iter();
                match (items.next(), items.next()) {
                    (Some(Term::Atom(tag)), Some(payload)) if tag == OK => {
                        Ok(Outcome::Success(payload))
                    }
                    (Some(Term::Atom(tag)), Some(reason)) if tag == ERROR => {
                        Ok(Outcome::Failure(reason))
                    }
                    (tag, payload) => Err(Term::Tuple(tag.into_iter().chain(payload).collect())),
                }
            }
            other => Err(other),
        }
    }

    /// Returns `true` for `{:ok, _}` and `{:error, _}`.
    pub fn is_result(&self) -> bool {
        self.as_result().is_some()
    }

    /// Returns `true` for `{:ok, _}`.
    pub fn is_success(&self) -> bool {
        matches!(self.as_result(), Some(Outcome::Success(_)))
    }

    /// Returns `true` for `{:error, _}`.
    pub fn is_failure(&self) -> bool {
        matches!(self.as_result(), Some(Outcome::Failure(_)))
    }

    /// Returns `true` for `nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Term::Atom(name) if name == "nil")
    }

    /// The integer value, if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Term::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The numeric value as a float, for `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Term::Int(n) => Some(*n as f64),
            Term::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The string contents, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Term::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The atom name, if this is an `Atom`.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name),
            _ => None,
        }
    }
}

impl From<Outcome<Term, Term>> for Term {
    fn from(outcome: Outcome<Term, Term>) -> Self {
        match outcome {
            Outcome::Success(value) => Term::ok(value),
            Outcome::Failure(reason) => Term::error(reason),
        }
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Int(n)
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Term::Int(i64::from(n))
    }
}

impl From<f64> for Term {
    fn from(x: f64) -> Self {
        Term::Float(x)
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::atom(if b { "true" } else { "false" })
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Str(s.to_string())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Str(s)
    }
}

impl From<Vec<Term>> for Term {
    fn from(items: Vec<Term>) -> Self {
        Term::List(items)
    }
}

/// Whether an atom name can be written without quotes after the colon.
pub(crate) fn is_plain_atom(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    let rest: Vec<char> = chars.collect();
    let body = match rest.last() {
        Some('?') | Some('!') => &rest[..rest.len() - 1],
        _ => &rest[..],
    };
    body.iter().all(|c| c.is_ascii_alphanumeric() || *c == '_')
}

pub(crate) fn write_atom(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    match name {
        "nil" | "true" | "false" => f.write_str(name),
        _ if is_plain_atom(name) => write!(f, ":{}", name),
        _ => {
            f.write_str(":")?;
            write_quoted(f, name)
        }
    }
}

/// Write `s` in double quotes using only escapes the pattern parser reads.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            '\0' => f.write_str("\\0")?,
            c if c.is_control() => write!(f, "\\u{{{:x}}}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

pub(crate) fn write_seq<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[T],
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => write_atom(f, name),
            Term::Int(n) => write!(f, "{}", n),
            Term::Float(x) => write!(f, "{:?}", x),
            Term::Str(s) => write_quoted(f, s),
            Term::Tuple(items) => write_seq(f, "{", items, "}"),
            Term::List(items) => write_seq(f, "[", items, "]"),
        }
    }
}
