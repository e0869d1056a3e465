//! Name to value environment threaded through a composition
//!
//! Each composition run owns one `Bindings`, seeded empty. Patterns add to it
//! as steps succeed; binding a name that already exists shadows the old
//! value for every later step.

use std::collections::HashMap;
use std::ops::Index;

use crate::Term;

/// Variables bound so far in a composition.
///
/// # Examples
///
/// ```
/// use sluice::{Bindings, Term};
///
/// let mut env = Bindings::new();
/// env.insert("a", Term::from(4));
/// assert_eq!(env["a"], Term::Int(4));
/// assert_eq!(env.get("b"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    vars: HashMap<String, Term>,
}

impl Bindings {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a bound name.
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.vars.get(name)
    }

    /// Bind `name`, shadowing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Term) {
        self.vars.insert(name.into(), value);
    }

    /// Returns `true` if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Move every binding of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: Bindings) {
        self.vars.extend(other.vars);
    }

    /// Iterate over bound names and values in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a numeric binding as a float.
    ///
    /// Convenient inside step expressions doing arithmetic.
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Term::as_f64)
    }

    /// Look up an integer binding.
    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Term::as_i64)
    }
}

impl Index<&str> for Bindings {
    type Output = Term;

    /// # Panics
    ///
    /// Panics if `name` is not bound.
    fn index(&self, name: &str) -> &Term {
        match self.vars.get(name) {
            Some(value) => value,
            None => panic!("no binding named `{}`", name),
        }
    }
}
