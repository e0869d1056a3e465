//! Pattern-matched handlers for a failure reason.

use std::fmt;

use crate::{Bindings, Pattern, PatternError, Term};

/// The expression a clause evaluates, with its source text.
///
/// Bodies are `Send + Sync` so a composition holding clauses can be shared
/// with the futures of an async run.
pub struct ClauseBody {
    source: String,
    func: Box<dyn Fn(&Bindings) -> Term + Send + Sync>,
}

impl ClauseBody {
    /// The body exactly as the caller wrote it.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn eval(&self, env: &Bindings) -> Term {
        (self.func)(env)
    }
}

impl fmt::Debug for ClauseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClauseBody").field(&self.source).finish()
    }
}

/// One `pattern -> body` handler.
#[derive(Debug)]
pub struct Clause {
    pattern: Pattern,
    body: ClauseBody,
}

impl Clause {
    /// Pattern tested against the unwrapped failure reason.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Expression evaluated when the pattern matches.
    pub fn body(&self) -> &ClauseBody {
        &self.body
    }
}

/// An ordered set of handlers tested against a failure reason.
///
/// Clauses are tried top to bottom and the first match wins. When no clause
/// matches, the reason flows on as `{:error, reason}`; an unhandled reason
/// is never an error.
///
/// Malformed pattern text is remembered and reported when the set is
/// attached to a composition, so clauses can be chained without `?`.
///
/// # Examples
///
/// ```
/// use sluice::compose::Clauses;
/// use sluice::Term;
///
/// let clauses = Clauses::new()
///     .on(":zero_division", "{:ok, :inf}", |_| Term::ok(Term::atom("inf")))
///     .on("_", "{:error, :unknown}", |_| Term::error(Term::atom("unknown")))
///     .on(":timeout", "{:error, :timeout}", |_| Term::error(Term::atom("timeout")));
///
/// // the last clause can never fire after a catch-all
/// assert_eq!(clauses.unreachable(), &[2]);
/// ```
#[derive(Debug, Default)]
pub struct Clauses {
    clauses: Vec<Clause>,
    unreachable: Vec<usize>,
    error: Option<PatternError>,
    declared: usize,
}

impl Clauses {
    /// An empty set; every reason passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause.
    ///
    /// A clause shadowed by an earlier catch-all, or repeating an earlier
    /// pattern, is kept but recorded in [`Clauses::unreachable`].
    pub fn on<F>(mut self, pattern: &str, body_source: &str, body: F) -> Self
    where
        F: Fn(&Bindings) -> Term + Send + Sync + 'static,
    {
        let index = self.declared;
        self.declared += 1;
        let pattern = match Pattern::parse(pattern) {
            Ok(pattern) => pattern,
            Err(err) => {
                self.error.get_or_insert(err);
                return self;
            }
        };

        let canonical = pattern.canonical();
        let shadowed = self
            .clauses
            .iter()
            .any(|c| c.pattern.is_irrefutable() || c.pattern.canonical() == canonical);
        if shadowed {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                clause = index,
                pattern = %pattern,
                "clause can never match, an earlier clause covers it"
            );
            self.unreachable.push(index);
        }

        self.clauses.push(Clause {
            pattern,
            body: ClauseBody {
                source: body_source.to_string(),
                func: Box::new(body),
            },
        });
        self
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns `true` if the set has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Declaration positions of clauses an earlier clause always wins over.
    pub fn unreachable(&self) -> &[usize] {
        &self.unreachable
    }

    /// Iterate over the clauses in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub(crate) fn take_error(&mut self) -> Option<PatternError> {
        self.error.take()
    }

    /// First clause whose pattern matches `reason`, with the environment
    /// its body runs in.
    pub(crate) fn select(&self, reason: &Term, env: &Bindings) -> Option<(&Clause, Bindings)> {
        self.clauses.iter().find_map(|clause| {
            clause.pattern.matches(reason, env).map(|captured| {
                let mut scope = env.clone();
                scope.merge(captured);
                (clause, scope)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let clauses = Clauses::new()
            .on("{:http, code}", "first", |_| Term::from(1))
            .on("{:http, 404}", "second", |_| Term::from(2));

        let reason = Term::tuple([Term::atom("http"), Term::from(404)]);
        let (clause, scope) = clauses.select(&reason, &Bindings::new()).unwrap();
        assert_eq!(clause.body().source(), "first");
        assert_eq!(scope["code"], Term::Int(404));
    }

    #[test]
    fn test_no_match_selects_nothing() {
        let clauses = Clauses::new().on(":zero_division", "x", |_| Term::from(0));
        assert!(clauses
            .select(&Term::atom("other_reason"), &Bindings::new())
            .is_none());
    }

    #[test]
    fn test_duplicate_pattern_is_unreachable() {
        let clauses = Clauses::new()
            .on("{:a, x}", "one", |_| Term::from(1))
            .on("{:a,x}", "two", |_| Term::from(2))
            .on(":b", "three", |_| Term::from(3));
        assert_eq!(clauses.unreachable(), &[1]);
        assert_eq!(clauses.len(), 3);
    }

    #[test]
    fn test_bad_pattern_is_deferred() {
        let mut clauses = Clauses::new()
            .on("{:a", "one", |_| Term::from(1))
            .on(":b", "two", |_| Term::from(2));
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses.take_error().map(|e| e.input), Some("{:a".to_string()));
    }

    #[test]
    fn test_unreachable_keeps_declaration_position() {
        let mut clauses = Clauses::new()
            .on("{:a", "broken", |_| Term::from(0))
            .on("_", "catch all", |_| Term::from(1))
            .on(":b", "shadowed", |_| Term::from(2));
        assert_eq!(clauses.unreachable(), &[2]);
        assert!(clauses.take_error().is_some());
    }

    #[test]
    fn test_clauses_are_send_and_sync() {
        fn shareable<T: Send + Sync>(_: &T) {}
        let clauses = Clauses::new().on("_", "nil", |_| Term::nil());
        shareable(&clauses);
        assert_eq!(clauses.iter().next().map(|c| c.body().source()), Some("nil"));
    }

    #[test]
    fn test_body_sees_outer_bindings() {
        let mut env = Bindings::new();
        env.insert("a", Term::from(7));
        let clauses = Clauses::new().on("r", "body", |_| Term::nil());
        let (_, scope) = clauses.select(&Term::atom("x"), &env).unwrap();
        assert_eq!(scope["a"], Term::Int(7));
        assert_eq!(scope["r"], Term::atom("x"));
    }
}
