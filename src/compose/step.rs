//! Steps and the expressions they evaluate.

use std::fmt;

use crate::{Bindings, Pattern, PatternError, Term};

/// Anything that can sit on the right-hand side of a step.
///
/// Implemented by [`Expr`] and, with the `async` feature, by
/// [`AsyncExpr`](super::AsyncExpr).
pub trait StepExpr {
    /// The expression exactly as the caller wrote it.
    fn source(&self) -> &str;
}

/// A synchronous step expression together with its source text.
///
/// # Examples
///
/// ```
/// use sluice::{compose::Expr, Bindings, Term};
///
/// let expr = Expr::new("a * 2", |env: &Bindings| Term::from(env.i64("a").unwrap_or(0) * 2));
/// assert_eq!(expr.source(), "a * 2");
/// ```
pub struct Expr {
    source: String,
    func: Box<dyn Fn(&Bindings) -> Term>,
}

impl Expr {
    /// Wrap `func` with the text it stands for.
    pub fn new<F>(source: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Bindings) -> Term + 'static,
    {
        Expr {
            source: source.into(),
            func: Box::new(func),
        }
    }

    /// The expression exactly as the caller wrote it.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn eval(&self, env: &Bindings) -> Term {
        (self.func)(env)
    }
}

impl StepExpr for Expr {
    fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expr").field(&self.source).finish()
    }
}

/// One line of a composition block.
#[derive(Debug)]
pub enum Step<X = Expr> {
    /// `pattern <- expr`: `expr` must produce a result. A success payload is
    /// destructured into `pattern`; a failure short-circuits.
    Bind {
        /// Matched against the success payload
        pattern: Pattern,
        /// Must evaluate to a result
        expr: X,
    },
    /// `pattern = expr`: ordinary computation, result tags are not inspected.
    Plain {
        /// Matched against the whole value
        pattern: Pattern,
        /// Any expression
        expr: X,
    },
    /// The value of the whole composition.
    Final {
        /// The closing expression
        expr: X,
    },
}

impl<X: StepExpr> Step<X> {
    /// A binding step.
    pub fn bind(pattern: &str, expr: X) -> Result<Self, PatternError> {
        Ok(Step::Bind {
            pattern: Pattern::parse(pattern)?,
            expr,
        })
    }

    /// A plain step.
    pub fn plain(pattern: &str, expr: X) -> Result<Self, PatternError> {
        Ok(Step::Plain {
            pattern: Pattern::parse(pattern)?,
            expr,
        })
    }

    /// The final step.
    pub fn last(expr: X) -> Self {
        Step::Final { expr }
    }

    /// Source text of the step as it would be written in a block.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::compose::{Expr, Step};
    /// use sluice::Term;
    ///
    /// let step = Step::bind("b", Expr::new("bar(a)", |_| Term::ok(1))).unwrap();
    /// assert_eq!(step.describe(), "b <- bar(a)");
    /// ```
    pub fn describe(&self) -> String {
        match self {
            Step::Bind { pattern, expr } => format!("{} <- {}", pattern, expr.source()),
            Step::Plain { pattern, expr } => format!("{} = {}", pattern, expr.source()),
            Step::Final { expr } => expr.source().to_string(),
        }
    }
}

/// A non-final step, after validation.
#[derive(Debug)]
pub(crate) enum Line<X> {
    Bind { pattern: Pattern, expr: X },
    Plain { pattern: Pattern, expr: X },
}
