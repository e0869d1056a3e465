//! The step interpreter.
//!
//! The per-step rules live in free functions so the synchronous and the
//! async runner walk steps identically.

use std::fmt;

use super::clauses::Clauses;
use super::step::{Expr, Line, Step, StepExpr};
use crate::{Bindings, Fault, Outcome, Pattern, PatternError, Term};

/// How the value of the final step (and of a fired recovery clause) is
/// treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The value must already be a result.
    Strict,
    /// Any value that is not a result is wrapped as `{:ok, value}`.
    AutoWrap,
}

/// Error returned when a composition cannot be assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No steps were given.
    EmptySteps,
    /// The last step is not a final step.
    MissingFinal,
    /// A final step appears before the end of the list.
    FinalNotLast {
        /// Position of the misplaced final step
        index: usize,
    },
    /// A pattern failed to parse.
    Pattern(PatternError),
    /// `otherwise` handlers need the auto-wrap mode.
    OtherwiseRequiresAutoWrap,
    /// Both `recover` and `otherwise` handlers were attached.
    ConflictingHandlers,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::EmptySteps => write!(f, "a composition needs at least a final step"),
            BuildError::MissingFinal => write!(f, "the last step of a composition must be final"),
            BuildError::FinalNotLast { index } => {
                write!(f, "final step at position {} is not the last step", index)
            }
            BuildError::Pattern(err) => write!(f, "{}", err),
            BuildError::OtherwiseRequiresAutoWrap => {
                write!(f, "otherwise handlers are only available in auto-wrap mode")
            }
            BuildError::ConflictingHandlers => {
                write!(f, "a composition takes either recover or otherwise handlers, not both")
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Pattern(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PatternError> for BuildError {
    fn from(err: PatternError) -> Self {
        BuildError::Pattern(err)
    }
}

#[derive(Debug)]
pub(crate) enum Handler {
    /// Result-shaped replacement, validated like a final value.
    Recover(Clauses),
    /// Raw replacement, returned as-is.
    Otherwise(Clauses),
}

/// A validated, reusable sequence of steps.
///
/// Build one with [`Composition::strict`], [`Composition::auto_wrap`] or
/// [`Composition::from_steps`], then [`run`](Composition::run) it as often as
/// needed. Every run starts from an empty environment.
#[derive(Debug)]
pub struct Composition<X = Expr> {
    pub(crate) mode: Mode,
    pub(crate) body: Vec<Line<X>>,
    pub(crate) last: X,
    pub(crate) handler: Option<Handler>,
}

impl<X: StepExpr> Composition<X> {
    /// Assemble a composition from an explicit step list.
    ///
    /// The list must be non-empty and end with exactly one
    /// [`Step::Final`].
    pub fn from_steps(mode: Mode, mut steps: Vec<Step<X>>) -> Result<Self, BuildError> {
        let last = match steps.pop() {
            None => return Err(BuildError::EmptySteps),
            Some(Step::Final { expr }) => expr,
            Some(_) => return Err(BuildError::MissingFinal),
        };

        let body = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| match step {
                Step::Bind { pattern, expr } => Ok(Line::Bind { pattern, expr }),
                Step::Plain { pattern, expr } => Ok(Line::Plain { pattern, expr }),
                Step::Final { .. } => Err(BuildError::FinalNotLast { index }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Composition {
            mode,
            body,
            last,
            handler: None,
        })
    }

    /// Attach recovery clauses for a failing binding step.
    ///
    /// The fired clause's value is validated like a final value; an
    /// unmatched reason passes through as `{:error, reason}`.
    pub fn with_recovery(self, clauses: Clauses) -> Result<Self, BuildError> {
        self.with_handler(Handler::Recover(clauses))
    }

    /// Attach raw-return handlers for any failure (auto-wrap mode only).
    ///
    /// The fired clause's value is returned as-is, whether or not it is a
    /// result.
    pub fn with_otherwise(self, clauses: Clauses) -> Result<Self, BuildError> {
        if self.mode != Mode::AutoWrap {
            return Err(BuildError::OtherwiseRequiresAutoWrap);
        }
        self.with_handler(Handler::Otherwise(clauses))
    }

    fn with_handler(mut self, mut handler: Handler) -> Result<Self, BuildError> {
        if self.handler.is_some() {
            return Err(BuildError::ConflictingHandlers);
        }
        let clauses = match &mut handler {
            Handler::Recover(clauses) | Handler::Otherwise(clauses) => clauses,
        };
        if let Some(err) = clauses.take_error() {
            return Err(BuildError::Pattern(err));
        }
        self.handler = Some(handler);
        Ok(self)
    }

    /// The mode this composition runs in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of steps, including the final one.
    pub fn len(&self) -> usize {
        self.body.len() + 1
    }

    /// Always `false`: a composition has at least its final step.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// What happens when a binding step yields `{:error, reason}`.
    pub(crate) fn on_failure(&self, reason: Term, env: &Bindings) -> Result<Term, Fault> {
        match &self.handler {
            Some(Handler::Recover(clauses)) => match clauses.select(&reason, env) {
                Some((clause, scope)) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(reason = %reason, clause = %clause.pattern(), "recovery clause fired");
                    let body = clause.body();
                    finalize(self.mode, body.source(), body.eval(&scope))
                }
                None => Ok(passthrough(reason)),
            },
            Some(Handler::Otherwise(clauses)) => Ok(otherwise(clauses, reason, env)),
            None => Ok(Term::error(reason)),
        }
    }

    /// What happens with the already finalized value of the last step.
    pub(crate) fn on_final(&self, value: Term, env: &Bindings) -> Term {
        if let Some(Handler::Otherwise(clauses)) = &self.handler {
            if let Some(Outcome::Failure(reason)) = value.as_result() {
                return otherwise(clauses, reason.clone(), env);
            }
        }
        value
    }
}

impl Composition<Expr> {
    /// Start a strict composition: the final value must be a result.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::compose::Composition;
    /// use sluice::Term;
    ///
    /// let c = Composition::strict()
    ///     .bind("a", "Term::ok(1)", |_| Term::ok(1))
    ///     .finish("Term::ok(a)", |env| Term::ok(env["a"].clone()))
    ///     .unwrap();
    /// assert_eq!(c.run(), Ok(Term::ok(1)));
    /// ```
    pub fn strict() -> CompositionBuilder<Expr> {
        CompositionBuilder::new(Mode::Strict)
    }

    /// Start an auto-wrap composition: a final value that is not a result is
    /// wrapped as `{:ok, value}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::compose::Composition;
    /// use sluice::Term;
    ///
    /// let c = Composition::auto_wrap().finish("42", |_| Term::from(42)).unwrap();
    /// assert_eq!(c.run(), Ok(Term::ok(42)));
    /// ```
    pub fn auto_wrap() -> CompositionBuilder<Expr> {
        CompositionBuilder::new(Mode::AutoWrap)
    }

    /// Run every step in order and produce the composition's result.
    ///
    /// # Errors
    ///
    /// * [`Fault::BindMismatch`] when a binding step yields neither
    ///   `{:error, _}` nor an `{:ok, _}` whose payload matches its pattern.
    /// * [`Fault::PlainMismatch`] when a plain step's value does not match.
    /// * [`Fault::BadFinalValue`] when a strict final value, or the value of a
    ///   fired recovery clause, is not a result.
    pub fn run(&self) -> Result<Term, Fault> {
        let mut env = Bindings::new();
        for line in &self.body {
            match line {
                Line::Bind { pattern, expr } => {
                    let value = expr.eval(&env);
                    if let Some(reason) = bind_step(pattern, expr.source(), value, &mut env)? {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(step = %pattern, reason = %reason, "composition short-circuited");
                        return self.on_failure(reason, &env);
                    }
                }
                Line::Plain { pattern, expr } => {
                    let value = expr.eval(&env);
                    plain_step(pattern, expr.source(), value, &mut env)?;
                }
            }
        }
        let value = finalize(self.mode, self.last.source(), self.last.eval(&env))?;
        Ok(self.on_final(value, &env))
    }
}

/// Incrementally assembles a [`Composition`].
///
/// Pattern errors are remembered and reported by
/// [`finish`](CompositionBuilder::finish), so steps chain without `?`.
#[derive(Debug)]
pub struct CompositionBuilder<X = Expr> {
    mode: Mode,
    steps: Vec<Step<X>>,
    recover: Option<Clauses>,
    otherwise: Option<Clauses>,
    error: Option<PatternError>,
}

impl<X: StepExpr> CompositionBuilder<X> {
    pub(crate) fn new(mode: Mode) -> Self {
        CompositionBuilder {
            mode,
            steps: Vec::new(),
            recover: None,
            otherwise: None,
            error: None,
        }
    }

    pub(crate) fn push(mut self, step: Result<Step<X>, PatternError>) -> Self {
        match step {
            Ok(step) => self.steps.push(step),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Handle a failing binding step with `clauses`.
    pub fn recover(mut self, clauses: Clauses) -> Self {
        self.recover = Some(clauses);
        self
    }

    /// Turn any failure into a raw value with `clauses` (auto-wrap only).
    pub fn otherwise(mut self, clauses: Clauses) -> Self {
        self.otherwise = Some(clauses);
        self
    }

    pub(crate) fn finish_with(mut self, last: X) -> Result<Composition<X>, BuildError> {
        if let Some(err) = self.error.take() {
            return Err(BuildError::Pattern(err));
        }
        if self.recover.is_some() && self.otherwise.is_some() {
            return Err(BuildError::ConflictingHandlers);
        }
        self.steps.push(Step::last(last));
        let mut composition = Composition::from_steps(self.mode, self.steps)?;
        if let Some(clauses) = self.recover {
            composition = composition.with_recovery(clauses)?;
        }
        if let Some(clauses) = self.otherwise {
            composition = composition.with_otherwise(clauses)?;
        }
        Ok(composition)
    }
}

impl CompositionBuilder<Expr> {
    /// Add a binding step `pattern <- expr`.
    pub fn bind<F>(self, pattern: &str, expr_source: &str, expr: F) -> Self
    where
        F: Fn(&Bindings) -> Term + 'static,
    {
        self.push(Step::bind(pattern, Expr::new(expr_source, expr)))
    }

    /// Add a plain step `pattern = expr`.
    pub fn step<F>(self, pattern: &str, expr_source: &str, expr: F) -> Self
    where
        F: Fn(&Bindings) -> Term + 'static,
    {
        self.push(Step::plain(pattern, Expr::new(expr_source, expr)))
    }

    /// Add the final step and validate the whole composition.
    pub fn finish<F>(self, expr_source: &str, expr: F) -> Result<Composition<Expr>, BuildError>
    where
        F: Fn(&Bindings) -> Term + 'static,
    {
        self.finish_with(Expr::new(expr_source, expr))
    }
}

/// Apply a binding step's value to the environment.
///
/// Returns the failure reason when the step short-circuits.
pub(crate) fn bind_step(
    pattern: &Pattern,
    expr_source: &str,
    value: Term,
    env: &mut Bindings,
) -> Result<Option<Term>, Fault> {
    let actual = match value.into_outcome() {
        Ok(Outcome::Success(payload)) => match pattern.matches(&payload, env) {
            Some(captured) => {
                env.merge(captured);
                return Ok(None);
            }
            None => Term::ok(payload),
        },
        Ok(Outcome::Failure(reason)) => return Ok(Some(reason)),
        Err(other) => other,
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(pattern = %pattern, expr = expr_source, actual = %actual, "bind mismatch");
    Err(Fault::BindMismatch {
        pattern: pattern.source().to_string(),
        expr: expr_source.to_string(),
        actual,
    })
}

/// Apply a plain step's value to the environment, ignoring result tags.
pub(crate) fn plain_step(
    pattern: &Pattern,
    expr_source: &str,
    value: Term,
    env: &mut Bindings,
) -> Result<(), Fault> {
    match pattern.matches(&value, env) {
        Some(captured) => {
            env.merge(captured);
            Ok(())
        }
        None => Err(Fault::PlainMismatch {
            pattern: pattern.source().to_string(),
            expr: expr_source.to_string(),
            actual: value,
        }),
    }
}

/// Validate or wrap a closing value according to `mode`.
pub(crate) fn finalize(mode: Mode, expr_source: &str, value: Term) -> Result<Term, Fault> {
    match mode {
        _ if value.is_result() => Ok(value),
        Mode::AutoWrap => Ok(Term::ok(value)),
        Mode::Strict => {
            #[cfg(feature = "tracing")]
            tracing::debug!(expr = expr_source, actual = %value, "bad final value");
            Err(Fault::BadFinalValue {
                expr: expr_source.to_string(),
                actual: value,
            })
        }
    }
}

fn passthrough(reason: Term) -> Term {
    #[cfg(feature = "tracing")]
    tracing::debug!(reason = %reason, "no recovery clause matched, passing failure through");
    Term::error(reason)
}

fn otherwise(clauses: &Clauses, reason: Term, env: &Bindings) -> Term {
    match clauses.select(&reason, env) {
        Some((clause, scope)) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(reason = %reason, clause = %clause.pattern(), "otherwise clause fired");
            clause.body().eval(&scope)
        }
        None => passthrough(reason),
    }
}
