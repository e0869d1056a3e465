//! Compositions whose steps are awaited.
//!
//! Each step's future is awaited to completion before the next step starts;
//! steps never run concurrently. Step rules, faults and handlers are the same
//! as for the synchronous [`Composition::run`]. Recovery and otherwise clause
//! bodies stay synchronous.
//!
//! Step expressions receive the environment by reference and must return a
//! `'static` future, so clone what the future needs out of the bindings
//! first.
//!
//! # Examples
//!
//! ```
//! use futures::FutureExt;
//! use sluice::compose::Composition;
//! use sluice::Term;
//!
//! # tokio_test::block_on(async {
//! let c = Composition::strict_async()
//!     .bind("a", "fetch()", |_| async { Term::ok(20) }.boxed())
//!     .finish("Term::ok(a + 1)", |env| {
//!         let a = env.i64("a").unwrap_or(0);
//!         async move { Term::ok(a + 1) }.boxed()
//!     })
//!     .unwrap();
//!
//! assert_eq!(c.run().await, Ok(Term::ok(21)));
//! # });
//! ```

use std::fmt;

use futures::future::BoxFuture;

use super::engine::{bind_step, finalize, plain_step, CompositionBuilder, Mode};
use super::step::{Line, Step, StepExpr};
use super::Composition;
use crate::{Bindings, Fault, Term};

/// An awaited step expression together with its source text.
pub struct AsyncExpr {
    source: String,
    func: Box<dyn Fn(&Bindings) -> BoxFuture<'static, Term> + Send + Sync>,
}

impl AsyncExpr {
    /// Wrap `func` with the text it stands for.
    pub fn new<F>(source: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Bindings) -> BoxFuture<'static, Term> + Send + Sync + 'static,
    {
        AsyncExpr {
            source: source.into(),
            func: Box::new(func),
        }
    }

    async fn eval(&self, env: &Bindings) -> Term {
        (self.func)(env).await
    }
}

impl StepExpr for AsyncExpr {
    fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for AsyncExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AsyncExpr").field(&self.source).finish()
    }
}

/// A composition of awaited steps.
pub type AsyncComposition = Composition<AsyncExpr>;

impl Composition<AsyncExpr> {
    /// Start a strict composition of awaited steps.
    pub fn strict_async() -> CompositionBuilder<AsyncExpr> {
        CompositionBuilder::new(Mode::Strict)
    }

    /// Start an auto-wrap composition of awaited steps.
    pub fn auto_wrap_async() -> CompositionBuilder<AsyncExpr> {
        CompositionBuilder::new(Mode::AutoWrap)
    }

    /// Await every step in order and produce the composition's result.
    ///
    /// # Errors
    ///
    /// The same faults as the synchronous [`Composition::run`].
    pub async fn run(&self) -> Result<Term, Fault> {
        let mut env = Bindings::new();
        for line in &self.body {
            match line {
                Line::Bind { pattern, expr } => {
                    let value = expr.eval(&env).await;
                    if let Some(reason) = bind_step(pattern, expr.source(), value, &mut env)? {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(step = %pattern, reason = %reason, "composition short-circuited");
                        return self.on_failure(reason, &env);
                    }
                }
                Line::Plain { pattern, expr } => {
                    let value = expr.eval(&env).await;
                    plain_step(pattern, expr.source(), value, &mut env)?;
                }
            }
        }
        let value = self.last.eval(&env).await;
        let value = finalize(self.mode, self.last.source(), value)?;
        Ok(self.on_final(value, &env))
    }
}

impl CompositionBuilder<AsyncExpr> {
    /// Add an awaited binding step `pattern <- expr`.
    pub fn bind<F>(self, pattern: &str, expr_source: &str, expr: F) -> Self
    where
        F: Fn(&Bindings) -> BoxFuture<'static, Term> + Send + Sync + 'static,
    {
        self.push(Step::bind(pattern, AsyncExpr::new(expr_source, expr)))
    }

    /// Add an awaited plain step `pattern = expr`.
    pub fn step<F>(self, pattern: &str, expr_source: &str, expr: F) -> Self
    where
        F: Fn(&Bindings) -> BoxFuture<'static, Term> + Send + Sync + 'static,
    {
        self.push(Step::plain(pattern, AsyncExpr::new(expr_source, expr)))
    }

    /// Add the awaited final step and validate the whole composition.
    pub fn finish<F>(
        self,
        expr_source: &str,
        expr: F,
    ) -> Result<Composition<AsyncExpr>, super::BuildError>
    where
        F: Fn(&Bindings) -> BoxFuture<'static, Term> + Send + Sync + 'static,
    {
        self.finish_with(AsyncExpr::new(expr_source, expr))
    }
}
