//! Integration tests for awaited compositions
#![cfg(feature = "async")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use sluice::compose::{Clauses, Composition};
use sluice::{assert_fault, Term};

async fn safe_div(a: f64, b: f64) -> Term {
    tokio::time::sleep(Duration::from_millis(1)).await;
    if b == 0.0 {
        Term::error(Term::atom("zero_division"))
    } else {
        Term::ok(a / b)
    }
}

#[tokio::test]
async fn test_async_threading() {
    let c = Composition::strict_async()
        .bind("a", "safe_div(8, 2)", |_| safe_div(8.0, 2.0).boxed())
        .bind("b", "safe_div(a, 2)", |env| {
            let a = env.f64("a").unwrap_or(f64::NAN);
            safe_div(a, 2.0).boxed()
        })
        .finish("{:ok, a + b}", |env| {
            let sum = env.f64("a").unwrap_or(f64::NAN) + env.f64("b").unwrap_or(f64::NAN);
            async move { Term::ok(sum) }.boxed()
        })
        .unwrap();

    assert_eq!(c.run().await, Ok(Term::ok(6.0)));
}

#[tokio::test]
async fn test_async_short_circuit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);

    let c = Composition::strict_async()
        .bind("a", "safe_div(8, 0)", |_| safe_div(8.0, 0.0).boxed())
        .bind("b", "count()", move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
            async { Term::ok(1) }.boxed()
        })
        .finish("{:ok, b}", |env| {
            let b = env["b"].clone();
            async move { Term::ok(b) }.boxed()
        })
        .unwrap();

    assert_eq!(c.run().await, Ok(Term::error(Term::atom("zero_division"))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_async_recovery_and_passthrough() {
    let recovering = |reason: &'static str| {
        Composition::strict_async()
            .bind("a", "fetch()", move |_| {
                async move { Term::error(Term::atom(reason)) }.boxed()
            })
            .recover(Clauses::new().on(":timeout", "{:ok, :cached}", |_| {
                Term::ok(Term::atom("cached"))
            }))
            .finish("{:ok, a}", |env| {
                let a = env["a"].clone();
                async move { Term::ok(a) }.boxed()
            })
            .unwrap()
    };

    assert_eq!(
        recovering("timeout").run().await,
        Ok(Term::ok(Term::atom("cached")))
    );
    assert_eq!(
        recovering("refused").run().await,
        Ok(Term::error(Term::atom("refused")))
    );
}

#[tokio::test]
async fn test_async_faults_match_sync_engine() {
    let c = Composition::strict_async()
        .bind("b", "bar(a)", |_| {
            async { Term::tuple([Term::atom("bad"), Term::from(6)]) }.boxed()
        })
        .finish("{:ok, b}", |env| {
            let b = env["b"].clone();
            async move { Term::ok(b) }.boxed()
        })
        .unwrap();

    let fault = c.run().await.unwrap_err();
    assert!(fault.to_string().contains("bar(a) :: {:bad, 6}"));

    let c = Composition::strict_async()
        .finish("42", |_| async { Term::from(42) }.boxed())
        .unwrap();
    assert_fault!(c.run().await, "bad_final_value");
}

#[tokio::test]
async fn test_async_auto_wrap() {
    let c = Composition::auto_wrap_async()
        .step("n", "21 * 2", |_| async { Term::from(42) }.boxed())
        .finish("n", |env| {
            let n = env["n"].clone();
            async move { n }.boxed()
        })
        .unwrap();

    assert_eq!(c.run().await, Ok(Term::ok(42)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_run_on_spawned_task() {
    let c = Composition::strict_async()
        .bind("a", "safe_div(8, 0)", |_| safe_div(8.0, 0.0).boxed())
        .recover(Clauses::new().on("_", "{:ok, :fallback}", |_| {
            Term::ok(Term::atom("fallback"))
        }))
        .finish("{:ok, a}", |env| {
            let a = env["a"].clone();
            async move { Term::ok(a) }.boxed()
        })
        .unwrap();

    let handle = tokio::spawn(async move { c.run().await });
    assert_eq!(
        handle.await.unwrap(),
        Ok(Term::ok(Term::atom("fallback")))
    );
}
