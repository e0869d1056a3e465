use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::{Bindings, Fault, Term};

fn safe_div(a: &Term, b: &Term) -> Term {
    match (a.as_f64(), b.as_f64()) {
        (Some(_), Some(b)) if b == 0.0 => Term::error(Term::atom("zero_division")),
        (Some(a), Some(b)) => Term::ok(a / b),
        _ => Term::error(Term::atom("badarg")),
    }
}

fn zero_division() -> Term {
    Term::atom("zero_division")
}

#[test]
fn test_threads_bindings_forward() {
    let c = Composition::strict()
        .bind("a", "safe_div(8, 2)", |_| safe_div(&Term::from(8), &Term::from(2)))
        .bind("b", "safe_div(a, 2)", |env| safe_div(&env["a"], &Term::from(2)))
        .finish("{:ok, a + b}", |env| {
            Term::ok(env.f64("a").unwrap_or(0.0) + env.f64("b").unwrap_or(0.0))
        })
        .unwrap();

    assert_eq!(c.run(), Ok(Term::ok(6.0)));
}

#[test]
fn test_short_circuits_on_first_failure() {
    let later = Rc::new(Cell::new(0));
    let counter = Rc::clone(&later);

    let c = Composition::strict()
        .bind("a", "safe_div(8, 2)", |_| safe_div(&Term::from(8), &Term::from(2)))
        .bind("b", "safe_div(a, 0)", |env| safe_div(&env["a"], &Term::from(0)))
        .bind("c", "count()", move |_| {
            counter.set(counter.get() + 1);
            Term::ok(0)
        })
        .finish("{:ok, c}", |env| Term::ok(env["c"].clone()))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::error(zero_division())));
    assert_eq!(later.get(), 0);
}

#[test]
fn test_bad_bind_fault_quotes_source() {
    let bar = |a: &Term| Term::tuple([Term::atom("bad"), a.clone()]);

    let c = Composition::strict()
        .bind("a", "foo()", |_| Term::ok(6))
        .bind("b", "bar(a)", move |env| bar(&env["a"]))
        .finish("{:ok, b}", |env| Term::ok(env["b"].clone()))
        .unwrap();

    let fault = c.run().unwrap_err();
    let message = fault.to_string();
    assert!(message.contains("b <- bar(a)"));
    assert!(message.contains("bar(a) :: {:ok, b} | {:error, reason}"));
    assert!(message.contains("bar(a) :: {:bad, 6}"));
}

#[test]
fn test_success_with_unmatched_payload_is_a_fault() {
    let c = Composition::strict()
        .bind("{x, y}", "pair()", |_| Term::ok(Term::list([1, 2])))
        .finish("{:ok, x}", |env| Term::ok(env["x"].clone()))
        .unwrap();

    assert_eq!(
        c.run(),
        Err(Fault::BindMismatch {
            pattern: "{x, y}".to_string(),
            expr: "pair()".to_string(),
            actual: Term::ok(Term::list([1, 2])),
        })
    );
}

#[test]
fn test_plain_steps_do_not_inspect_tags() {
    let c = Composition::strict()
        .step("e", "Term::error(:nope)", |_| Term::error(Term::atom("nope")))
        .step("_", "log()", |_| Term::nil())
        .finish("{:ok, e}", |env| Term::ok(env["e"].clone()))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::ok(Term::error(Term::atom("nope")))));
}

#[test]
fn test_plain_step_pattern_mismatch() {
    let c = Composition::strict()
        .step("{:ok, v}", "lookup()", |_| Term::nil())
        .finish("{:ok, v}", |env| Term::ok(env["v"].clone()))
        .unwrap();

    let fault = c.run().unwrap_err();
    assert_eq!(fault.kind(), "plain_mismatch");
    assert!(fault.to_string().contains("lookup() :: nil"));
}

#[test]
fn test_pattern_destructures_success_payload() {
    let c = Composition::strict()
        .bind("{name, [first | _]}", "load()", |_| {
            Term::ok(Term::tuple([Term::from("ada"), Term::list([3, 4])]))
        })
        .finish("{:ok, {name, first}}", |env| {
            Term::ok(Term::tuple([env["name"].clone(), env["first"].clone()]))
        })
        .unwrap();

    assert_eq!(
        c.run(),
        Ok(Term::ok(Term::tuple([Term::from("ada"), Term::from(3)])))
    );
}

#[test]
fn test_later_binding_shadows_earlier() {
    let c = Composition::strict()
        .bind("a", "one()", |_| Term::ok(1))
        .bind("a", "inc(a)", |env| Term::ok(env.i64("a").unwrap_or(0) + 1))
        .finish("{:ok, a}", |env| Term::ok(env["a"].clone()))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::ok(2)));
}

#[test]
fn test_pin_checks_earlier_binding() {
    let c = Composition::strict()
        .bind("expected", "checksum()", |_| Term::ok(42))
        .bind("^expected", "recompute()", |_| Term::ok(41))
        .finish("{:ok, :verified}", |_| Term::ok(Term::atom("verified")))
        .unwrap();

    assert_eq!(c.run().unwrap_err().kind(), "bind_mismatch");
}

#[test]
fn test_strict_final_must_be_result() {
    let c = Composition::strict().finish("42", |_| Term::from(42)).unwrap();
    assert_eq!(
        c.run(),
        Err(Fault::BadFinalValue {
            expr: "42".to_string(),
            actual: Term::from(42),
        })
    );
}

#[test]
fn test_strict_final_failure_is_returned() {
    let c = Composition::strict()
        .finish("{:error, :late}", |_| Term::error(Term::atom("late")))
        .unwrap();
    assert_eq!(c.run(), Ok(Term::error(Term::atom("late"))));
}

#[test]
fn test_auto_wrap_wraps_plain_final_value() {
    let c = Composition::auto_wrap().finish("42", |_| Term::from(42)).unwrap();
    assert_eq!(c.run(), Ok(Term::ok(42)));
}

#[test]
fn test_auto_wrap_keeps_result_final_value() {
    let c = Composition::auto_wrap()
        .finish("{:error, :x}", |_| Term::error(Term::atom("x")))
        .unwrap();
    assert_eq!(c.run(), Ok(Term::error(Term::atom("x"))));
}

#[test]
fn test_recovery_match() {
    let c = Composition::strict()
        .bind("a", "safe_div(8, 0)", |_| safe_div(&Term::from(8), &Term::from(0)))
        .recover(
            Clauses::new().on(":zero_division", "{:ok, :inf}", |_| Term::ok(Term::atom("inf"))),
        )
        .finish("{:ok, a}", |env| Term::ok(env["a"].clone()))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::ok(Term::atom("inf"))));
}

#[test]
fn test_recovery_passthrough() {
    let c = Composition::strict()
        .bind("a", "other()", |_| Term::error(Term::atom("other_reason")))
        .recover(
            Clauses::new().on(":zero_division", "{:ok, :inf}", |_| Term::ok(Term::atom("inf"))),
        )
        .finish("{:ok, a}", |env| Term::ok(env["a"].clone()))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::error(Term::atom("other_reason"))));
}

#[test]
fn test_recovery_first_match_wins() {
    let c = Composition::strict()
        .bind("_", "fetch()", |_| {
            Term::error(Term::tuple([Term::atom("http"), Term::from(404)]))
        })
        .recover(
            Clauses::new()
                .on("{:http, 404}", "{:ok, :missing}", |_| Term::ok(Term::atom("missing")))
                .on("{:http, code}", "{:error, code}", |env| Term::error(env["code"].clone())),
        )
        .finish("{:ok, :found}", |_| Term::ok(Term::atom("found")))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::ok(Term::atom("missing"))));
}

#[test]
fn test_recovery_body_sees_reason_and_prior_bindings() {
    let c = Composition::strict()
        .bind("user", "load_user()", |_| Term::ok(Term::from("ada")))
        .bind("_", "charge(user)", |_| Term::error(Term::atom("card_declined")))
        .recover(Clauses::new().on("reason", "{:error, {user, reason}}", |env| {
            Term::error(Term::tuple([env["user"].clone(), env["reason"].clone()]))
        }))
        .finish("{:ok, :charged}", |_| Term::ok(Term::atom("charged")))
        .unwrap();

    assert_eq!(
        c.run(),
        Ok(Term::error(Term::tuple([
            Term::from("ada"),
            Term::atom("card_declined")
        ])))
    );
}

#[test]
fn test_strict_recovery_body_must_be_result() {
    let c = Composition::strict()
        .bind("a", "fail()", |_| Term::error(Term::atom("x")))
        .recover(Clauses::new().on("_", "0", |_| Term::from(0)))
        .finish("{:ok, a}", |env| Term::ok(env["a"].clone()))
        .unwrap();

    assert_eq!(c.run().unwrap_err().kind(), "bad_final_value");
}

#[test]
fn test_auto_wrap_recovery_body_is_wrapped() {
    let c = Composition::auto_wrap()
        .bind("a", "fail()", |_| Term::error(Term::atom("x")))
        .recover(Clauses::new().on("_", "0", |_| Term::from(0)))
        .finish("a", |env| env["a"].clone())
        .unwrap();

    assert_eq!(c.run(), Ok(Term::ok(0)));
}

#[test]
fn test_recovery_ignores_final_step_failure() {
    let c = Composition::strict()
        .recover(Clauses::new().on("_", "{:ok, :recovered}", |_| {
            Term::ok(Term::atom("recovered"))
        }))
        .finish("{:error, :late}", |_| Term::error(Term::atom("late")))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::error(Term::atom("late"))));
}

#[test]
fn test_otherwise_returns_raw_value() {
    let c = Composition::auto_wrap()
        .bind("a", "safe_div(1, 0)", |_| safe_div(&Term::from(1), &Term::from(0)))
        .otherwise(Clauses::new().on(":zero_division", "\"cannot divide\"", |_| {
            Term::from("cannot divide")
        }))
        .finish("a", |env| env["a"].clone())
        .unwrap();

    assert_eq!(c.run(), Ok(Term::from("cannot divide")));
}

#[test]
fn test_otherwise_handles_failing_final_value() {
    let c = Composition::auto_wrap()
        .otherwise(Clauses::new().on("reason", "reason", |env| env["reason"].clone()))
        .finish("{:error, :late}", |_| Term::error(Term::atom("late")))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::atom("late")));
}

#[test]
fn test_otherwise_passthrough_and_success() {
    let build = |first: Term| {
        Composition::auto_wrap()
            .bind("a", "first()", move |_| first.clone())
            .otherwise(Clauses::new().on(":handled", "0", |_| Term::from(0)))
            .finish("a * 10", |env| Term::from(env.i64("a").unwrap_or(0) * 10))
            .unwrap()
    };

    assert_eq!(build(Term::ok(4)).run(), Ok(Term::ok(40)));
    assert_eq!(
        build(Term::error(Term::atom("unhandled"))).run(),
        Ok(Term::error(Term::atom("unhandled")))
    );
}

#[test]
fn test_runs_are_independent() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);

    let c = Composition::strict()
        .bind("n", "next()", move |_| {
            counter.set(counter.get() + 1);
            Term::ok(counter.get())
        })
        .finish("{:ok, n}", |env| Term::ok(env["n"].clone()))
        .unwrap();

    assert_eq!(c.run(), Ok(Term::ok(1)));
    assert_eq!(c.run(), Ok(Term::ok(2)));
}

#[test]
fn test_builder_reports_bad_pattern() {
    let err = Composition::strict()
        .bind("{a,", "x()", |_| Term::ok(1))
        .finish("{:ok, 1}", |_| Term::ok(1))
        .unwrap_err();
    assert!(matches!(err, BuildError::Pattern(ref e) if e.input == "{a,"));
}

#[test]
fn test_builder_reports_bad_clause_pattern() {
    let err = Composition::strict()
        .recover(Clauses::new().on("{", "x", |_| Term::nil()))
        .finish("{:ok, 1}", |_| Term::ok(1))
        .unwrap_err();
    assert!(matches!(err, BuildError::Pattern(_)));
}

#[test]
fn test_otherwise_requires_auto_wrap() {
    let err = Composition::strict()
        .otherwise(Clauses::new())
        .finish("{:ok, 1}", |_| Term::ok(1))
        .unwrap_err();
    assert_eq!(err, BuildError::OtherwiseRequiresAutoWrap);
}

#[test]
fn test_conflicting_handlers() {
    let err = Composition::auto_wrap()
        .recover(Clauses::new())
        .otherwise(Clauses::new())
        .finish("1", |_| Term::from(1))
        .unwrap_err();
    assert_eq!(err, BuildError::ConflictingHandlers);
}

#[test]
fn test_from_steps_validation() {
    let empty: Vec<Step> = Vec::new();
    assert_eq!(
        Composition::from_steps(Mode::Strict, empty).unwrap_err(),
        BuildError::EmptySteps
    );

    let no_final = vec![Step::bind("a", Expr::new("x()", |_| Term::ok(1))).unwrap()];
    assert_eq!(
        Composition::from_steps(Mode::Strict, no_final).unwrap_err(),
        BuildError::MissingFinal
    );

    let misplaced = vec![
        Step::last(Expr::new("{:ok, 1}", |_| Term::ok(1))),
        Step::last(Expr::new("{:ok, 2}", |_| Term::ok(2))),
    ];
    assert_eq!(
        Composition::from_steps(Mode::Strict, misplaced).unwrap_err(),
        BuildError::FinalNotLast { index: 0 }
    );
}

#[test]
fn test_from_steps_runs() {
    let steps = vec![
        Step::bind("a", Expr::new("safe_div(9, 3)", |_| {
            safe_div(&Term::from(9), &Term::from(3))
        }))
        .unwrap(),
        Step::plain("b", Expr::new("a + 1", |env: &Bindings| {
            Term::from(env.f64("a").unwrap_or(0.0) + 1.0)
        }))
        .unwrap(),
        Step::last(Expr::new("b", |env: &Bindings| env["b"].clone())),
    ];

    let c = Composition::from_steps(Mode::AutoWrap, steps)
        .unwrap()
        .with_recovery(Clauses::new())
        .unwrap();
    assert_eq!(c.len(), 3);
    assert_eq!(c.mode(), Mode::AutoWrap);
    assert_eq!(c.run(), Ok(Term::ok(4.0)));
}

#[test]
fn test_with_handler_twice_conflicts() {
    let c = Composition::auto_wrap().finish("1", |_| Term::from(1)).unwrap();
    let err = c
        .with_recovery(Clauses::new())
        .and_then(|c| c.with_otherwise(Clauses::new()))
        .unwrap_err();
    assert_eq!(err, BuildError::ConflictingHandlers);
}

#[test]
fn test_step_describe() {
    let step = Step::plain("_", Expr::new("log(a)", |_| Term::nil())).unwrap();
    assert_eq!(step.describe(), "_ = log(a)");

    let last: Step = Step::last(Expr::new("{:ok, a}", |_| Term::nil()));
    assert_eq!(last.describe(), "{:ok, a}");
}

#[cfg(feature = "tracing")]
mod tracing_tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_unreachable_clause_warns() {
        let clauses = Clauses::new()
            .on("_", "{:ok, 0}", |_| Term::ok(0))
            .on(":timeout", "{:ok, 1}", |_| Term::ok(1));
        assert_eq!(clauses.unreachable(), &[1]);
        assert!(logs_contain("clause can never match"));
    }

    #[traced_test]
    #[test]
    fn test_passthrough_is_logged() {
        let c = Composition::strict()
            .bind("a", "fail()", |_| Term::error(Term::atom("other_reason")))
            .recover(Clauses::new().on(":zero_division", "{:ok, 0}", |_| Term::ok(0)))
            .finish("{:ok, a}", |env| Term::ok(env["a"].clone()))
            .unwrap();

        assert_eq!(c.run(), Ok(Term::error(Term::atom("other_reason"))));
        assert!(logs_contain("composition short-circuited"));
        assert!(logs_contain("no recovery clause matched"));
    }
}
