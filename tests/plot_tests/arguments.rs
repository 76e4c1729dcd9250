use super::*;
use std::collections::BTreeSet;
use symplot::functions::arguments::{PlotRequest, unpack_args};
use symplot::{CanonicalArgs, Symbol};

fn canonical(input: &str, nexpr: usize, arity: usize) -> Vec<CanonicalArgs> {
  PlotRequest::from_args(args(input), nexpr)
    .unwrap()
    .canonicalize(nexpr, arity, &BTreeSet::new(), &PlotConfig::default())
    .unwrap()
}

mod unpack {
  use super::*;

  #[test]
  fn separates_expressions_ranges_and_label() {
    let (exprs, ranges, label) =
      unpack_args(&args(r#"sin(x), (x, -5, 5), "f""#));
    assert_eq!(exprs.len(), 1);
    assert_eq!(ranges.len(), 1);
    assert_eq!(label, "f");
  }

  #[test]
  fn label_defaults_to_the_expression() {
    let (_, _, label) = unpack_args(&args("sin(x), (x, -5, 5)"));
    assert_eq!(label, "sin(x)");
  }

  #[test]
  fn label_of_several_expressions_is_a_tuple() {
    let (exprs, ranges, label) = unpack_args(&args("cos(t), sin(t)"));
    assert_eq!(exprs.len(), 2);
    assert!(ranges.is_empty());
    assert_eq!(label, "(cos(t), sin(t))");
  }

  #[test]
  fn first_label_wins() {
    let (_, _, label) = unpack_args(&args(r#"x, "a", "b""#));
    assert_eq!(label, "a");
  }
}

mod shared_range {
  use super::*;

  #[test]
  fn expressions_share_the_range() {
    let c = canonical("sin(x), cos(x), (x, -5, 5)", 1, 1);
    assert_eq!(c.len(), 2);
    assert_eq!(c[0].label, "sin(x)");
    assert_eq!(c[1].label, "cos(x)");
    for a in &c {
      assert_eq!(a.ranges.len(), 1);
      assert_eq!(a.ranges[0].symbol.name(), "x");
      assert_eq!(a.ranges[0].start.re, -5.0);
    }
  }

  #[test]
  fn parametric_expressions_are_chunked() {
    let c = canonical("cos(t), sin(t), (t, 0, 6)", 2, 1);
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].exprs.len(), 2);
    assert_eq!(c[0].label, "(cos(t), sin(t))");
  }

  #[test]
  fn uneven_chunks_are_rejected() {
    let request =
      PlotRequest::from_args(args("cos(t), sin(t), t, (t, 0, 1)"), 2).unwrap();
    let result =
      request.canonicalize(2, 1, &BTreeSet::new(), &PlotConfig::default());
    assert!(matches!(result, Err(PlotError::MalformedArguments(_))));
  }

  #[test]
  fn missing_range_gets_the_default() {
    let c = canonical("x^2", 1, 1);
    assert_eq!(c[0].ranges[0].symbol.name(), "x");
    assert_eq!(c[0].ranges[0].start.re, -10.0);
    assert_eq!(c[0].ranges[0].end.re, 10.0);
  }

  #[test]
  fn parameters_need_no_range() {
    let params: BTreeSet<Symbol> = [Symbol::new("u")].into_iter().collect();
    let c = PlotRequest::from_args(args("sin(u*x), (x, 0, 1)"), 1)
      .unwrap()
      .canonicalize(1, 1, &params, &PlotConfig::default())
      .unwrap();
    assert_eq!(c[0].ranges.len(), 1);
    assert_eq!(c[0].ranges[0].symbol.name(), "x");
  }

  #[test]
  fn trailing_groups_are_malformed() {
    let result = PlotRequest::from_args(args(r#"sin(x), (cos(x), "b")"#), 1);
    match result {
      Err(PlotError::MalformedArguments(msg)) => {
        assert!(msg.starts_with("Expressions must be followed by ranges"));
      }
      other => panic!("expected malformed arguments, got {other:?}"),
    }
  }
}

mod per_group {
  use super::*;

  #[test]
  fn local_ranges_override_global_ones() {
    let c = canonical(
      r#"(sin(x), (x, 0, 1), "a"), (cos(x), "b"), (x, -2, 2)"#,
      1,
      1,
    );
    assert_eq!(c.len(), 2);
    assert_eq!(c[0].label, "a");
    assert_eq!(c[0].ranges[0].end.re, 1.0);
    assert_eq!(c[1].label, "b");
    assert_eq!(c[1].ranges[0].start.re, -2.0);
  }

  #[test]
  fn group_rendering_options_win() {
    let c = canonical(
      r#"(x, {"color": "red"}), (x^2, "sq"), {"color": "blue"}"#,
      1,
      1,
    );
    assert_eq!(c[0].rendering_kw["color"], "red");
    assert_eq!(c[1].rendering_kw["color"], "blue");
    assert_eq!(c[0].label, "x");
  }

  #[test]
  fn group_must_start_with_expressions() {
    let result = PlotRequest::from_args(args(r#"("a", x), (x, 0, 1)"#), 1);
    assert!(matches!(result, Err(PlotError::MalformedArguments(_))));
  }
}
