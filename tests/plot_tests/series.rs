use super::*;
use num_complex::Complex64;
use std::collections::{BTreeMap, HashMap};
use symplot::expression::lambda;
use symplot::functions::{
  plot, plot_implicit, plot_parametric, plot_vector, plot3d,
};
use symplot::sampling::Scale;
use symplot::series::SeriesState;
use symplot::{PlotWarning, Range, Series, SeriesKind, Symbol};

fn opts_n(n: usize) -> PlotOptions {
  PlotOptions {
    n: Some(n),
    ..Default::default()
  }
}

fn line(data: &SeriesData) -> (Vec<f64>, Vec<f64>) {
  match data {
    SeriesData::Line { x, y } => (x.to_vec(), y.to_vec()),
    other => panic!("expected a line, got {other:?}"),
  }
}

mod lines {
  use super::*;

  #[test]
  fn samples_a_parabola() {
    let cfg = PlotConfig::default();
    let mut p = plot(args("x^2, (x, 0, 2)"), &opts_n(3), &cfg).unwrap();
    let (x, y) = line(p.series[0].get_data().unwrap());
    assert_eq!(x, vec![0.0, 1.0, 2.0]);
    assert!(y.iter().zip([0.0, 1.0, 4.0]).all(|(&a, b)| close(a, b)));
    assert_eq!(p.xlabel.as_deref(), Some("x"));
  }

  #[test]
  fn logarithmic_spacing() {
    let opts = PlotOptions {
      n: Some(3),
      xscale: Scale::Log,
      ..Default::default()
    };
    let mut p =
      plot(args("x, (x, 1, 100)"), &opts, &PlotConfig::default()).unwrap();
    let (x, _) = line(p.series[0].get_data().unwrap());
    assert!(close(x[0], 1.0) && close(x[1], 10.0) && close(x[2], 100.0));
  }

  #[test]
  fn constant_expression_fills_the_range() {
    let mut p =
      plot(args("5, (x, 0, 1)"), &opts_n(4), &PlotConfig::default()).unwrap();
    let (x, y) = line(p.series[0].get_data().unwrap());
    assert_eq!(x.len(), 4);
    assert_eq!(y, vec![5.0; 4]);
  }

  #[test]
  fn complex_values_become_nan() {
    let mut p =
      plot(args("sqrt(x), (x, -1, 1)"), &opts_n(3), &PlotConfig::default())
        .unwrap();
    let (_, y) = line(p.series[0].get_data().unwrap());
    assert!(y[0].is_nan());
    assert_eq!(y[1], 0.0);
    assert_eq!(y[2], 1.0);
  }

  #[test]
  fn default_discretization_comes_from_config() {
    let cfg = PlotConfig {
      n_line: 17,
      ..Default::default()
    };
    let mut p = plot(args("sin(x)"), &PlotOptions::default(), &cfg).unwrap();
    let (x, _) = line(p.series[0].get_data().unwrap());
    assert_eq!(x.len(), 17);
  }

  #[test]
  fn adaptive_sampling_respects_the_bounds() {
    let opts = PlotOptions {
      adaptive: true,
      ..Default::default()
    };
    let mut p =
      plot(args("abs(x), (x, -1, 1)"), &opts, &PlotConfig::default()).unwrap();
    assert!(p.series[0].is_adaptive());
    let (x, y) = line(p.series[0].get_data().unwrap());
    assert_eq!(x.first(), Some(&-1.0));
    assert_eq!(x.last(), Some(&1.0));
    assert_eq!(x.len(), y.len());
  }

  #[test]
  fn numeric_closures_can_be_plotted() {
    let f = lambda("double", 1, |v| v[0] * 2.0);
    let mut p = plot(
      vec![PlotArg::Expr(f), PlotArg::range("t", 0.0, 1.0)],
      &opts_n(2),
      &PlotConfig::default(),
    )
    .unwrap();
    let (_, y) = line(p.series[0].get_data().unwrap());
    assert_eq!(y, vec![0.0, 2.0]);
    assert_eq!(p.xlabel.as_deref(), Some("t"));
  }
}

mod caching {
  use super::*;

  #[test]
  fn get_data_is_idempotent() {
    let mut p =
      plot(args("cos(x)"), &opts_n(20), &PlotConfig::default()).unwrap();
    let s = &mut p.series[0];
    assert!(matches!(s.state(), SeriesState::Stale));
    let first = s.get_data().unwrap().clone();
    let second = s.get_data().unwrap().clone();
    assert_eq!(first, second);
    assert!(s.data().is_some());
  }

  #[test]
  fn update_data_rebinds_parameters() {
    let opts = PlotOptions {
      n: Some(2),
      params: BTreeMap::from([(Symbol::new("u"), Complex64::new(1.0, 0.0))]),
      ..Default::default()
    };
    let mut p =
      plot(args("u*x, (x, 0, 1)"), &opts, &PlotConfig::default()).unwrap();
    let s = &mut p.series[0];
    assert!(s.is_interactive());
    assert_eq!(line(s.get_data().unwrap()).1, vec![0.0, 1.0]);

    let bindings = HashMap::from([
      (Symbol::new("u"), Complex64::new(3.0, 0.0)),
      (Symbol::new("unused"), Complex64::new(9.0, 0.0)),
    ]);
    let (_, y) = line(s.update_data(&bindings).unwrap());
    assert_eq!(y, vec![0.0, 3.0]);
  }

  #[test]
  fn interactive_matches_substituted_expression() {
    let cfg = PlotConfig::default();
    let opts = PlotOptions {
      n: Some(9),
      params: BTreeMap::from([(Symbol::new("a"), Complex64::new(2.0, 0.0))]),
      ..Default::default()
    };
    let mut interactive =
      plot(args("sin(a*x), (x, -3, 3)"), &opts, &cfg).unwrap();
    let mut fixed =
      plot(args("sin(2*x), (x, -3, 3)"), &opts_n(9), &cfg).unwrap();
    assert_eq!(
      interactive.series[0].get_data().unwrap(),
      fixed.series[0].get_data().unwrap()
    );
  }
}

mod options {
  use super::*;

  #[test]
  fn no_series_is_a_warning() {
    let p = plot(vec![], &PlotOptions::default(), &PlotConfig::default())
      .unwrap();
    assert!(p.series.is_empty());
    assert_eq!(p.warnings, vec![PlotWarning::NoSeries]);
  }

  #[test]
  fn bare_series_take_the_default_config_discretization() {
    let cfg = PlotConfig::default();
    for kind in [SeriesKind::Line, SeriesKind::ComplexLine] {
      let f = lambda("f", 1, |v| v[0]);
      let s = Series::new(kind, vec![f], vec![Range::new("x", 0.0, 1.0)], "")
        .unwrap();
      assert_eq!(s.n(), [cfg.points(kind); 3]);
    }
  }

  #[test]
  fn labels_replace_argument_labels() {
    let opts = PlotOptions {
      label: vec!["a".into(), "b".into()],
      ..Default::default()
    };
    let p = plot(args("x, x^2"), &opts, &PlotConfig::default()).unwrap();
    assert_eq!(p.series[0].label, "a");
    assert_eq!(p.series[1].label, "b");
  }

  #[test]
  fn label_count_must_match() {
    let opts = PlotOptions {
      label: vec!["a".into(), "b".into()],
      ..Default::default()
    };
    assert!(matches!(
      plot(args("x"), &opts, &PlotConfig::default()),
      Err(PlotError::MalformedArguments(_))
    ));
  }

  #[test]
  fn single_rendering_kw_applies_to_all() {
    let kw = serde_json::json!({ "color": "k" });
    let opts = PlotOptions {
      rendering_kw: vec![kw.as_object().unwrap().clone()],
      ..Default::default()
    };
    let p = plot(args("x, x^2"), &opts, &PlotConfig::default()).unwrap();
    assert!(p.series.iter().all(|s| s.rendering_kw["color"] == "k"));
  }
}

mod other_kinds {
  use super::*;

  #[test]
  fn parametric_line() {
    let mut p = plot_parametric(
      args("cos(t), sin(t), (t, 0, 2*pi)"),
      &opts_n(5),
      &PlotConfig::default(),
    )
    .unwrap();
    assert_eq!(p.series[0].kind(), SeriesKind::Parametric2DLine);
    match p.series[0].get_data().unwrap() {
      SeriesData::Parametric2DLine { x, y, param } => {
        assert_eq!(param.len(), 5);
        assert!(close(x[0], 1.0) && close(y[0], 0.0));
        assert!(close(x[2], -1.0));
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn surface_shape_follows_xy_indexing() {
    let opts = PlotOptions {
      n1: Some(3),
      n2: Some(4),
      ..Default::default()
    };
    let mut p = plot3d(
      args("x*y, (x, 0, 1), (y, 0, 2)"),
      &opts,
      &PlotConfig::default(),
    )
    .unwrap();
    assert_eq!(p.zlabel.as_deref(), Some("f(x, y)"));
    match p.series[0].get_data().unwrap() {
      SeriesData::Surface { x, z, .. } => {
        assert_eq!(z.shape(), &[4, 3]);
        assert_eq!(x[[3, 2]], 1.0);
        assert!(close(z[[3, 2]], 2.0));
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn implicit_equation_is_shifted_to_zero() {
    let mut p = plot_implicit(
      args("x^2 + y^2 == 1, (x, -2, 2), (y, -2, 2)"),
      &opts_n(5),
      &PlotConfig::default(),
    )
    .unwrap();
    match p.series[0].get_data().unwrap() {
      SeriesData::Implicit { z, equality, .. } => {
        assert!(*equality);
        assert!(close(z[[2, 2]], -1.0));
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn implicit_inequality_is_a_mask() {
    let mut p = plot_implicit(
      args("x < y, (x, -2, 2), (y, -2, 2)"),
      &opts_n(5),
      &PlotConfig::default(),
    )
    .unwrap();
    match p.series[0].get_data().unwrap() {
      SeriesData::Implicit { z, equality, .. } => {
        assert!(!*equality);
        assert_eq!(z[[4, 0]], 1.0);
        assert_eq!(z[[0, 4]], 0.0);
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn vector_field_from_a_list() {
    let mut p = plot_vector(
      args("[-y, x], (x, -1, 1), (y, -1, 1)"),
      &opts_n(3),
      &PlotConfig::default(),
    )
    .unwrap();
    assert_eq!(p.series[0].kind(), SeriesKind::Vector2D);
    match p.series[0].get_data().unwrap() {
      SeriesData::Vector2D { u, v, .. } => {
        assert_eq!(u.shape(), &[3, 3]);
        assert_eq!(u[[0, 0]], 1.0);
        assert_eq!(v[[0, 0]], -1.0);
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn vector_field_needs_two_or_three_components() {
    let result = plot_vector(
      args("x, y, x, y, (x, 0, 1), (y, 0, 1)"),
      &PlotOptions::default(),
      &PlotConfig::default(),
    );
    assert!(matches!(result, Err(PlotError::MalformedArguments(_))));
  }
}
