use super::*;
use num_complex::Complex64;
use std::collections::{BTreeMap, HashMap};
use symplot::functions::{plot, plot_complex, plot_vector, plot3d};
use symplot::{Backend, JsonBackend, Symbol};

fn n(n: usize) -> PlotOptions {
  PlotOptions {
    n: Some(n),
    ..Default::default()
  }
}

mod json_backend {
  use super::*;

  #[test]
  fn renders_one_trace_per_series() {
    let mut p = plot(
      args(r#"x, x^2, (x, -2, 2), "sq""#),
      &n(3),
      &PlotConfig::default(),
    )
    .unwrap();
    let mut backend = JsonBackend::new();
    p.render(&mut backend).unwrap();
    assert_eq!(backend.traces().len(), 2);
    assert_eq!(p.handles(), &[0, 1]);
    let trace = &backend.traces()[1];
    assert_eq!(trace["kind"], "cartesian line");
    assert_eq!(trace["label"], "sq");
    assert_eq!(trace["data"]["y"][2], 4.0);
  }

  #[test]
  fn nan_becomes_null() {
    let mut p =
      plot(args("log(x), (x, -1, 1)"), &n(3), &PlotConfig::default()).unwrap();
    let mut backend = JsonBackend::new();
    p.render(&mut backend).unwrap();
    assert!(backend.traces()[0]["data"]["y"][0].is_null());
  }

  #[test]
  fn document_carries_labels_and_warnings() {
    let opts = PlotOptions {
      title: Some("empty".into()),
      ..Default::default()
    };
    let mut p = plot(vec![], &opts, &PlotConfig::default()).unwrap();
    let mut backend = JsonBackend::new();
    p.render(&mut backend).unwrap();
    let doc = backend.document(&p);
    assert_eq!(doc["title"], "empty");
    assert_eq!(
      doc["warnings"][0],
      "No series found. Check your keyword arguments."
    );
    assert_eq!(doc["traces"].as_array().unwrap().len(), 0);
  }

  #[test]
  fn surfaces_carry_a_triangle_mesh() {
    let mut p = plot3d(
      args("x + y, (x, 0, 1), (y, 0, 1)"),
      &n(3),
      &PlotConfig::default(),
    )
    .unwrap();
    let mut backend = JsonBackend::new();
    p.render(&mut backend).unwrap();
    let mesh = &backend.traces()[0]["data"]["mesh"];
    assert_eq!(mesh["vertices"].as_array().unwrap().len(), 9);
    assert_eq!(mesh["indices"].as_array().unwrap().len(), 8);
    assert_eq!(backend.document(&p)["is_3d"], true);
  }

  #[test]
  fn flat_domain_coloring_has_no_mesh() {
    let mut p = plot_complex(
      args("z, (z, -1 - I, 1 + I)"),
      &n(3),
      &PlotConfig::default(),
    )
    .unwrap();
    let mut backend = JsonBackend::new();
    p.render(&mut backend).unwrap();
    let data = &backend.traces()[0]["data"];
    assert!(data.get("mesh").is_none());
    assert_eq!(data["colors"][0][0].as_array().unwrap().len(), 3);
  }

  #[test]
  fn streamlines_carry_seeds() {
    let opts = PlotOptions {
      n: Some(3),
      streamlines: true,
      ..Default::default()
    };
    let mut p = plot_vector(
      args("[-x, -y, -z], (x, -1, 1), (y, -1, 1), (z, -1, 1)"),
      &opts,
      &PlotConfig::default(),
    )
    .unwrap();
    let mut backend = JsonBackend::new();
    p.render(&mut backend).unwrap();
    let seeds = backend.traces()[0]["data"]["seeds"].as_array().unwrap();
    assert_eq!(seeds.len(), 6 * 9);
  }

  #[test]
  fn unevaluated_series_cannot_be_added() {
    let p = plot(args("x"), &n(3), &PlotConfig::default()).unwrap();
    let mut backend = JsonBackend::new();
    assert!(matches!(
      backend.add(&p.series[0]),
      Err(PlotError::EvaluationError(_))
    ));
  }
}

mod interactive {
  use super::*;

  fn interactive_plot() -> symplot::Plot {
    let opts = PlotOptions {
      n: Some(2),
      params: BTreeMap::from([(Symbol::new("u"), Complex64::new(1.0, 0.0))]),
      ..Default::default()
    };
    plot(args("u*x, x, (x, 0, 1)"), &opts, &PlotConfig::default()).unwrap()
  }

  #[test]
  fn updates_replace_the_trace_in_place() {
    let mut p = interactive_plot();
    let mut backend = JsonBackend::new();
    p.render(&mut backend).unwrap();
    assert_eq!(backend.traces()[0]["data"]["y"][1], 1.0);

    let bindings = HashMap::from([(Symbol::new("u"), Complex64::new(5.0, 0.0))]);
    p.push_updates(&mut backend, &bindings).unwrap();
    assert_eq!(backend.traces().len(), 2);
    assert_eq!(backend.traces()[0]["data"]["y"][1], 5.0);
    assert_eq!(backend.traces()[0]["interactive"], true);
  }

  #[test]
  fn update_before_render_fails() {
    let mut p = interactive_plot();
    let mut backend = JsonBackend::new();
    let bindings = HashMap::new();
    assert!(p.push_updates(&mut backend, &bindings).is_err());
  }

  #[test]
  fn update_interactive_reports_changed_series() {
    let mut p = interactive_plot();
    p.evaluate().unwrap();
    let bindings = HashMap::from([(Symbol::new("u"), Complex64::new(2.0, 0.0))]);
    assert_eq!(p.update_interactive(&bindings).unwrap(), vec![0, 1]);
  }
}
