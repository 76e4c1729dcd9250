use num_complex::Complex64;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::PlotConfig;
use crate::expression::Symbol;
use crate::figure::Plot;
use crate::functions::arguments::{CanonicalArgs, PlotArg, PlotRequest};
use crate::functions::complex::DomainColoring;
use crate::sampling::{
  AdaptiveGoal, AdaptiveLearner, AdaptiveOptions, Learner1D, LossFn, Scale,
};
use crate::series::{Series, SeriesKind};
use crate::{PlotError, PlotWarning};

/// Keyword options shared by the plot entry points.
#[derive(Clone, Default)]
pub struct PlotOptions {
  /// Points per axis; overrides the per-kind default.
  pub n: Option<usize>,
  pub n1: Option<usize>,
  pub n2: Option<usize>,
  pub n3: Option<usize>,
  pub xscale: Scale,
  pub yscale: Scale,
  pub zscale: Scale,
  pub adaptive: bool,
  pub adaptive_goal: Option<AdaptiveGoal>,
  pub loss_fn: Option<LossFn>,
  pub learner: Option<Arc<dyn AdaptiveLearner>>,
  /// External parameters and their current values. Series over parameters
  /// are interactive.
  pub params: BTreeMap<Symbol, Complex64>,
  /// One label per series, replacing the labels from the arguments.
  pub label: Vec<String>,
  /// Either one set of options for every series or one per series.
  pub rendering_kw: Vec<Map<String, Value>>,
  pub threed: bool,
  pub streamlines: bool,
  pub coloring: Option<DomainColoring>,
  pub title: Option<String>,
  pub xlabel: Option<String>,
  pub ylabel: Option<String>,
  pub zlabel: Option<String>,
  pub real: Option<bool>,
  pub imag: Option<bool>,
  pub abs: Option<bool>,
  pub arg: Option<bool>,
  pub absarg: Option<bool>,
}

impl PlotOptions {
  pub fn discretization(&self, default: usize) -> [usize; 3] {
    let n = self.n.unwrap_or(default);
    [
      self.n1.unwrap_or(n),
      self.n2.unwrap_or(n),
      self.n3.unwrap_or(n),
    ]
  }

  pub fn scales(&self) -> [Scale; 3] {
    [self.xscale, self.yscale, self.zscale]
  }

  pub fn param_symbols(&self) -> BTreeSet<Symbol> {
    self.params.keys().cloned().collect()
  }

  pub fn adaptive_options(&self, cfg: &PlotConfig) -> Option<AdaptiveOptions> {
    if !self.adaptive {
      return None;
    }
    Some(AdaptiveOptions {
      goal: self
        .adaptive_goal
        .clone()
        .unwrap_or(AdaptiveGoal::Loss(cfg.adaptive_goal)),
      loss_fn: self.loss_fn.clone(),
      max_points: cfg.adaptive_max_points,
      learner: self
        .learner
        .clone()
        .unwrap_or_else(|| Arc::new(Learner1D::default())),
    })
  }
}

/// Create one series of `kind` from canonical arguments, applying the
/// discretization and rendering options.
pub(crate) fn make_series(
  kind: SeriesKind,
  args: CanonicalArgs,
  default_n: usize,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Series, PlotError> {
  let mut series = Series::new(kind, args.exprs, args.ranges, args.label)?
    .discretization(opts.discretization(default_n))
    .scales(opts.scales())
    .adaptive(opts.adaptive_options(cfg))
    .params(opts.params.clone())
    .rendering_kw(args.rendering_kw)
    .coloring(opts.coloring.unwrap_or(cfg.coloring))
    .threed(opts.threed)
    .streamlines(opts.streamlines);
  series.compile()?;
  log::debug!("built {series}");
  Ok(series)
}

/// Unpack `args` and build one series of `kind` per canonical group.
pub(crate) fn build_series(
  args: Vec<PlotArg>,
  kind: SeriesKind,
  default_n: usize,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Vec<Series>, PlotError> {
  let nexpr = kind.nexpr().unwrap_or(1);
  let request = PlotRequest::from_args(args, nexpr)?;
  request
    .canonicalize(nexpr, kind.arity(), &opts.param_symbols(), cfg)?
    .into_iter()
    .map(|c| make_series(kind, c, default_n, opts, cfg))
    .collect()
}

/// Apply the global `label` and `rendering_kw` lists.
pub(crate) fn set_labels(
  series: &mut [Series],
  labels: &[String],
  rendering_kw: &[Map<String, Value>],
) -> Result<(), PlotError> {
  if !labels.is_empty() {
    if labels.len() != series.len() {
      return Err(PlotError::MalformedArguments(format!(
        "The number of labels must be equal to the number of series being plotted.\nReceived {} series. Labels: {:?}",
        series.len(),
        labels
      )));
    }
    for (s, l) in series.iter_mut().zip(labels) {
      s.label = l.clone();
    }
  }
  match rendering_kw.len() {
    0 => {}
    1 => {
      for s in series.iter_mut() {
        s.rendering_kw.extend(rendering_kw[0].clone());
      }
    }
    n if n == series.len() => {
      for (s, kw) in series.iter_mut().zip(rendering_kw) {
        s.rendering_kw.extend(kw.clone());
      }
    }
    n => {
      return Err(PlotError::MalformedArguments(format!(
        "The number of rendering dictionaries must be 1 or equal to the number of series being plotted.\nReceived {} series, {n} dictionaries",
        series.len()
      )));
    }
  }
  Ok(())
}

/// Wrap the series into a plot, recording a warning when there are none.
pub(crate) fn finish(
  mut series: Vec<Series>,
  opts: &PlotOptions,
) -> Result<Plot, PlotError> {
  set_labels(&mut series, &opts.label, &opts.rendering_kw)?;
  let mut plot = Plot::new(series);
  if plot.series.is_empty() {
    log::warn!("{}", PlotWarning::NoSeries);
    plot.warnings.push(PlotWarning::NoSeries);
  }
  plot.title = opts.title.clone();
  plot.xlabel = opts.xlabel.clone();
  plot.ylabel = opts.ylabel.clone();
  plot.zlabel = opts.zlabel.clone();
  Ok(plot)
}

/// Cartesian lines of one variable.
///
/// `plot(sin(x), cos(x), (x, -5, 5))`, or one group per expression:
/// `plot((sin(x), (x, -5, 5), "s"), (cos(x), "c"))`.
pub fn plot(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let series = build_series(args, SeriesKind::Line, cfg.n_line, opts, cfg)?;
  let mut plot = finish(series, opts)?;
  if plot.xlabel.is_none() {
    plot.xlabel = plot
      .series
      .first()
      .map(|s| &s.ranges()[0].symbol)
      .filter(|s| !s.is_dummy())
      .map(|s| s.to_string());
  }
  Ok(plot)
}
