use ndarray::{Array1, Array2, Array3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::PlotConfig;
use crate::expression::{CompiledFn, ExprRef, Expression, Symbol};
use crate::figure::Plot;
use crate::functions::arguments::{
  CanonicalArgs, PlotArg, PlotRequest, find_rendering_kw, unpack_args,
};
use crate::functions::plot::{PlotOptions, finish, make_series};
use crate::series::{Projection, Range, Series, SeriesKind};
use crate::PlotError;

/// Color scheme of a domain coloring.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum DomainColoring {
  /// Hue follows the argument.
  #[default]
  #[serde(alias = "a")]
  A,
  /// Hue follows the argument; brightness stripes mark powers of two of the
  /// modulus.
  #[serde(alias = "e")]
  E,
  /// Hue follows the argument; brightness stripes mark twelfths of a turn.
  #[serde(alias = "f")]
  F,
}

impl FromStr for DomainColoring {
  type Err = PlotError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "a" | "A" => Ok(DomainColoring::A),
      "e" | "E" => Ok(DomainColoring::E),
      "f" | "F" => Ok(DomainColoring::F),
      other => Err(PlotError::ConfigError(format!(
        "unknown coloring {other}, expected one of a, e, f"
      ))),
    }
  }
}

/// HSB to RGB, hue in turns.
fn from_hue(h: f64, s: f64, b: f64) -> [u8; 3] {
  let h = ((h % 1.0) + 1.0) % 1.0;
  let i = (h * 6.0).floor() as i32;
  let f = h * 6.0 - i as f64;
  let p = b * (1.0 - s);
  let q = b * (1.0 - f * s);
  let t = b * (1.0 - (1.0 - f) * s);
  let (r, g, bl) = match i % 6 {
    0 => (b, t, p),
    1 => (q, b, p),
    2 => (p, b, t),
    3 => (p, q, b),
    4 => (t, p, b),
    _ => (b, p, q),
  };
  let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
  [byte(r), byte(g), byte(bl)]
}

impl DomainColoring {
  pub fn colorize_point(&self, z: Complex64) -> [u8; 3] {
    let modulus = z.norm();
    if modulus.is_nan() {
      return [0, 0, 0];
    }
    if modulus.is_infinite() {
      return [255, 255, 255];
    }
    let hue = z.arg() / (2.0 * PI);
    let brightness = match self {
      DomainColoring::A => 1.0,
      DomainColoring::E if modulus == 0.0 => 0.5,
      DomainColoring::E => 0.5 + 0.5 * modulus.log2().rem_euclid(1.0),
      DomainColoring::F => 0.5 + 0.5 * (hue * 12.0).rem_euclid(1.0),
    };
    from_hue(hue, 1.0, brightness)
  }

  /// RGB raster of shape `(rows, cols, 3)`.
  pub fn colorize(&self, w: &Array2<Complex64>) -> Array3<u8> {
    let (rows, cols) = w.dim();
    Array3::from_shape_fn((rows, cols, 3), |(i, j, c)| {
      self.colorize_point(w[[i, j]])[c]
    })
  }

  /// One RGB row per sample, shape `(n, 3)`.
  pub fn colorize_line(&self, w: &Array1<Complex64>) -> Array2<u8> {
    Array2::from_shape_fn((w.len(), 3), |(i, c)| self.colorize_point(w[i])[c])
  }
}

/// Which projections of a complex function to plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectionFlags {
  pub real: bool,
  pub imag: bool,
  pub abs: bool,
  pub arg: bool,
  pub absarg: bool,
}

impl ProjectionFlags {
  /// Enabled projections, in emission order.
  pub fn enabled(&self) -> Vec<Projection> {
    [
      (self.absarg, Projection::AbsArg),
      (self.real, Projection::Real),
      (self.imag, Projection::Imag),
      (self.abs, Projection::Abs),
      (self.arg, Projection::Arg),
    ]
    .into_iter()
    .filter_map(|(on, p)| on.then_some(p))
    .collect()
  }

  /// Flags from the options, falling back to `defaults` for unset ones.
  pub fn from_options(opts: &PlotOptions, defaults: ProjectionFlags) -> Self {
    ProjectionFlags {
      real: opts.real.unwrap_or(defaults.real),
      imag: opts.imag.unwrap_or(defaults.imag),
      abs: opts.abs.unwrap_or(defaults.abs),
      arg: opts.arg.unwrap_or(defaults.arg),
      absarg: opts.absarg.unwrap_or(defaults.absarg),
    }
  }
}

/// Expand each complex expression into one series per enabled projection.
///
/// A range with equal imaginary parts is a line; otherwise it spans a
/// rectangle of the complex plane and produces a domain coloring (absarg)
/// or a surface (other projections). The expression is evaluated
/// separately for every projection.
pub fn build_complex_series(
  canonical: Vec<CanonicalArgs>,
  flags: ProjectionFlags,
  opts: &PlotOptions,
  cfg: &PlotConfig,
  allow_lambda: bool,
) -> Result<Vec<Series>, PlotError> {
  let mut series = Vec::new();
  for c in canonical {
    if !allow_lambda
      && let Some(e) = c.exprs.iter().find(|e| !e.is_symbolic())
    {
      return Err(PlotError::UnsupportedExpressionType(format!(
        "{e} must be a symbolic expression"
      )));
    }
    let domain = c.ranges.iter().any(|r| r.is_domain());
    for p in flags.enabled() {
      let kind = match (domain, p) {
        (false, _) => SeriesKind::ComplexLine,
        (true, Projection::AbsArg) => SeriesKind::DomainColoring,
        (true, _) => SeriesKind::ComplexSurface,
      };
      let args = CanonicalArgs {
        exprs: c.exprs.clone(),
        ranges: c.ranges.clone(),
        label: p.wrap_label(&c.label, domain),
        rendering_kw: c.rendering_kw.clone(),
      };
      series.push(
        make_series(kind, args, cfg.n_complex, opts, cfg)?.with_projection(p),
      );
    }
  }
  Ok(series)
}

fn complex_canonical(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Vec<CanonicalArgs>, PlotError> {
  PlotRequest::from_args(args, 1)?.canonicalize(
    1,
    1,
    &opts.param_symbols(),
    cfg,
  )
}

/// Axis labels matching the series of a complex plot.
fn set_axis_labels(plot: &mut Plot) {
  let Some(first) = plot.series.first() else {
    return;
  };
  let absarg_lines = plot.series.iter().all(|s| {
    s.kind() == SeriesKind::ComplexLine
      && s.projection() == Some(Projection::AbsArg)
  });
  let planar = plot.series.iter().all(|s| {
    matches!(
      s.kind(),
      SeriesKind::DomainColoring
        | SeriesKind::ComplexSurface
        | SeriesKind::ComplexPoints
    )
  });
  if absarg_lines {
    plot.xlabel.get_or_insert_with(|| "Real".into());
    plot.ylabel.get_or_insert_with(|| "Abs".into());
  } else if planar {
    plot.xlabel.get_or_insert_with(|| "Re".into());
    plot.ylabel.get_or_insert_with(|| "Im".into());
    if plot
      .series
      .iter()
      .any(|s| s.kind() == SeriesKind::DomainColoring)
    {
      plot.zlabel.get_or_insert_with(|| "Abs".into());
    }
  } else {
    let var = first.ranges()[0].symbol.to_string();
    plot.ylabel.get_or_insert_with(|| format!("f({var})"));
    plot.xlabel.get_or_insert(var);
  }
}

fn complex_plot(
  args: Vec<PlotArg>,
  defaults: ProjectionFlags,
  allow_lambda: bool,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let canonical = complex_canonical(args, opts, cfg)?;
  let flags = ProjectionFlags::from_options(opts, defaults);
  let series =
    build_complex_series(canonical, flags, opts, cfg, allow_lambda)?;
  let mut plot = finish(series, opts)?;
  set_axis_labels(&mut plot);
  Ok(plot)
}

/// plot_complex(f(z), (z, -2 - 2*I, 2 + 2*I))
///
/// Plots the modulus colored by the argument: a colored line over a real
/// range, a domain coloring over a complex rectangle. Other projections can
/// be switched on through the options. Numeric closures are accepted.
pub fn plot_complex(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let defaults = ProjectionFlags {
    absarg: true,
    ..Default::default()
  };
  complex_plot(args, defaults, true, opts, cfg)
}

/// plot_real_imag(sqrt(x), (x, -3, 3))
///
/// Real and imaginary parts by default; `abs` and `arg` on request.
pub fn plot_real_imag(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let defaults = ProjectionFlags {
    real: true,
    imag: true,
    ..Default::default()
  };
  complex_plot(args, defaults, false, opts, cfg)
}

fn points_series(
  points: Vec<ExprRef>,
  label: String,
  rendering_kw: Option<serde_json::Map<String, serde_json::Value>>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Series, PlotError> {
  let args = CanonicalArgs {
    exprs: points,
    ranges: Vec::new(),
    label,
    rendering_kw: rendering_kw.unwrap_or_default(),
  };
  make_series(SeriesKind::ComplexPoints, args, 1, opts, cfg)
}

/// plot_complex_list(3 + 2*I, 4*I, ...)
///
/// Accepted shapes:
///
/// * complex numbers, one single-point series each;
/// * lists of complex numbers, one series per list;
/// * groups `([p1, p2, ...], "label", {..})` or `(p, "label")`;
/// * a single list with a label.
pub fn plot_complex_list(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let mut series = Vec::new();
  let all = |f: fn(&PlotArg) -> bool| !args.is_empty() && args.iter().all(f);

  if all(|a| matches!(a, PlotArg::Expr(_))) {
    for a in &args {
      if let PlotArg::Expr(e) = a {
        series.push(points_series(
          vec![Arc::clone(e)],
          String::new(),
          None,
          opts,
          cfg,
        )?);
      }
    }
  } else if all(|a| matches!(a, PlotArg::List(_))) {
    for a in &args {
      if let PlotArg::List(points) = a {
        series.push(points_series(
          points.clone(),
          String::new(),
          None,
          opts,
          cfg,
        )?);
      }
    }
  } else if all(|a| matches!(a, PlotArg::Group(items) if !items.is_empty())) {
    for a in &args {
      if let PlotArg::Group(items) = a {
        let (points, _, label) = unpack_args(items);
        let label = if items.iter().any(|i| matches!(i, PlotArg::Label(_))) {
          label
        } else {
          String::new()
        };
        series.push(points_series(
          points,
          label,
          find_rendering_kw(items),
          opts,
          cfg,
        )?);
      }
    }
  } else {
    let (points, _, label) = unpack_args(&args);
    if points.is_empty() {
      return Err(PlotError::MalformedArguments(
        "plot_complex_list needs complex numbers or lists of them".into(),
      ));
    }
    series.push(points_series(
      points,
      label,
      find_rendering_kw(&args),
      opts,
      cfg,
    )?);
  }

  let mut plot = finish(series, opts)?;
  set_axis_labels(&mut plot);
  Ok(plot)
}

/// The real or imaginary part of `f(x + I*y)` as a function of `x`, `y`
/// and the parameters.
#[derive(Debug)]
struct ComplexComponent {
  expr: ExprRef,
  var: Symbol,
  part: Projection,
}

impl fmt::Display for ComplexComponent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}({})", self.part.key(), self.expr)
  }
}

impl Expression for ComplexComponent {
  fn free_symbols(&self) -> BTreeSet<Symbol> {
    let mut free = self.expr.free_symbols();
    free.remove(&self.var);
    free
  }

  fn compile(&self, signature: &[Symbol]) -> Result<CompiledFn, PlotError> {
    let [_, _, params @ ..] = signature else {
      return Err(PlotError::EvaluationError(format!(
        "{self} needs an x and a y range"
      )));
    };
    let inner: Vec<Symbol> = std::iter::once(self.var.clone())
      .chain(params.iter().cloned())
      .collect();
    let f = self.expr.compile(&inner)?;
    let part = self.part;
    Ok(Arc::new(move |values: &[Complex64]| {
      let mut args = values[1..].to_vec();
      args[0] = Complex64::new(values[0].re, values[1].re);
      Complex64::new(part.apply(f(&args)), 0.0)
    }))
  }
}

/// plot_complex_vector(f(z), (z, -2 - 2*I, 2 + 2*I))
///
/// The vector field `[re(f), im(f)]` over a rectangle of the complex plane,
/// drawn with quivers or, with `streamlines`, streamlines.
pub fn plot_complex_vector(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let mut series = Vec::new();
  for c in complex_canonical(args, opts, cfg)? {
    let expr = &c.exprs[0];
    if !expr.is_symbolic() {
      return Err(PlotError::UnsupportedExpressionType(format!(
        "{expr} must be a symbolic expression"
      )));
    }
    let r = &c.ranges[0];
    if !r.is_domain() {
      return Err(PlotError::MalformedArguments(format!(
        "a complex vector field needs a rectangle of the complex plane, received {r}"
      )));
    }
    let component = |part| -> ExprRef {
      Arc::new(ComplexComponent {
        expr: Arc::clone(expr),
        var: r.symbol.clone(),
        part,
      })
    };
    let args = CanonicalArgs {
      exprs: vec![component(Projection::Real), component(Projection::Imag)],
      ranges: vec![
        Range::new("x", r.start.re, r.end.re),
        Range::new("y", r.start.im, r.end.im),
      ],
      label: c.label.clone(),
      rendering_kw: c.rendering_kw.clone(),
    };
    series.push(make_series(
      SeriesKind::Vector2D,
      args,
      cfg.n_vector2d,
      opts,
      cfg,
    )?);
  }
  let mut plot = finish(series, opts)?;
  plot.xlabel.get_or_insert_with(|| "Re".into());
  plot.ylabel.get_or_insert_with(|| "Im".into());
  Ok(plot)
}
