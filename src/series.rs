use ndarray::{Array1, Array2, Array3, Zip};
use num_complex::Complex64;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::PlotError;
use crate::config::PlotConfig;
use crate::evaluator::real_value;
use crate::expression::{CompiledFn, ExprRef, Symbol};
use crate::functions::complex::DomainColoring;
use crate::sampling::{AdaptiveOptions, Scale, discretize, meshgrid, meshgrid3};
use crate::syntax::ComparisonOp;

/// Complex-to-real reduction applied by a complex series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
  Real,
  Imag,
  Abs,
  Arg,
  /// Magnitude, colored by the argument.
  AbsArg,
}

impl Projection {
  pub fn key(&self) -> &'static str {
    match self {
      Projection::Real => "real",
      Projection::Imag => "imag",
      Projection::Abs => "abs",
      Projection::Arg => "arg",
      Projection::AbsArg => "absarg",
    }
  }

  /// Label of the series showing this projection of `label`.
  ///
  /// The color of an absarg line encodes the argument, so it is labelled
  /// `Arg(..)`; on a 2D domain the raster carries the bare label.
  pub fn wrap_label(&self, label: &str, domain: bool) -> String {
    match self {
      Projection::Real => format!("Re({label})"),
      Projection::Imag => format!("Im({label})"),
      Projection::Abs => format!("Abs({label})"),
      Projection::Arg => format!("Arg({label})"),
      Projection::AbsArg if domain => label.to_string(),
      Projection::AbsArg => format!("Arg({label})"),
    }
  }

  pub fn apply(&self, z: Complex64) -> f64 {
    match self {
      Projection::Real => z.re,
      Projection::Imag => z.im,
      Projection::Abs | Projection::AbsArg => z.norm(),
      Projection::Arg => z.arg(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
  Line,
  Parametric2DLine,
  Parametric3DLine,
  Surface,
  ParametricSurface,
  Implicit,
  ComplexLine,
  ComplexSurface,
  DomainColoring,
  Vector2D,
  Vector3D,
  ComplexPoints,
}

impl SeriesKind {
  /// Number of ranges the kind is evaluated over.
  pub fn arity(&self) -> usize {
    match self {
      SeriesKind::ComplexPoints => 0,
      SeriesKind::Line
      | SeriesKind::Parametric2DLine
      | SeriesKind::Parametric3DLine
      | SeriesKind::ComplexLine
      | SeriesKind::ComplexSurface
      | SeriesKind::DomainColoring => 1,
      SeriesKind::Surface
      | SeriesKind::ParametricSurface
      | SeriesKind::Implicit
      | SeriesKind::Vector2D => 2,
      SeriesKind::Vector3D => 3,
    }
  }

  /// Number of expressions making up one series; `None` for any count.
  pub fn nexpr(&self) -> Option<usize> {
    match self {
      SeriesKind::ComplexPoints => None,
      SeriesKind::Parametric2DLine | SeriesKind::Vector2D => Some(2),
      SeriesKind::Parametric3DLine
      | SeriesKind::ParametricSurface
      | SeriesKind::Vector3D => Some(3),
      _ => Some(1),
    }
  }

  /// Human-readable name, e.g. "cartesian line".
  pub fn name(&self) -> &'static str {
    match self {
      SeriesKind::Line => "cartesian line",
      SeriesKind::Parametric2DLine => "parametric cartesian line",
      SeriesKind::Parametric3DLine => "3D parametric cartesian line",
      SeriesKind::Surface => "cartesian surface",
      SeriesKind::ParametricSurface => "parametric cartesian surface",
      SeriesKind::Implicit => "implicit expression",
      SeriesKind::ComplexLine => "complex line",
      SeriesKind::ComplexSurface => "complex cartesian surface",
      SeriesKind::DomainColoring => "complex domain coloring",
      SeriesKind::Vector2D => "2D vector series",
      SeriesKind::Vector3D => "3D vector series",
      SeriesKind::ComplexPoints => "complex points",
    }
  }
}

/// A variable with its (possibly complex) bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
  pub symbol: Symbol,
  pub start: Complex64,
  pub end: Complex64,
}

impl Range {
  pub fn new(symbol: impl Into<Symbol>, start: f64, end: f64) -> Self {
    Range {
      symbol: symbol.into(),
      start: Complex64::new(start, 0.0),
      end: Complex64::new(end, 0.0),
    }
  }

  pub fn complex(
    symbol: impl Into<Symbol>,
    start: Complex64,
    end: Complex64,
  ) -> Self {
    // -0.0 would put real bounds below the branch cuts of sqrt and log.
    let unsigned = |z: Complex64| Complex64::new(z.re, z.im + 0.0);
    Range {
      symbol: symbol.into(),
      start: unsigned(start),
      end: unsigned(end),
    }
  }

  /// True when the bounds span a rectangle of the complex plane.
  pub fn is_domain(&self) -> bool {
    self.start.im != self.end.im
  }
}

fn fmt_number(f: &mut fmt::Formatter<'_>, z: Complex64) -> fmt::Result {
  if z.im == 0.0 {
    write!(f, "{}", z.re)
  } else if z.re == 0.0 {
    write!(f, "{}*I", z.im)
  } else if z.im < 0.0 {
    write!(f, "{} - {}*I", z.re, -z.im)
  } else {
    write!(f, "{} + {}*I", z.re, z.im)
  }
}

impl fmt::Display for Range {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, ", self.symbol)?;
    fmt_number(f, self.start)?;
    write!(f, ", ")?;
    fmt_number(f, self.end)?;
    write!(f, ")")
  }
}

/// Numeric output of a series; the variant follows the series kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
  Line {
    x: Array1<f64>,
    y: Array1<f64>,
  },
  /// Magnitude of a complex function along a line, colored by its argument.
  AbsArgLine {
    x: Array1<f64>,
    abs: Array1<f64>,
    arg: Array1<f64>,
    colors: Array2<u8>,
  },
  Parametric2DLine {
    x: Array1<f64>,
    y: Array1<f64>,
    param: Array1<f64>,
  },
  Parametric3DLine {
    x: Array1<f64>,
    y: Array1<f64>,
    z: Array1<f64>,
    param: Array1<f64>,
  },
  Surface {
    x: Array2<f64>,
    y: Array2<f64>,
    z: Array2<f64>,
  },
  ComplexSurface {
    re: Array2<f64>,
    im: Array2<f64>,
    z: Array2<f64>,
  },
  DomainColoring {
    re: Array2<f64>,
    im: Array2<f64>,
    abs: Array2<f64>,
    arg: Array2<f64>,
    colors: Array3<u8>,
  },
  Implicit {
    x: Array2<f64>,
    y: Array2<f64>,
    z: Array2<f64>,
    /// `z == 0` is the curve; otherwise `z` is a 1/0 region mask.
    equality: bool,
  },
  Vector2D {
    x: Array2<f64>,
    y: Array2<f64>,
    u: Array2<f64>,
    v: Array2<f64>,
  },
  Vector3D {
    x: Array3<f64>,
    y: Array3<f64>,
    z: Array3<f64>,
    u: Array3<f64>,
    v: Array3<f64>,
    w: Array3<f64>,
  },
  ComplexPoints {
    re: Array1<f64>,
    im: Array1<f64>,
  },
}

/// Evaluation state of a series.
#[derive(Debug, Clone)]
pub enum SeriesState {
  Stale,
  Fresh(SeriesData),
}

/// One logical plottable dataset.
#[derive(Clone)]
pub struct Series {
  kind: SeriesKind,
  exprs: Vec<ExprRef>,
  ranges: Vec<Range>,
  pub label: String,
  pub rendering_kw: Map<String, Value>,
  projection: Option<Projection>,
  n: [usize; 3],
  scales: [Scale; 3],
  adaptive: Option<AdaptiveOptions>,
  params: BTreeMap<Symbol, Complex64>,
  coloring: DomainColoring,
  threed: bool,
  streamlines: bool,
  compiled: Option<Vec<CompiledFn>>,
  state: SeriesState,
}

impl Series {
  pub fn new(
    kind: SeriesKind,
    exprs: Vec<ExprRef>,
    ranges: Vec<Range>,
    label: impl Into<String>,
  ) -> Result<Self, PlotError> {
    let expected = kind.nexpr();
    if exprs.is_empty() || expected.is_some_and(|n| n != exprs.len()) {
      return Err(PlotError::MalformedArguments(format!(
        "a {} takes {} expressions, received {}",
        kind.name(),
        expected.map_or("one or more".to_string(), |n| n.to_string()),
        exprs.len()
      )));
    }
    if ranges.len() != kind.arity() {
      return Err(PlotError::MalformedArguments(format!(
        "a {} takes {} ranges, received {}",
        kind.name(),
        kind.arity(),
        ranges.len()
      )));
    }
    if kind == SeriesKind::ComplexLine && ranges[0].is_domain() {
      return Err(PlotError::MalformedArguments(format!(
        "a complex line needs equal imaginary parts, received {}",
        ranges[0]
      )));
    }
    let default_n = PlotConfig::default().points(kind);
    Ok(Series {
      kind,
      exprs,
      ranges,
      label: label.into(),
      rendering_kw: Map::new(),
      projection: None,
      n: [default_n; 3],
      scales: [Scale::Linear; 3],
      adaptive: None,
      params: BTreeMap::new(),
      coloring: DomainColoring::default(),
      threed: false,
      streamlines: false,
      compiled: None,
      state: SeriesState::Stale,
    })
  }

  pub fn with_projection(mut self, projection: Projection) -> Self {
    self.projection = Some(projection);
    self.state = SeriesState::Stale;
    self
  }

  pub fn discretization(mut self, n: [usize; 3]) -> Self {
    self.n = n;
    self.state = SeriesState::Stale;
    self
  }

  pub fn scales(mut self, scales: [Scale; 3]) -> Self {
    self.scales = scales;
    self.state = SeriesState::Stale;
    self
  }

  pub fn adaptive(mut self, options: Option<AdaptiveOptions>) -> Self {
    self.adaptive = options;
    self.state = SeriesState::Stale;
    self
  }

  /// Bind external parameters; they become extra arguments of the compiled
  /// expressions.
  pub fn params(mut self, params: BTreeMap<Symbol, Complex64>) -> Self {
    self.params = params;
    self.compiled = None;
    self.state = SeriesState::Stale;
    self
  }

  pub fn rendering_kw(mut self, rendering_kw: Map<String, Value>) -> Self {
    self.rendering_kw = rendering_kw;
    self
  }

  pub fn coloring(mut self, coloring: DomainColoring) -> Self {
    self.coloring = coloring;
    self.state = SeriesState::Stale;
    self
  }

  pub fn threed(mut self, threed: bool) -> Self {
    self.threed = threed;
    self
  }

  pub fn streamlines(mut self, streamlines: bool) -> Self {
    self.streamlines = streamlines;
    self
  }

  pub fn kind(&self) -> SeriesKind {
    self.kind
  }

  pub fn exprs(&self) -> &[ExprRef] {
    &self.exprs
  }

  pub fn ranges(&self) -> &[Range] {
    &self.ranges
  }

  pub fn projection(&self) -> Option<Projection> {
    self.projection
  }

  pub fn n(&self) -> [usize; 3] {
    self.n
  }

  pub fn color_scheme(&self) -> DomainColoring {
    self.coloring
  }

  pub fn is_threed(&self) -> bool {
    self.threed
  }

  pub fn has_streamlines(&self) -> bool {
    self.streamlines
  }

  pub fn is_interactive(&self) -> bool {
    !self.params.is_empty()
  }

  /// Adaptive sampling only applies to non-interactive cartesian lines.
  pub fn is_adaptive(&self) -> bool {
    self.adaptive.is_some()
      && self.kind == SeriesKind::Line
      && !self.is_interactive()
  }

  pub fn is_3d(&self) -> bool {
    match self.kind {
      SeriesKind::Parametric3DLine
      | SeriesKind::Surface
      | SeriesKind::ParametricSurface
      | SeriesKind::Vector3D => true,
      SeriesKind::ComplexSurface | SeriesKind::DomainColoring => self.threed,
      _ => false,
    }
  }

  pub fn is_3d_surface(&self) -> bool {
    self.is_3d()
      && matches!(
        self.kind,
        SeriesKind::Surface
          | SeriesKind::ParametricSurface
          | SeriesKind::ComplexSurface
          | SeriesKind::DomainColoring
      )
  }

  /// Compile the expressions against the range symbols followed by the
  /// parameter symbols.
  pub fn compile(&mut self) -> Result<(), PlotError> {
    let signature: Vec<Symbol> = self
      .ranges
      .iter()
      .map(|r| r.symbol.clone())
      .chain(self.params.keys().cloned())
      .collect();
    let compiled = self
      .exprs
      .iter()
      .map(|e| e.compile(&signature))
      .collect::<Result<Vec<_>, _>>()?;
    self.compiled = Some(compiled);
    Ok(())
  }

  /// Numeric data of the series, computed on first use and cached until
  /// the series is modified or updated.
  pub fn get_data(&mut self) -> Result<&SeriesData, PlotError> {
    if let SeriesState::Stale = self.state {
      if self.compiled.is_none() {
        self.compile()?;
      }
      let data = self.evaluate()?;
      log::debug!("evaluated {self}");
      self.state = SeriesState::Fresh(data);
    }
    match &self.state {
      SeriesState::Fresh(data) => Ok(data),
      SeriesState::Stale => unreachable!(),
    }
  }

  /// Rebind the parameters named in `bindings` and recompute.
  /// Names that are not parameters of this series are ignored.
  pub fn update_data(
    &mut self,
    bindings: &HashMap<Symbol, Complex64>,
  ) -> Result<&SeriesData, PlotError> {
    for (symbol, value) in bindings {
      if let Some(slot) = self.params.get_mut(symbol) {
        *slot = *value;
      }
    }
    self.state = SeriesState::Stale;
    self.get_data()
  }

  /// The cached data, if the series is fresh.
  pub fn data(&self) -> Option<&SeriesData> {
    match &self.state {
      SeriesState::Fresh(data) => Some(data),
      SeriesState::Stale => None,
    }
  }

  pub fn state(&self) -> &SeriesState {
    &self.state
  }

  fn axis(&self, i: usize) -> Result<Array1<f64>, PlotError> {
    let r = &self.ranges[i];
    discretize(r.start.re, r.end.re, self.n[i], self.scales[i])
  }

  fn evaluate(&self) -> Result<SeriesData, PlotError> {
    let fs = self.compiled.as_deref().ok_or_else(|| {
      PlotError::EvaluationError(format!("{self} is not compiled"))
    })?;
    let params: Vec<Complex64> = self.params.values().copied().collect();
    let call = |f: &CompiledFn, point: &[Complex64]| {
      let mut values = Vec::with_capacity(point.len() + params.len());
      values.extend_from_slice(point);
      values.extend_from_slice(&params);
      f(&values)
    };
    let c = |x: f64| Complex64::new(x, 0.0);
    let line = |f: &CompiledFn, t: &Array1<f64>| {
      t.mapv(|t| real_value(call(f, &[c(t)])))
    };
    let grid = |f: &CompiledFn, x: &Array2<f64>, y: &Array2<f64>| {
      Zip::from(x)
        .and(y)
        .map_collect(|&x, &y| real_value(call(f, &[c(x), c(y)])))
    };

    let data = match self.kind {
      SeriesKind::Line => {
        if let (true, Some(opts)) = (self.is_adaptive(), &self.adaptive) {
          let r = &self.ranges[0];
          let f = |x: f64| real_value(call(&fs[0], &[c(x)]));
          let (x, y) =
            opts.learner.sample(&f, (r.start.re, r.end.re), opts);
          SeriesData::Line {
            x: Array1::from(x),
            y: Array1::from(y),
          }
        } else {
          let x = self.axis(0)?;
          let y = line(&fs[0], &x);
          SeriesData::Line { x, y }
        }
      }
      SeriesKind::Parametric2DLine => {
        let param = self.axis(0)?;
        SeriesData::Parametric2DLine {
          x: line(&fs[0], &param),
          y: line(&fs[1], &param),
          param,
        }
      }
      SeriesKind::Parametric3DLine => {
        let param = self.axis(0)?;
        SeriesData::Parametric3DLine {
          x: line(&fs[0], &param),
          y: line(&fs[1], &param),
          z: line(&fs[2], &param),
          param,
        }
      }
      SeriesKind::Surface => {
        let (x, y) = meshgrid(&self.axis(0)?, &self.axis(1)?);
        let z = grid(&fs[0], &x, &y);
        SeriesData::Surface { x, y, z }
      }
      SeriesKind::ParametricSurface => {
        let (u, v) = meshgrid(&self.axis(0)?, &self.axis(1)?);
        SeriesData::Surface {
          x: grid(&fs[0], &u, &v),
          y: grid(&fs[1], &u, &v),
          z: grid(&fs[2], &u, &v),
        }
      }
      SeriesKind::Implicit => {
        let (x, y) = meshgrid(&self.axis(0)?, &self.axis(1)?);
        let equality = matches!(
          self.exprs[0].relation(),
          None | Some(ComparisonOp::Equal)
        );
        let z = Zip::from(&x)
          .and(&y)
          .map_collect(|&x, &y| call(&fs[0], &[c(x), c(y)]).re);
        SeriesData::Implicit { x, y, z, equality }
      }
      SeriesKind::ComplexLine => {
        let r = &self.ranges[0];
        let x = self.axis(0)?;
        let w = x.mapv(|x| call(&fs[0], &[Complex64::new(x, r.start.im)]));
        match self.projection.unwrap_or(Projection::AbsArg) {
          Projection::AbsArg => SeriesData::AbsArgLine {
            abs: w.mapv(|z| z.norm()),
            arg: w.mapv(|z| z.arg()),
            colors: self.coloring.colorize_line(&w),
            x,
          },
          p => SeriesData::Line {
            y: w.mapv(|z| p.apply(z)),
            x,
          },
        }
      }
      SeriesKind::ComplexSurface | SeriesKind::DomainColoring => {
        let r = &self.ranges[0];
        let re_axis =
          discretize(r.start.re, r.end.re, self.n[0], self.scales[0])?;
        let im_axis =
          discretize(r.start.im, r.end.im, self.n[1], self.scales[1])?;
        let (re, im) = meshgrid(&re_axis, &im_axis);
        let w = Zip::from(&re)
          .and(&im)
          .map_collect(|&a, &b| call(&fs[0], &[Complex64::new(a, b)]));
        if self.kind == SeriesKind::DomainColoring {
          SeriesData::DomainColoring {
            abs: w.mapv(|z| z.norm()),
            arg: w.mapv(|z| z.arg()),
            colors: self.coloring.colorize(&w),
            re,
            im,
          }
        } else {
          let p = self.projection.unwrap_or(Projection::Abs);
          SeriesData::ComplexSurface {
            z: w.mapv(|z| p.apply(z)),
            re,
            im,
          }
        }
      }
      SeriesKind::Vector2D => {
        let (x, y) = meshgrid(&self.axis(0)?, &self.axis(1)?);
        SeriesData::Vector2D {
          u: grid(&fs[0], &x, &y),
          v: grid(&fs[1], &x, &y),
          x,
          y,
        }
      }
      SeriesKind::Vector3D => {
        let (x, y, z) =
          meshgrid3(&self.axis(0)?, &self.axis(1)?, &self.axis(2)?);
        let field = |f: &CompiledFn| {
          Zip::from(&x).and(&y).and(&z).map_collect(|&x, &y, &z| {
            real_value(call(f, &[c(x), c(y), c(z)]))
          })
        };
        let (u, v, w) = (field(&fs[0]), field(&fs[1]), field(&fs[2]));
        SeriesData::Vector3D { x, y, z, u, v, w }
      }
      SeriesKind::ComplexPoints => {
        let points: Vec<Complex64> = fs.iter().map(|f| call(f, &[])).collect();
        SeriesData::ComplexPoints {
          re: points.iter().map(|z| z.re).collect(),
          im: points.iter().map(|z| z.im).collect(),
        }
      }
    };
    Ok(data)
  }
}

impl fmt::Display for Series {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: ", self.kind.name())?;
    if self.exprs.len() == 1 {
      write!(f, "{}", self.exprs[0])?;
    } else {
      let parts: Vec<String> =
        self.exprs.iter().map(|e| e.to_string()).collect();
      write!(f, "({})", parts.join(", "))?;
    }
    if let Some(p) = self.projection {
      write!(f, " [{}]", p.key())?;
    }
    for (i, r) in self.ranges.iter().enumerate() {
      let sep = if i == 0 { " for " } else { " and " };
      write!(f, "{sep}{} over (", r.symbol)?;
      fmt_number(f, r.start)?;
      write!(f, ", ")?;
      fmt_number(f, r.end)?;
      write!(f, ")")?;
    }
    if !self.params.is_empty() {
      let names: Vec<String> =
        self.params.keys().map(|s| s.to_string()).collect();
      write!(f, " with parameters {}", names.join(", "))?;
    }
    Ok(())
  }
}

impl fmt::Debug for Series {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Series")
      .field("kind", &self.kind)
      .field("exprs", &self.exprs)
      .field("ranges", &self.ranges)
      .field("label", &self.label)
      .field("projection", &self.projection)
      .field("n", &self.n)
      .field("params", &self.params)
      .field("fresh", &self.data().is_some())
      .finish()
  }
}
