use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::PlotError;

/// Spacing of the sample points along one axis.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
  #[default]
  Linear,
  Log,
}

impl FromStr for Scale {
  type Err = PlotError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "linear" | "lin" => Ok(Scale::Linear),
      "log" => Ok(Scale::Log),
      other => Err(PlotError::ConfigError(format!("unknown scale {other}"))),
    }
  }
}

/// `n` points from `start` to `end`, both included.
pub fn discretize(
  start: f64,
  end: f64,
  n: usize,
  scale: Scale,
) -> Result<Array1<f64>, PlotError> {
  match scale {
    Scale::Linear => Ok(Array1::linspace(start, end, n)),
    Scale::Log => {
      if !(start > 0.0 && end > 0.0) {
        return Err(PlotError::EvaluationError(format!(
          "logarithmic spacing needs a positive range, got ({start}, {end})"
        )));
      }
      if n == 1 {
        return Ok(Array1::from_elem(1, start));
      }
      Array1::geomspace(start, end, n).ok_or_else(|| {
        PlotError::EvaluationError(format!(
          "cannot space ({start}, {end}) logarithmically"
        ))
      })
    }
  }
}

/// 2D grid in "xy" indexing: both outputs have shape `(y.len(), x.len())`.
pub fn meshgrid(
  x: &Array1<f64>,
  y: &Array1<f64>,
) -> (Array2<f64>, Array2<f64>) {
  let shape = (y.len(), x.len());
  let xx = Array2::from_shape_fn(shape, |(_, j)| x[j]);
  let yy = Array2::from_shape_fn(shape, |(i, _)| y[i]);
  (xx, yy)
}

/// 3D grid in "xy" indexing: outputs have shape
/// `(y.len(), x.len(), z.len())`.
pub fn meshgrid3(
  x: &Array1<f64>,
  y: &Array1<f64>,
  z: &Array1<f64>,
) -> (Array3<f64>, Array3<f64>, Array3<f64>) {
  let shape = (y.len(), x.len(), z.len());
  let xx = Array3::from_shape_fn(shape, |(_, j, _)| x[j]);
  let yy = Array3::from_shape_fn(shape, |(i, _, _)| y[i]);
  let zz = Array3::from_shape_fn(shape, |(_, _, k)| z[k]);
  (xx, yy, zz)
}

// --- adaptive sampling ---

/// One interval of an adaptive sampling, with the scales of the whole run.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
  pub x: [f64; 2],
  pub y: [f64; 2],
  pub x_scale: f64,
  pub y_scale: f64,
}

/// Loss of an interval; the interval with the largest loss is split next.
pub type LossFn = Arc<dyn Fn(&Interval) -> f64 + Send + Sync>;

/// Euclidean length of the interval after scaling both axes to unit size.
pub fn default_loss(iv: &Interval) -> f64 {
  let dx = (iv.x[1] - iv.x[0]) / iv.x_scale;
  let dy = iv.y[1] - iv.y[0];
  if !dy.is_finite() || iv.y_scale == 0.0 {
    return dx;
  }
  dx.hypot(dy / iv.y_scale)
}

/// Progress reported to the goal after each refinement.
#[derive(Debug, Clone, Copy)]
pub struct LearnerStatus {
  pub npoints: usize,
  pub loss: f64,
}

#[derive(Clone)]
pub enum AdaptiveGoal {
  /// Stop once the largest interval loss drops below this value.
  Loss(f64),
  Custom(Arc<dyn Fn(&LearnerStatus) -> bool + Send + Sync>),
}

impl AdaptiveGoal {
  pub fn reached(&self, status: &LearnerStatus) -> bool {
    match self {
      AdaptiveGoal::Loss(goal) => status.loss < *goal,
      AdaptiveGoal::Custom(f) => f(status),
    }
  }
}

impl fmt::Debug for AdaptiveGoal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AdaptiveGoal::Loss(l) => write!(f, "Loss({l})"),
      AdaptiveGoal::Custom(_) => write!(f, "Custom(..)"),
    }
  }
}

/// Strategy that chooses where to sample a function of one variable.
pub trait AdaptiveLearner: Send + Sync {
  fn sample(
    &self,
    f: &dyn Fn(f64) -> f64,
    bounds: (f64, f64),
    options: &AdaptiveOptions,
  ) -> (Vec<f64>, Vec<f64>);
}

#[derive(Clone)]
pub struct AdaptiveOptions {
  pub goal: AdaptiveGoal,
  pub loss_fn: Option<LossFn>,
  pub max_points: usize,
  pub learner: Arc<dyn AdaptiveLearner>,
}

impl AdaptiveOptions {
  pub fn new(goal: f64, max_points: usize) -> Self {
    AdaptiveOptions {
      goal: AdaptiveGoal::Loss(goal),
      loss_fn: None,
      max_points,
      learner: Arc::new(Learner1D::default()),
    }
  }
}

impl Default for AdaptiveOptions {
  fn default() -> Self {
    AdaptiveOptions::new(0.01, 5000)
  }
}

impl fmt::Debug for AdaptiveOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AdaptiveOptions")
      .field("goal", &self.goal)
      .field("custom_loss", &self.loss_fn.is_some())
      .field("max_points", &self.max_points)
      .finish()
  }
}

/// Splits the interval of largest loss at its midpoint until the goal is
/// met or `max_points` samples exist.
#[derive(Debug, Clone)]
pub struct Learner1D {
  /// Intervals narrower than this fraction of the range are not split.
  pub min_width: f64,
}

impl Default for Learner1D {
  fn default() -> Self {
    Learner1D { min_width: 1e-9 }
  }
}

fn finite_span(ys: &[f64]) -> f64 {
  let (lo, hi) = ys
    .iter()
    .filter(|y| y.is_finite())
    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| {
      (lo.min(y), hi.max(y))
    });
  if hi > lo { hi - lo } else { 0.0 }
}

impl AdaptiveLearner for Learner1D {
  fn sample(
    &self,
    f: &dyn Fn(f64) -> f64,
    bounds: (f64, f64),
    options: &AdaptiveOptions,
  ) -> (Vec<f64>, Vec<f64>) {
    let (a, b) = bounds;
    if a == b {
      return (vec![a], vec![f(a)]);
    }
    let mid = (a + b) / 2.0;
    let mut xs = vec![a, mid, b];
    let mut ys = vec![f(a), f(mid), f(b)];
    let x_scale = (b - a).abs();
    let loss_fn = options.loss_fn.as_ref();

    while xs.len() < options.max_points {
      let y_scale = finite_span(&ys);
      let mut worst = (0, f64::NEG_INFINITY);
      for i in 0..xs.len() - 1 {
        if (xs[i + 1] - xs[i]).abs() < self.min_width * x_scale {
          continue;
        }
        let iv = Interval {
          x: [xs[i], xs[i + 1]],
          y: [ys[i], ys[i + 1]],
          x_scale,
          y_scale,
        };
        let loss = match loss_fn {
          Some(l) => l(&iv),
          None => default_loss(&iv),
        };
        if loss > worst.1 {
          worst = (i, loss);
        }
      }
      if worst.1 == f64::NEG_INFINITY {
        break;
      }
      let status = LearnerStatus {
        npoints: xs.len(),
        loss: worst.1,
      };
      if options.goal.reached(&status) {
        break;
      }
      let i = worst.0;
      let x = (xs[i] + xs[i + 1]) / 2.0;
      xs.insert(i + 1, x);
      ys.insert(i + 1, f(x));
    }
    (xs, ys)
  }
}
