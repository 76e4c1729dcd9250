use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::PlotError;
use crate::config::PlotConfig;
use crate::figure::Plot;
use crate::functions::arguments::PlotArg;
use crate::functions::plot::{PlotOptions, build_series, finish};
use crate::series::SeriesKind;

/// Spread bracketed component lists into plain expressions, so that
/// `[-y, x]` and `-y, x` describe the same field. A top-level list becomes
/// its own group.
fn flatten_components(args: Vec<PlotArg>) -> Vec<PlotArg> {
  let spread = |items: Vec<PlotArg>| {
    items
      .into_iter()
      .flat_map(|a| match a {
        PlotArg::List(exprs) => exprs.into_iter().map(PlotArg::Expr).collect(),
        other => vec![other],
      })
      .collect::<Vec<_>>()
  };
  args
    .into_iter()
    .map(|a| match a {
      PlotArg::List(exprs) => {
        PlotArg::Group(exprs.into_iter().map(PlotArg::Expr).collect())
      }
      PlotArg::Group(items) => PlotArg::Group(spread(items)),
      other => other,
    })
    .collect()
}

/// Number of components of the field(s) described by `args`.
fn components(args: &[PlotArg]) -> usize {
  let leading = |items: &[PlotArg]| {
    items
      .iter()
      .take_while(|a| matches!(a, PlotArg::Expr(_)))
      .count()
  };
  match args.first() {
    Some(PlotArg::Group(items)) => leading(items),
    _ => args.iter().filter(|a| matches!(a, PlotArg::Expr(_))).count(),
  }
}

/// plot_vector([u, v], (x, xmin, xmax), (y, ymin, ymax))
///
/// Two components give a 2D field, three a 3D field sampled over three
/// ranges. With `streamlines`, 3D fields carry seed points for streamline
/// integration.
pub fn plot_vector(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let args = flatten_components(args);
  let (kind, n) = match components(&args) {
    2 => (SeriesKind::Vector2D, cfg.n_vector2d),
    3 => (SeriesKind::Vector3D, cfg.n_vector3d),
    other => {
      return Err(PlotError::MalformedArguments(format!(
        "a vector field needs 2 or 3 components, received {other}"
      )));
    }
  };
  let series = build_series(args, kind, n, opts, cfg)?;
  let mut plot = finish(series, opts)?;
  plot.xlabel.get_or_insert_with(|| "x".into());
  plot.ylabel.get_or_insert_with(|| "y".into());
  if kind == SeriesKind::Vector3D {
    plot.zlabel.get_or_insert_with(|| "z".into());
  }
  Ok(plot)
}

fn face(a: &Array3<f64>, axis: Axis, index: usize) -> ArrayView2<'_, f64> {
  a.index_axis(axis, index)
}

/// Boundary points of a sampled 3D field where the field enters the box.
///
/// The grids come from an "xy" meshgrid of shape `(ny, nx, nz)`, so the
/// x faces lie along axis 1, the y faces along axis 0 and the z faces along
/// axis 2. A point of a `min` face qualifies when the normal component is
/// positive, a point of a `max` face when it is negative. Faces are visited
/// in the order x min, x max, y min, y max, z min, z max. Points on edges
/// and corners may qualify from two faces and are then returned twice.
pub fn seed_points(
  xx: &Array3<f64>,
  yy: &Array3<f64>,
  zz: &Array3<f64>,
  uu: &Array3<f64>,
  vv: &Array3<f64>,
  ww: &Array3<f64>,
) -> Result<Array2<f64>, PlotError> {
  let shape = xx.shape();
  for (name, a) in [("yy", yy), ("zz", zz), ("uu", uu), ("vv", vv), ("ww", ww)]
  {
    if a.shape() != shape {
      return Err(PlotError::DimensionMismatch(format!(
        "{name} has shape {:?}, expected {shape:?}",
        a.shape()
      )));
    }
  }
  if shape.contains(&0) {
    return Ok(Array2::zeros((0, 3)));
  }

  let faces = [
    (Axis(1), 0, uu, true),
    (Axis(1), shape[1] - 1, uu, false),
    (Axis(0), 0, vv, true),
    (Axis(0), shape[0] - 1, vv, false),
    (Axis(2), 0, ww, true),
    (Axis(2), shape[2] - 1, ww, false),
  ];

  let mut points: Vec<[f64; 3]> = Vec::new();
  for (axis, index, field, entering_positive) in faces {
    let (x, y, z, normal) = (
      face(xx, axis, index),
      face(yy, axis, index),
      face(zz, axis, index),
      face(field, axis, index),
    );
    for (((&x, &y), &z), &c) in
      x.iter().zip(y.iter()).zip(z.iter()).zip(normal.iter())
    {
      let inward = if entering_positive { c > 0.0 } else { c < 0.0 };
      if inward && !(x.is_nan() && y.is_nan() && z.is_nan()) {
        points.push([x, y, z]);
      }
    }
  }
  Ok(Array2::from(points))
}
