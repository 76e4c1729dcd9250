use crate::PlotError;
use crate::config::PlotConfig;
use crate::figure::Plot;
use crate::functions::arguments::PlotArg;
use crate::functions::plot::{PlotOptions, build_series, finish};
use crate::series::SeriesKind;

/// plot3d(f(x, y), (x, xmin, xmax), (y, ymin, ymax))
///
/// Surfaces are sampled on an `n1 x n2` grid in "xy" order: the data arrays
/// have shape `(n2, n1)`.
pub fn plot3d(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let series =
    build_series(args, SeriesKind::Surface, cfg.n_surface, opts, cfg)?;
  let mut plot = finish(series, opts)?;
  if let Some(s) = plot.series.first() {
    let names: Vec<String> = s
      .ranges()
      .iter()
      .map(|r| r.symbol.to_string())
      .collect();
    if !s.ranges().iter().any(|r| r.symbol.is_dummy()) {
      plot.xlabel.get_or_insert_with(|| names[0].clone());
      plot.ylabel.get_or_insert_with(|| names[1].clone());
    }
    let zlabel = format!("f({})", names.join(", "));
    plot.zlabel.get_or_insert(zlabel);
  }
  Ok(plot)
}

/// plot3d_parametric_surface(fx(u, v), fy(u, v), fz(u, v),
///   (u, umin, umax), (v, vmin, vmax))
pub fn plot3d_parametric_surface(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let series = build_series(
    args,
    SeriesKind::ParametricSurface,
    cfg.n_surface,
    opts,
    cfg,
  )?;
  let mut plot = finish(series, opts)?;
  plot.xlabel.get_or_insert_with(|| "x".into());
  plot.ylabel.get_or_insert_with(|| "y".into());
  plot.zlabel.get_or_insert_with(|| "z".into());
  Ok(plot)
}
