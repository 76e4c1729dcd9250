use crate::PlotError;
use crate::config::PlotConfig;
use crate::figure::Plot;
use crate::functions::arguments::PlotArg;
use crate::functions::plot::{PlotOptions, build_series, finish};
use crate::series::SeriesKind;

/// plot_parametric(fx(t), fy(t), (t, tmin, tmax))
///
/// Several curves are passed as groups:
/// `((fx1, fy1, (t, 0, 1), "a"), (fx2, fy2, "b"))`.
pub fn plot_parametric(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let series = build_series(
    args,
    SeriesKind::Parametric2DLine,
    cfg.n_line,
    opts,
    cfg,
  )?;
  let mut plot = finish(series, opts)?;
  plot.xlabel.get_or_insert_with(|| "x".into());
  plot.ylabel.get_or_insert_with(|| "y".into());
  Ok(plot)
}

/// plot3d_parametric_line(fx(t), fy(t), fz(t), (t, tmin, tmax))
pub fn plot3d_parametric_line(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let series = build_series(
    args,
    SeriesKind::Parametric3DLine,
    cfg.n_line,
    opts,
    cfg,
  )?;
  let mut plot = finish(series, opts)?;
  plot.xlabel.get_or_insert_with(|| "x".into());
  plot.ylabel.get_or_insert_with(|| "y".into());
  plot.zlabel.get_or_insert_with(|| "z".into());
  Ok(plot)
}
