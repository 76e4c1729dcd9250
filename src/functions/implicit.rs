use crate::PlotError;
use crate::config::PlotConfig;
use crate::figure::Plot;
use crate::functions::arguments::PlotArg;
use crate::functions::plot::{PlotOptions, build_series, finish};
use crate::series::SeriesKind;

/// plot_implicit(x^2 + y^2 == 4, (x, -3, 3), (y, -3, 3))
///
/// An equation `lhs == rhs` (or a bare expression, read as `expr == 0`) is
/// sampled as `lhs - rhs` for contouring at zero. An inequality is sampled
/// as a 1/0 mask of the region where it holds.
pub fn plot_implicit(
  args: Vec<PlotArg>,
  opts: &PlotOptions,
  cfg: &PlotConfig,
) -> Result<Plot, PlotError> {
  let series =
    build_series(args, SeriesKind::Implicit, cfg.n_implicit, opts, cfg)?;
  let mut plot = finish(series, opts)?;
  if let Some(s) = plot.series.first()
    && !s.ranges().iter().any(|r| r.symbol.is_dummy())
  {
    let x = s.ranges()[0].symbol.to_string();
    let y = s.ranges()[1].symbol.to_string();
    plot.xlabel.get_or_insert(x);
    plot.ylabel.get_or_insert(y);
  }
  Ok(plot)
}
