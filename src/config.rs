//! Defaults shared by every plot call.
//!
//! A [`PlotConfig`] is passed explicitly to the plot entry points; nothing is
//! read from global state. Missing fields fall back to the values below, so
//! a JSON file only needs to name what it changes:
//!
//! ```json
//! { "default_range": [-5.0, 5.0], "n_line": 200 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::PlotError;
use crate::functions::complex::DomainColoring;
use crate::series::SeriesKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
  /// Range given to free symbols that were not supplied one.
  pub default_range: (f64, f64),
  /// Points along a line or parametric curve.
  pub n_line: usize,
  /// Points per axis of a surface or parametric surface.
  pub n_surface: usize,
  /// Points per axis of a complex line or domain.
  pub n_complex: usize,
  /// Points per axis of a 2D vector field.
  pub n_vector2d: usize,
  /// Points per axis of a 3D vector field.
  pub n_vector3d: usize,
  /// Points per axis of an implicit plot.
  pub n_implicit: usize,
  pub adaptive_goal: f64,
  pub adaptive_max_points: usize,
  pub coloring: DomainColoring,
}

impl Default for PlotConfig {
  fn default() -> Self {
    PlotConfig {
      default_range: (-10.0, 10.0),
      n_line: 1000,
      n_surface: 100,
      n_complex: 300,
      n_vector2d: 25,
      n_vector3d: 10,
      n_implicit: 100,
      adaptive_goal: 0.01,
      adaptive_max_points: 5000,
      coloring: DomainColoring::default(),
    }
  }
}

impl PlotConfig {
  /// Points per axis for a series of `kind`.
  pub fn points(&self, kind: SeriesKind) -> usize {
    match kind {
      SeriesKind::Line
      | SeriesKind::Parametric2DLine
      | SeriesKind::Parametric3DLine => self.n_line,
      SeriesKind::Surface | SeriesKind::ParametricSurface => self.n_surface,
      SeriesKind::ComplexLine
      | SeriesKind::ComplexSurface
      | SeriesKind::DomainColoring => self.n_complex,
      SeriesKind::Vector2D => self.n_vector2d,
      SeriesKind::Vector3D => self.n_vector3d,
      SeriesKind::Implicit | SeriesKind::ComplexPoints => self.n_implicit,
    }
  }

  pub fn from_json_str(json: &str) -> Result<Self, PlotError> {
    let config: PlotConfig = serde_json::from_str(json)
      .map_err(|e| PlotError::ConfigError(e.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlotError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
      PlotError::ConfigError(format!("{}: {e}", path.display()))
    })?;
    Self::from_json_str(&text)
  }

  fn validate(&self) -> Result<(), PlotError> {
    let (start, end) = self.default_range;
    if !start.is_finite() || !end.is_finite() {
      return Err(PlotError::ConfigError(format!(
        "default_range must be finite, got ({start}, {end})"
      )));
    }
    if self.adaptive_max_points < 3 {
      return Err(PlotError::ConfigError(
        "adaptive_max_points must be at least 3".into(),
      ));
    }
    Ok(())
  }
}
