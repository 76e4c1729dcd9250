use num_complex::Complex64;
use std::collections::HashMap;

use crate::backend::Backend;
use crate::expression::Symbol;
use crate::series::Series;
use crate::{PlotError, PlotWarning};

/// The series of one plot call, with axis labels and the warnings raised
/// while building it.
#[derive(Debug, Default)]
pub struct Plot {
  pub series: Vec<Series>,
  pub warnings: Vec<PlotWarning>,
  pub title: Option<String>,
  pub xlabel: Option<String>,
  pub ylabel: Option<String>,
  pub zlabel: Option<String>,
  /// Backend index of each series once rendered.
  handles: Vec<usize>,
}

impl Plot {
  pub fn new(series: Vec<Series>) -> Self {
    Plot {
      series,
      ..Default::default()
    }
  }

  pub fn is_3d(&self) -> bool {
    self.series.iter().any(|s| s.is_3d())
  }

  pub fn is_interactive(&self) -> bool {
    self.series.iter().any(|s| s.is_interactive())
  }

  /// Compute the data of every stale series.
  pub fn evaluate(&mut self) -> Result<(), PlotError> {
    #[cfg(feature = "parallel")]
    use rayon::prelude::*;
    #[cfg(feature = "parallel")]
    let result = self
      .series
      .par_iter_mut()
      .try_for_each(|s| s.get_data().map(|_| ()));
    #[cfg(not(feature = "parallel"))]
    let result = self
      .series
      .iter_mut()
      .try_for_each(|s| s.get_data().map(|_| ()));
    result
  }

  /// Rebind parameters of the interactive series and recompute them.
  /// Returns the positions of the series that changed.
  pub fn update_interactive(
    &mut self,
    bindings: &HashMap<Symbol, Complex64>,
  ) -> Result<Vec<usize>, PlotError> {
    let mut updated = Vec::new();
    for (i, s) in self.series.iter_mut().enumerate() {
      if s.is_interactive() {
        s.update_data(bindings)?;
        updated.push(i);
      }
    }
    log::debug!("updated {} interactive series", updated.len());
    Ok(updated)
  }

  /// Hand every series to `backend`, remembering where each one went.
  pub fn render<B: Backend>(&mut self, backend: &mut B) -> Result<(), PlotError> {
    self.evaluate()?;
    self.handles = self
      .series
      .iter()
      .map(|s| backend.add(s))
      .collect::<Result<_, _>>()?;
    Ok(())
  }

  /// Recompute the interactive series and replace their data in `backend`
  /// in place. The plot must have been rendered to `backend` before.
  pub fn push_updates<B: Backend>(
    &mut self,
    backend: &mut B,
    bindings: &HashMap<Symbol, Complex64>,
  ) -> Result<(), PlotError> {
    if self.handles.len() != self.series.len() {
      return Err(PlotError::EvaluationError(
        "the plot has not been rendered".into(),
      ));
    }
    for i in self.update_interactive(bindings)? {
      backend.update(self.handles[i], &self.series[i])?;
    }
    Ok(())
  }

  pub fn handles(&self) -> &[usize] {
    &self.handles
  }
}
