//! Rendering targets.
//!
//! A [`Backend`] receives evaluated series from [`Plot::render`] and keeps
//! them under an index; interactive updates replace the data at that index.
//! [`JsonBackend`] turns each series into a JSON trace that a front end can
//! draw.

use ndarray::{ArrayView1, ArrayView2, ArrayView3};
use serde_json::{Map, Value, json};

use crate::PlotError;
use crate::figure::Plot;
use crate::functions::field_plot::seed_points;
use crate::functions::mesh::vertices_indices;
use crate::series::{Series, SeriesData};

pub trait Backend {
  /// Add an evaluated series; returns the index to update it later.
  fn add(&mut self, series: &Series) -> Result<usize, PlotError>;

  /// Replace the data of the series at `index`.
  fn update(&mut self, index: usize, series: &Series) -> Result<(), PlotError>;
}

/// NaN and infinities become `null`.
fn number(x: f64) -> Value {
  serde_json::Number::from_f64(x)
    .map(Value::Number)
    .unwrap_or(Value::Null)
}

fn vec1(a: ArrayView1<f64>) -> Value {
  Value::Array(a.iter().map(|&x| number(x)).collect())
}

fn vec2(a: ArrayView2<f64>) -> Value {
  Value::Array(a.outer_iter().map(vec1).collect())
}

fn vec3(a: ArrayView3<f64>) -> Value {
  Value::Array(a.outer_iter().map(vec2).collect())
}

fn colors2(a: ArrayView2<u8>) -> Value {
  Value::Array(
    a.outer_iter()
      .map(|row| row.iter().map(|&c| Value::from(c)).collect())
      .collect(),
  )
}

fn colors3(a: ArrayView3<u8>) -> Value {
  Value::Array(a.outer_iter().map(colors2).collect())
}

fn mesh(
  x: ArrayView2<f64>,
  y: ArrayView2<f64>,
  z: ArrayView2<f64>,
) -> Result<Value, PlotError> {
  let (vertices, indices) =
    vertices_indices(&x.to_owned(), &y.to_owned(), &z.to_owned())?;
  Ok(json!({
    "vertices": vec2(vertices.view()),
    "indices": indices,
  }))
}

fn data_to_json(
  series: &Series,
  data: &SeriesData,
) -> Result<Value, PlotError> {
  let surface = series.is_3d_surface();
  let value = match data {
    SeriesData::Line { x, y } => {
      json!({ "x": vec1(x.view()), "y": vec1(y.view()) })
    }
    SeriesData::AbsArgLine { x, abs, arg, colors } => json!({
      "x": vec1(x.view()),
      "abs": vec1(abs.view()),
      "arg": vec1(arg.view()),
      "colors": colors2(colors.view()),
    }),
    SeriesData::Parametric2DLine { x, y, param } => json!({
      "x": vec1(x.view()),
      "y": vec1(y.view()),
      "param": vec1(param.view()),
    }),
    SeriesData::Parametric3DLine { x, y, z, param } => json!({
      "x": vec1(x.view()),
      "y": vec1(y.view()),
      "z": vec1(z.view()),
      "param": vec1(param.view()),
    }),
    SeriesData::Surface { x, y, z } => {
      let mut v = json!({
        "x": vec2(x.view()),
        "y": vec2(y.view()),
        "z": vec2(z.view()),
      });
      if surface {
        v["mesh"] = mesh(x.view(), y.view(), z.view())?;
      }
      v
    }
    SeriesData::ComplexSurface { re, im, z } => {
      let mut v = json!({
        "re": vec2(re.view()),
        "im": vec2(im.view()),
        "z": vec2(z.view()),
      });
      if surface {
        v["mesh"] = mesh(re.view(), im.view(), z.view())?;
      }
      v
    }
    SeriesData::DomainColoring {
      re,
      im,
      abs,
      arg,
      colors,
    } => {
      let mut v = json!({
        "re": vec2(re.view()),
        "im": vec2(im.view()),
        "abs": vec2(abs.view()),
        "arg": vec2(arg.view()),
        "colors": colors3(colors.view()),
      });
      if surface {
        v["mesh"] = mesh(re.view(), im.view(), abs.view())?;
      }
      v
    }
    SeriesData::Implicit { x, y, z, equality } => json!({
      "x": vec2(x.view()),
      "y": vec2(y.view()),
      "z": vec2(z.view()),
      "equality": equality,
    }),
    SeriesData::Vector2D { x, y, u, v } => json!({
      "x": vec2(x.view()),
      "y": vec2(y.view()),
      "u": vec2(u.view()),
      "v": vec2(v.view()),
    }),
    SeriesData::Vector3D { x, y, z, u, v, w } => {
      let mut value = json!({
        "x": vec3(x.view()),
        "y": vec3(y.view()),
        "z": vec3(z.view()),
        "u": vec3(u.view()),
        "v": vec3(v.view()),
        "w": vec3(w.view()),
      });
      if series.has_streamlines() {
        let seeds = seed_points(x, y, z, u, v, w)?;
        value["seeds"] = vec2(seeds.view());
      }
      value
    }
    SeriesData::ComplexPoints { re, im } => {
      json!({ "re": vec1(re.view()), "im": vec1(im.view()) })
    }
  };
  Ok(value)
}

/// JSON description of one evaluated series.
pub fn trace(series: &Series) -> Result<Value, PlotError> {
  let data = series.data().ok_or_else(|| {
    PlotError::EvaluationError(format!("{series} has not been evaluated"))
  })?;
  Ok(json!({
    "kind": series.kind().name(),
    "label": series.label,
    "projection": series.projection().map(|p| p.key()),
    "is_3d": series.is_3d(),
    "interactive": series.is_interactive(),
    "rendering_kw": Value::Object(series.rendering_kw.clone()),
    "data": data_to_json(series, data)?,
  }))
}

/// Collects one JSON trace per series.
#[derive(Debug, Default)]
pub struct JsonBackend {
  traces: Vec<Value>,
}

impl JsonBackend {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn traces(&self) -> &[Value] {
    &self.traces
  }

  /// The whole figure: labels, warnings and the traces added so far.
  pub fn document(&self, plot: &Plot) -> Value {
    let mut doc = Map::new();
    for (key, value) in [
      ("title", &plot.title),
      ("xlabel", &plot.xlabel),
      ("ylabel", &plot.ylabel),
      ("zlabel", &plot.zlabel),
    ] {
      if let Some(v) = value {
        doc.insert(key.into(), Value::from(v.as_str()));
      }
    }
    doc.insert("is_3d".into(), Value::from(plot.is_3d()));
    doc.insert(
      "warnings".into(),
      plot.warnings.iter().map(|w| w.to_string()).collect(),
    );
    doc.insert("traces".into(), Value::Array(self.traces.clone()));
    Value::Object(doc)
  }
}

impl Backend for JsonBackend {
  fn add(&mut self, series: &Series) -> Result<usize, PlotError> {
    self.traces.push(trace(series)?);
    Ok(self.traces.len() - 1)
  }

  fn update(&mut self, index: usize, series: &Series) -> Result<(), PlotError> {
    let data = trace(series)?;
    let slot = self.traces.get_mut(index).ok_or_else(|| {
      PlotError::EvaluationError(format!("no trace at index {index}"))
    })?;
    *slot = data;
    Ok(())
  }
}
