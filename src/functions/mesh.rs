use ndarray::Array2;

use crate::PlotError;

/// Vertex index of grid node `(i, j)` in a row-major grid with `cols`
/// columns.
fn ij2k(cols: usize, i: usize, j: usize) -> usize {
  cols * i + j
}

/// Vertices and triangular faces covering a surface sampled on a grid.
///
/// `x`, `y` and `z` share the shape `(rows, cols)`. Vertices are the grid
/// nodes in row-major order, one per row of the returned `(rows*cols, 3)`
/// array. Each cell with lower-right node `(i, j)` contributes two faces:
///
/// ```text
/// [k(i, j),         k(i - 1, j), k(i, j - 1)]
/// [k(i - 1, j - 1), k(i, j - 1), k(i - 1, j)]
/// ```
pub fn vertices_indices(
  x: &Array2<f64>,
  y: &Array2<f64>,
  z: &Array2<f64>,
) -> Result<(Array2<f64>, Vec<[usize; 3]>), PlotError> {
  if x.shape() != y.shape() || x.shape() != z.shape() {
    return Err(PlotError::DimensionMismatch(format!(
      "surface grids differ in shape: x {:?}, y {:?}, z {:?}",
      x.shape(),
      y.shape(),
      z.shape()
    )));
  }
  let (rows, cols) = x.dim();

  let mut vertices = Array2::zeros((rows * cols, 3));
  for ((i, j), &xv) in x.indexed_iter() {
    let k = ij2k(cols, i, j);
    vertices[[k, 0]] = xv;
    vertices[[k, 1]] = y[[i, j]];
    vertices[[k, 2]] = z[[i, j]];
  }

  let mut faces =
    Vec::with_capacity(2 * rows.saturating_sub(1) * cols.saturating_sub(1));
  for i in 1..rows {
    for j in 1..cols {
      faces.push([
        ij2k(cols, i, j),
        ij2k(cols, i - 1, j),
        ij2k(cols, i, j - 1),
      ]);
      faces.push([
        ij2k(cols, i - 1, j - 1),
        ij2k(cols, i, j - 1),
        ij2k(cols, i - 1, j),
      ]);
    }
  }
  Ok((vertices, faces))
}
