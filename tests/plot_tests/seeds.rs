use super::*;
use ndarray::{Array1, Array3};
use symplot::functions::seed_points;
use symplot::sampling::meshgrid3;

type Field = [Array3<f64>; 6];

/// Samples `f` on an `n`-point symmetric box around the origin.
fn field(n: usize, f: impl Fn(f64, f64, f64) -> [f64; 3]) -> Field {
  let axis = Array1::linspace(-1.0, 1.0, n);
  let (x, y, z) = meshgrid3(&axis, &axis, &axis);
  let component = |c: usize| {
    Array3::from_shape_fn(x.dim(), |idx| f(x[idx], y[idx], z[idx])[c])
  };
  let (u, v, w) = (component(0), component(1), component(2));
  [x, y, z, u, v, w]
}

fn seeds(f: &Field) -> ndarray::Array2<f64> {
  seed_points(&f[0], &f[1], &f[2], &f[3], &f[4], &f[5]).unwrap()
}

mod seed_points_tests {
  use super::*;

  #[test]
  fn sink_enters_through_every_face() {
    for n in [2, 3, 5] {
      let f = field(n, |x, y, z| [-x, -y, -z]);
      assert_eq!(seeds(&f).nrows(), 6 * n * n);
    }
  }

  #[test]
  fn source_has_no_seeds() {
    let f = field(4, |x, y, z| [x, y, z]);
    assert_eq!(seeds(&f).nrows(), 0);
  }

  #[test]
  fn uniform_flow_enters_through_one_face() {
    let f = field(3, |_, _, _| [1.0, 0.0, 0.0]);
    let s = seeds(&f);
    assert_eq!(s.nrows(), 9);
    assert!(s.column(0).iter().all(|&x| x == -1.0));
  }

  #[test]
  fn faces_are_visited_x_first() {
    let f = field(2, |_, _, _| [-1.0, 0.0, 1.0]);
    let s = seeds(&f);
    assert_eq!(s.nrows(), 8);
    assert!(s.column(0).iter().take(4).all(|&x| x == 1.0));
    assert!(s.column(2).iter().skip(4).all(|&z| z == -1.0));
  }

  #[test]
  fn mismatched_shapes_are_rejected() {
    let mut f = field(3, |x, y, z| [x, y, z]);
    f[4] = Array3::zeros((2, 2, 2));
    let result = seed_points(&f[0], &f[1], &f[2], &f[3], &f[4], &f[5]);
    assert!(matches!(result, Err(PlotError::DimensionMismatch(_))));
  }
}
