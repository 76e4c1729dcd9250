use super::*;
use ndarray::Array2;
use symplot::functions::vertices_indices;

fn grid(rows: usize, cols: usize) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
  let x = Array2::from_shape_fn((rows, cols), |(_, j)| j as f64);
  let y = Array2::from_shape_fn((rows, cols), |(i, _)| i as f64);
  let z = &x * &y;
  (x, y, z)
}

mod vertices_indices_tests {
  use super::*;

  #[test]
  fn three_by_three_grid() {
    let (x, y, z) = grid(3, 3);
    let (vertices, faces) = vertices_indices(&x, &y, &z).unwrap();
    assert_eq!(vertices.shape(), &[9, 3]);
    assert_eq!(faces.len(), 8);
    assert!(faces.iter().flatten().all(|&k| k < 9));
  }

  #[test]
  fn vertices_are_row_major() {
    let (x, y, z) = grid(2, 3);
    let (vertices, _) = vertices_indices(&x, &y, &z).unwrap();
    assert_eq!(vertices.row(4).to_vec(), vec![1.0, 1.0, 1.0]);
    assert_eq!(vertices.row(5).to_vec(), vec![2.0, 1.0, 2.0]);
  }

  #[test]
  fn face_winding() {
    let (x, y, z) = grid(2, 2);
    let (_, faces) = vertices_indices(&x, &y, &z).unwrap();
    assert_eq!(faces, vec![[3, 1, 2], [0, 2, 1]]);
  }

  #[test]
  fn every_cell_is_covered() {
    let (x, y, z) = grid(4, 5);
    let (_, faces) = vertices_indices(&x, &y, &z).unwrap();
    assert_eq!(faces.len(), 2 * 3 * 4);
    for k in 0..20 {
      assert!(faces.iter().any(|f| f.contains(&k)));
    }
  }

  #[test]
  fn degenerate_grids_have_no_faces() {
    let (x, y, z) = grid(1, 4);
    let (vertices, faces) = vertices_indices(&x, &y, &z).unwrap();
    assert_eq!(vertices.shape(), &[4, 3]);
    assert!(faces.is_empty());
  }

  #[test]
  fn shapes_must_agree() {
    let (x, y, _) = grid(2, 2);
    let z = Array2::zeros((3, 2));
    assert!(matches!(
      vertices_indices(&x, &y, &z),
      Err(PlotError::DimensionMismatch(_))
    ));
  }
}
