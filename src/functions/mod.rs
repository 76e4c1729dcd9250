// Plot entry points, and the argument and geometry helpers behind them
pub mod arguments;
pub mod complex;
pub mod field_plot;
pub mod implicit;
pub mod mesh;
pub mod parametric_plot;
pub mod plot;
pub mod plot3d;
pub mod ranges;

pub use complex::{
  DomainColoring, ProjectionFlags, build_complex_series, plot_complex,
  plot_complex_list, plot_complex_vector, plot_real_imag,
};
pub use field_plot::{plot_vector, seed_points};
pub use implicit::plot_implicit;
pub use mesh::vertices_indices;
pub use parametric_plot::{plot_parametric, plot3d_parametric_line};
pub use plot::plot;
pub use plot3d::{plot3d, plot3d_parametric_surface};
pub use ranges::create_ranges;
