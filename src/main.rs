use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use num_complex::Complex64;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use symplot::evaluator::{compile, evaluate_constant};
use symplot::functions::{self, DomainColoring};
use symplot::sampling::Scale;
use symplot::{JsonBackend, PlotConfig, PlotOptions, Symbol};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlotKind {
  Line,
  Parametric,
  Parametric3dLine,
  Surface,
  ParametricSurface,
  Implicit,
  Complex,
  RealImag,
  ComplexList,
  ComplexVector,
  Vector,
}

#[derive(Subcommand)]
enum Commands {
  /// Sample a plot and print it as JSON
  Plot {
    kind: PlotKind,
    /// Plot arguments, e.g. "sin(x), (x, -5, 5), \"sine\""
    arguments: String,
    #[arg(long)]
    n: Option<usize>,
    #[arg(long)]
    n1: Option<usize>,
    #[arg(long)]
    n2: Option<usize>,
    #[arg(long)]
    n3: Option<usize>,
    #[arg(long)]
    xscale: Option<Scale>,
    #[arg(long)]
    yscale: Option<Scale>,
    #[arg(long)]
    zscale: Option<Scale>,
    /// Parameter with its initial value, e.g. u=1
    #[arg(long = "param")]
    params: Vec<String>,
    /// New parameter value pushed after the first render, e.g. u=2
    #[arg(long = "update")]
    updates: Vec<String>,
    #[arg(long)]
    label: Vec<String>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    real: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    imag: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    abs: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    arg: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    absarg: Option<bool>,
    #[arg(long)]
    coloring: Option<DomainColoring>,
    #[arg(long)]
    threed: bool,
    #[arg(long)]
    adaptive: bool,
    #[arg(long)]
    streamlines: bool,
    #[arg(long)]
    title: Option<String>,
    /// JSON file with plot defaults
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
  },
  /// Evaluate an expression numerically
  Eval {
    expression: String,
    /// Value of a free symbol, e.g. x=1
    #[arg(long)]
    at: Vec<String>,
  },
}

/// `name=value` with a constant value such as `2`, `pi/4` or `1 + I`.
fn parse_binding(binding: &str) -> Result<(Symbol, Complex64)> {
  let (name, value) = binding
    .split_once('=')
    .ok_or_else(|| anyhow!("expected name=value, received {binding}"))?;
  let expr = symplot::parse_expr(value)?;
  let value = evaluate_constant(&expr)
    .ok_or_else(|| anyhow!("{value} is not a constant"))?;
  Ok((Symbol::new(name.trim()), value))
}

fn format_complex(z: Complex64) -> String {
  if z.im == 0.0 {
    z.re.to_string()
  } else {
    z.to_string()
  }
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("warn"),
  )
  .init();
  let cli = Cli::parse();

  match cli.command {
    Commands::Plot {
      kind,
      arguments,
      n,
      n1,
      n2,
      n3,
      xscale,
      yscale,
      zscale,
      params,
      updates,
      label,
      real,
      imag,
      abs,
      arg,
      absarg,
      coloring,
      threed,
      adaptive,
      streamlines,
      title,
      config,
      pretty,
    } => {
      let cfg = match config {
        Some(path) => PlotConfig::from_path(&path)
          .with_context(|| format!("loading {}", path.display()))?,
        None => PlotConfig::default(),
      };
      let params = params
        .iter()
        .map(|p| parse_binding(p))
        .collect::<Result<BTreeMap<_, _>>>()?;
      let opts = PlotOptions {
        n,
        n1,
        n2,
        n3,
        xscale: xscale.unwrap_or_default(),
        yscale: yscale.unwrap_or_default(),
        zscale: zscale.unwrap_or_default(),
        adaptive,
        params,
        label,
        threed,
        streamlines,
        coloring,
        title,
        real,
        imag,
        abs,
        arg,
        absarg,
        ..Default::default()
      };

      let args = symplot::parse_arguments(&arguments)?;
      let mut plot = match kind {
        PlotKind::Line => functions::plot(args, &opts, &cfg),
        PlotKind::Parametric => functions::plot_parametric(args, &opts, &cfg),
        PlotKind::Parametric3dLine => {
          functions::plot3d_parametric_line(args, &opts, &cfg)
        }
        PlotKind::Surface => functions::plot3d(args, &opts, &cfg),
        PlotKind::ParametricSurface => {
          functions::plot3d_parametric_surface(args, &opts, &cfg)
        }
        PlotKind::Implicit => functions::plot_implicit(args, &opts, &cfg),
        PlotKind::Complex => functions::plot_complex(args, &opts, &cfg),
        PlotKind::RealImag => functions::plot_real_imag(args, &opts, &cfg),
        PlotKind::ComplexList => {
          functions::plot_complex_list(args, &opts, &cfg)
        }
        PlotKind::ComplexVector => {
          functions::plot_complex_vector(args, &opts, &cfg)
        }
        PlotKind::Vector => functions::plot_vector(args, &opts, &cfg),
      }?;

      let mut backend = JsonBackend::new();
      plot.render(&mut backend)?;
      if !updates.is_empty() {
        let bindings = updates
          .iter()
          .map(|u| parse_binding(u))
          .collect::<Result<HashMap<_, _>>>()?;
        plot.push_updates(&mut backend, &bindings)?;
      }
      let doc = backend.document(&plot);
      if pretty {
        println!("{}", serde_json::to_string_pretty(&doc)?);
      } else {
        println!("{doc}");
      }
    }
    Commands::Eval { expression, at } => {
      let expr = symplot::parse_expr(&expression)?;
      let bindings = at
        .iter()
        .map(|b| parse_binding(b))
        .collect::<Result<Vec<_>>>()?;
      let missing: Vec<String> = expr
        .free_symbols()
        .into_iter()
        .filter(|s| !bindings.iter().any(|(b, _)| b == s))
        .map(|s| s.to_string())
        .collect();
      if !missing.is_empty() {
        bail!("no value given for {}", missing.join(", "));
      }
      let (signature, values): (Vec<Symbol>, Vec<Complex64>) =
        bindings.into_iter().unzip();
      let f = compile(&expr, &signature)?;
      println!("{}", format_complex(f(&values)));
    }
  }
  Ok(())
}
