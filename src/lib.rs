use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

pub mod backend;
pub mod config;
pub mod evaluator;
pub mod expression;
pub mod figure;
pub mod functions;
pub mod sampling;
pub mod series;
pub mod syntax;

pub use backend::{Backend, JsonBackend};
pub use config::PlotConfig;
pub use expression::{CompiledFn, ExprRef, Expression, NumericFunction, Symbol};
pub use figure::Plot;
pub use functions::arguments::{CanonicalArgs, PlotArg, PlotRequest};
pub use functions::plot::PlotOptions;
pub use series::{Projection, Range, Series, SeriesData, SeriesKind};
pub use syntax::Expr;

#[derive(Parser)]
#[grammar = "plot.pest"]
pub struct PlotParser;

#[derive(Error, Debug)]
pub enum PlotError {
  #[error("Parse error: {0}")]
  ParseError(#[from] Box<pest::error::Error<Rule>>),
  #[error("Malformed arguments: {0}")]
  MalformedArguments(String),
  #[error(
    "Too many free symbols.\nExpected {expected} free symbols.\nReceived {received}: {symbols}"
  )]
  TooManyFreeSymbols {
    expected: usize,
    received: usize,
    symbols: String,
  },
  #[error("Too many ranges. Received {received}, expected {expected}")]
  TooManyRanges { expected: usize, received: usize },
  #[error("Multiple ranges with the same symbol: {0}")]
  DuplicateRangeSymbol(String),
  #[error(
    "Incompatible free symbols of the expressions with the ranges.\nFree symbols in the expressions: {expressions}\nFree symbols in the ranges: {ranges}"
  )]
  IncompatibleRanges { expressions: String, ranges: String },
  #[error("Unsupported expression type: {0}")]
  UnsupportedExpressionType(String),
  #[error("Dimension mismatch: {0}")]
  DimensionMismatch(String),
  #[error("Evaluation error: {0}")]
  EvaluationError(String),
  #[error("Configuration error: {0}")]
  ConfigError(String),
}

/// Non-fatal conditions collected on a [`Plot`] while it is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlotWarning {
  #[error("No series found. Check your keyword arguments.")]
  NoSeries,
}

impl PlotParser {
  pub fn parse_program(
    input: &str,
  ) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>>
  {
    Self::parse(Rule::Program, input).map_err(Box::new)
  }

  pub fn parse_arguments(
    input: &str,
  ) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>>
  {
    Self::parse(Rule::Arguments, input).map_err(Box::new)
  }
}

pub fn parse(
  input: &str,
) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
  PlotParser::parse_program(input)
}

/// Parse a single expression such as `"sin(x)^2 + y"`.
pub fn parse_expr(input: &str) -> Result<Expr, PlotError> {
  let program = parse(input)?
    .next()
    .ok_or_else(|| PlotError::MalformedArguments("empty input".into()))?;
  let expression = program
    .into_inner()
    .find(|p| p.as_rule() == Rule::Expression)
    .ok_or_else(|| PlotError::MalformedArguments("empty input".into()))?;
  Ok(syntax::pair_to_expr(expression))
}

/// Parse the argument list of a plot call, e.g.
/// `"sin(x), cos(x), (x, -5, 5), \"f\""`.
pub fn parse_arguments(input: &str) -> Result<Vec<PlotArg>, PlotError> {
  let arguments = PlotParser::parse_arguments(input)?
    .next()
    .ok_or_else(|| PlotError::MalformedArguments("empty input".into()))?;
  arguments
    .into_inner()
    .filter(|p| p.as_rule() != Rule::EOI)
    .map(functions::arguments::pair_to_arg)
    .collect()
}
