//! Classification of the loose argument list of a plot call.
//!
//! A call is one of two shapes:
//!
//! * shared range: `sin(x), cos(x), (x, -5, 5), "label"`. The expressions
//!   share the ranges and the label.
//! * per group: `(sin(x), (x, -5, 5), "a"), (cos(x), "b"), (x, -2, 2)`.
//!   Each group may carry its own ranges, label and rendering options; the
//!   top-level ones are defaults for groups that omit them.
//!
//! [`PlotRequest::from_args`] decides the shape once, and
//! [`PlotRequest::canonicalize`] turns it into [`CanonicalArgs`], one per
//! series to build.

use pest::iterators::Pair;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::PlotConfig;
use crate::evaluator::evaluate_constant;
use crate::expression::{ExprRef, Symbol};
use crate::functions::ranges::create_ranges;
use crate::series::Range;
use crate::syntax::{CONSTANTS, Expr, pair_to_expr};
use crate::{PlotError, Rule};

#[derive(Debug, Clone)]
pub enum PlotArg {
  Expr(ExprRef),
  Range(Range),
  Label(String),
  RenderingKw(Map<String, Value>),
  Group(Vec<PlotArg>),
  /// A bracketed list of expressions, e.g. complex points.
  List(Vec<ExprRef>),
}

impl PlotArg {
  pub fn range(symbol: &str, start: f64, end: f64) -> Self {
    PlotArg::Range(Range::new(symbol, start, end))
  }

  fn describe(&self) -> String {
    match self {
      PlotArg::Expr(e) => e.to_string(),
      PlotArg::Range(r) => r.to_string(),
      PlotArg::Label(l) => format!("{l:?}"),
      PlotArg::RenderingKw(m) => Value::Object(m.clone()).to_string(),
      PlotArg::Group(items) => {
        let parts: Vec<String> = items.iter().map(|a| a.describe()).collect();
        format!("({})", parts.join(", "))
      }
      PlotArg::List(items) => {
        let parts: Vec<String> = items.iter().map(|e| e.to_string()).collect();
        format!("[{}]", parts.join(", "))
      }
    }
  }
}

impl From<Expr> for PlotArg {
  fn from(e: Expr) -> Self {
    PlotArg::Expr(Arc::new(e))
  }
}

impl From<ExprRef> for PlotArg {
  fn from(e: ExprRef) -> Self {
    PlotArg::Expr(e)
  }
}

impl From<Range> for PlotArg {
  fn from(r: Range) -> Self {
    PlotArg::Range(r)
  }
}

impl From<&str> for PlotArg {
  fn from(label: &str) -> Self {
    PlotArg::Label(label.to_string())
  }
}

impl From<Map<String, Value>> for PlotArg {
  fn from(kw: Map<String, Value>) -> Self {
    PlotArg::RenderingKw(kw)
  }
}

impl From<Vec<PlotArg>> for PlotArg {
  fn from(items: Vec<PlotArg>) -> Self {
    PlotArg::Group(items)
  }
}

/// `(symbol, constant, constant)` read as a range.
fn tuple_to_range(items: &[Pair<Rule>]) -> Option<Range> {
  if items.len() != 3 || items.iter().any(|p| p.as_rule() != Rule::Expression)
  {
    return None;
  }
  let symbol = match pair_to_expr(items[0].clone()) {
    Expr::Identifier(name) if !CONSTANTS.contains(&name.as_str()) => name,
    _ => return None,
  };
  let start = evaluate_constant(&pair_to_expr(items[1].clone()))?;
  let end = evaluate_constant(&pair_to_expr(items[2].clone()))?;
  Some(Range::complex(Symbol::new(&symbol), start, end))
}

/// Convert one parsed argument of an `Arguments` rule.
pub fn pair_to_arg(pair: Pair<Rule>) -> Result<PlotArg, PlotError> {
  match pair.as_rule() {
    Rule::Expression => Ok(PlotArg::Expr(Arc::new(pair_to_expr(pair)))),
    Rule::String => snailquote::unescape(pair.as_str())
      .map(PlotArg::Label)
      .map_err(|e| PlotError::MalformedArguments(e.to_string())),
    Rule::Object => serde_json::from_str::<Map<String, Value>>(pair.as_str())
      .map(PlotArg::RenderingKw)
      .map_err(|e| PlotError::MalformedArguments(e.to_string())),
    Rule::Tuple => {
      let items: Vec<Pair<Rule>> = pair.into_inner().collect();
      if let Some(range) = tuple_to_range(&items) {
        return Ok(PlotArg::Range(range));
      }
      let items = items
        .into_iter()
        .map(pair_to_arg)
        .collect::<Result<Vec<_>, _>>()?;
      Ok(PlotArg::Group(items))
    }
    Rule::List => pair
      .into_inner()
      .map(|p| match pair_to_arg(p)? {
        PlotArg::Expr(e) => Ok(e),
        other => Err(PlotError::MalformedArguments(format!(
          "lists may only contain expressions, found {}",
          other.describe()
        ))),
      })
      .collect::<Result<Vec<_>, _>>()
      .map(PlotArg::List),
    rule => Err(PlotError::MalformedArguments(format!(
      "unexpected argument {rule:?}"
    ))),
  }
}

/// Default label of a group of expressions: the expression itself, or the
/// tuple of expressions.
pub fn default_label(exprs: &[ExprRef]) -> String {
  if exprs.len() == 1 {
    exprs[0].to_string()
  } else {
    let parts: Vec<String> = exprs.iter().map(|e| e.to_string()).collect();
    format!("({})", parts.join(", "))
  }
}

/// Flat separation of `args` into expressions, ranges and label.
///
/// The first label wins; without one, the label is the default label of the
/// expressions. List items count as expressions.
pub fn unpack_args(args: &[PlotArg]) -> (Vec<ExprRef>, Vec<Range>, String) {
  let mut exprs = Vec::new();
  let mut ranges = Vec::new();
  let mut label = None;
  for a in args {
    match a {
      PlotArg::Expr(e) => exprs.push(Arc::clone(e)),
      PlotArg::List(items) => exprs.extend(items.iter().cloned()),
      PlotArg::Range(r) => ranges.push(r.clone()),
      PlotArg::Label(l) => {
        label.get_or_insert_with(|| l.clone());
      }
      PlotArg::RenderingKw(_) | PlotArg::Group(_) => {}
    }
  }
  let label = label.unwrap_or_else(|| default_label(&exprs));
  (exprs, ranges, label)
}

/// First rendering options among `args`.
pub fn find_rendering_kw(args: &[PlotArg]) -> Option<Map<String, Value>> {
  args.iter().find_map(|a| match a {
    PlotArg::RenderingKw(kw) => Some(kw.clone()),
    _ => None,
  })
}

/// One group of a per-group call.
#[derive(Debug, Clone)]
pub struct ArgGroup {
  pub exprs: Vec<ExprRef>,
  pub ranges: Vec<Range>,
  pub label: Option<String>,
  pub rendering_kw: Option<Map<String, Value>>,
}

#[derive(Debug, Clone)]
pub enum PlotRequest {
  SharedRange {
    exprs: Vec<ExprRef>,
    ranges: Vec<Range>,
    label: Option<String>,
    rendering_kw: Option<Map<String, Value>>,
  },
  PerGroup {
    groups: Vec<ArgGroup>,
    ranges: Vec<Range>,
    label: Option<String>,
    rendering_kw: Option<Map<String, Value>>,
  },
}

/// Arguments of one series: `(*exprs, *ranges, label)` plus its rendering
/// options.
#[derive(Debug, Clone)]
pub struct CanonicalArgs {
  pub exprs: Vec<ExprRef>,
  pub ranges: Vec<Range>,
  pub label: String,
  pub rendering_kw: Map<String, Value>,
}

fn malformed(exprs: &[ExprRef], others: &[&PlotArg]) -> PlotError {
  let exprs: Vec<String> = exprs.iter().map(|e| e.to_string()).collect();
  let others: Vec<String> = others.iter().map(|a| a.describe()).collect();
  PlotError::MalformedArguments(format!(
    "Expressions must be followed by ranges. Received:\nExpressions: [{}]\nOthers: [{}]",
    exprs.join(", "),
    others.join(", ")
  ))
}

fn parse_group(items: &[PlotArg], nexpr: usize) -> Result<ArgGroup, PlotError> {
  let mut exprs = Vec::new();
  let mut rest = items.iter();
  for a in rest.by_ref().take(nexpr) {
    match a {
      PlotArg::Expr(e) => exprs.push(Arc::clone(e)),
      _ => break,
    }
  }
  if exprs.len() != nexpr {
    return Err(PlotError::MalformedArguments(format!(
      "each group must start with {nexpr} expressions, received {}",
      PlotArg::Group(items.to_vec()).describe()
    )));
  }
  let mut group = ArgGroup {
    exprs,
    ranges: Vec::new(),
    label: None,
    rendering_kw: None,
  };
  let mut others = Vec::new();
  for a in rest {
    match a {
      PlotArg::Range(r) => group.ranges.push(r.clone()),
      PlotArg::Label(l) => {
        group.label.get_or_insert_with(|| l.clone());
      }
      PlotArg::RenderingKw(kw) => {
        group.rendering_kw.get_or_insert_with(|| kw.clone());
      }
      other => others.push(other),
    }
  }
  if !others.is_empty() {
    return Err(malformed(&group.exprs, &others));
  }
  Ok(group)
}

fn symbols_of(
  exprs: &[ExprRef],
  params: &BTreeSet<Symbol>,
) -> BTreeSet<Symbol> {
  exprs
    .iter()
    .flat_map(|e| e.free_symbols())
    .filter(|s| !params.contains(s))
    .collect()
}

impl PlotRequest {
  /// Decide the call shape. `nexpr` is the number of expressions forming one
  /// series (2 for a 2D parametric line).
  pub fn from_args(args: Vec<PlotArg>, nexpr: usize) -> Result<Self, PlotError> {
    let shared = args.len() >= nexpr
      && nexpr > 0
      && args[..nexpr].iter().all(|a| matches!(a, PlotArg::Expr(_)));

    if shared {
      let mut exprs = Vec::new();
      let mut ranges = Vec::new();
      let mut label = None;
      let mut rendering_kw = None;
      let mut others = Vec::new();
      for a in &args {
        match a {
          PlotArg::Expr(e) => exprs.push(Arc::clone(e)),
          PlotArg::Range(r) => ranges.push(r.clone()),
          PlotArg::Label(l) => {
            label.get_or_insert_with(|| l.clone());
          }
          PlotArg::RenderingKw(kw) => {
            rendering_kw.get_or_insert_with(|| kw.clone());
          }
          other => others.push(other),
        }
      }
      if !others.is_empty() {
        return Err(malformed(&exprs, &others));
      }
      return Ok(PlotRequest::SharedRange {
        exprs,
        ranges,
        label,
        rendering_kw,
      });
    }

    let mut groups = Vec::new();
    let mut ranges = Vec::new();
    let mut label = None;
    let mut rendering_kw = None;
    let mut stray: Vec<ExprRef> = Vec::new();
    let mut others = Vec::new();
    for a in &args {
      match a {
        PlotArg::Group(items) => groups.push(parse_group(items, nexpr)?),
        PlotArg::Range(r) => ranges.push(r.clone()),
        PlotArg::Label(l) => {
          label.get_or_insert_with(|| l.clone());
        }
        PlotArg::RenderingKw(kw) => {
          rendering_kw.get_or_insert_with(|| kw.clone());
        }
        PlotArg::Expr(e) => stray.push(Arc::clone(e)),
        other => others.push(other),
      }
    }
    if !stray.is_empty() || !others.is_empty() {
      return Err(malformed(&stray, &others));
    }
    Ok(PlotRequest::PerGroup {
      groups,
      ranges,
      label,
      rendering_kw,
    })
  }

  /// Resolve ranges and labels, producing one entry per series.
  ///
  /// Symbols in `params` are external parameters and need no range.
  pub fn canonicalize(
    &self,
    nexpr: usize,
    arity: usize,
    params: &BTreeSet<Symbol>,
    cfg: &PlotConfig,
  ) -> Result<Vec<CanonicalArgs>, PlotError> {
    match self {
      PlotRequest::SharedRange {
        exprs,
        ranges,
        label,
        rendering_kw,
      } => {
        let free = symbols_of(exprs, params);
        let ranges = create_ranges(&free, ranges.clone(), arity, cfg)?;
        let step = nexpr.max(1);
        if exprs.len() % step != 0 {
          return Err(PlotError::MalformedArguments(format!(
            "expected a multiple of {step} expressions, received {}: {}",
            exprs.len(),
            default_label(exprs)
          )));
        }
        Ok(
          exprs
            .chunks(step)
            .map(|chunk| CanonicalArgs {
              exprs: chunk.to_vec(),
              ranges: ranges.clone(),
              label: label.clone().unwrap_or_else(|| default_label(chunk)),
              rendering_kw: rendering_kw.clone().unwrap_or_default(),
            })
            .collect(),
        )
      }
      PlotRequest::PerGroup {
        groups,
        ranges,
        label,
        rendering_kw,
      } => groups
        .iter()
        .map(|g| {
          let local = if g.ranges.is_empty() {
            ranges.clone()
          } else {
            g.ranges.clone()
          };
          let free = symbols_of(&g.exprs, params);
          Ok(CanonicalArgs {
            exprs: g.exprs.clone(),
            ranges: create_ranges(&free, local, arity, cfg)?,
            label: g
              .label
              .clone()
              .or_else(|| label.clone())
              .unwrap_or_else(|| default_label(&g.exprs)),
            rendering_kw: g
              .rendering_kw
              .clone()
              .or_else(|| rendering_kw.clone())
              .unwrap_or_default(),
          })
        })
        .collect(),
    }
  }
}
