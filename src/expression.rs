use num_complex::Complex64;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::PlotError;
use crate::syntax::{ComparisonOp, Expr};

static DUMMY_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A named variable, or a dummy standing in for an unused plot axis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
  name: Arc<str>,
  dummy: Option<usize>,
}

impl Symbol {
  pub fn new(name: &str) -> Self {
    Symbol {
      name: Arc::from(name),
      dummy: None,
    }
  }

  /// A fresh symbol, distinct from every named symbol and every other dummy.
  pub fn dummy() -> Self {
    let id = DUMMY_COUNTER.fetch_add(1, Ordering::Relaxed);
    Symbol {
      name: Arc::from(format!("_d{id}").as_str()),
      dummy: Some(id),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn is_dummy(&self) -> bool {
    self.dummy.is_some()
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

impl From<&str> for Symbol {
  fn from(name: &str) -> Self {
    Symbol::new(name)
  }
}

/// Numeric closure over the values of a signature of symbols.
pub type CompiledFn = Arc<dyn Fn(&[Complex64]) -> Complex64 + Send + Sync>;

/// Anything a series can be built from: parsed expressions or plain closures.
pub trait Expression: fmt::Display + fmt::Debug + Send + Sync {
  fn free_symbols(&self) -> BTreeSet<Symbol>;

  /// Compile to a closure taking one value per symbol of `signature`,
  /// in order.
  fn compile(&self, signature: &[Symbol]) -> Result<CompiledFn, PlotError>;

  /// `false` for opaque callables that cannot be inspected.
  fn is_symbolic(&self) -> bool {
    true
  }

  /// The relation this expression states, for implicit plots.
  fn relation(&self) -> Option<ComparisonOp> {
    None
  }
}

pub type ExprRef = Arc<dyn Expression>;

impl Expression for Expr {
  fn free_symbols(&self) -> BTreeSet<Symbol> {
    Expr::free_symbols(self)
  }

  fn compile(&self, signature: &[Symbol]) -> Result<CompiledFn, PlotError> {
    crate::evaluator::compile(self, signature)
  }

  fn relation(&self) -> Option<ComparisonOp> {
    match self {
      Expr::Comparison { op, .. } => Some(*op),
      _ => None,
    }
  }
}

/// A user-supplied numeric function of `arity` positional arguments.
///
/// It has no free symbols; the ranges it is plotted over decide which
/// values it receives.
#[derive(Clone)]
pub struct NumericFunction {
  name: String,
  arity: usize,
  f: CompiledFn,
}

impl NumericFunction {
  pub fn new<F>(name: &str, arity: usize, f: F) -> Self
  where
    F: Fn(&[Complex64]) -> Complex64 + Send + Sync + 'static,
  {
    NumericFunction {
      name: name.to_string(),
      arity,
      f: Arc::new(f),
    }
  }

  pub fn arity(&self) -> usize {
    self.arity
  }
}

impl fmt::Debug for NumericFunction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NumericFunction")
      .field("name", &self.name)
      .field("arity", &self.arity)
      .finish()
  }
}

impl fmt::Display for NumericFunction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

impl Expression for NumericFunction {
  fn free_symbols(&self) -> BTreeSet<Symbol> {
    BTreeSet::new()
  }

  fn compile(&self, signature: &[Symbol]) -> Result<CompiledFn, PlotError> {
    if signature.len() < self.arity {
      return Err(PlotError::EvaluationError(format!(
        "{} takes {} arguments but only {} ranges are available",
        self.name,
        self.arity,
        signature.len()
      )));
    }
    let f = Arc::clone(&self.f);
    let arity = self.arity;
    Ok(Arc::new(move |values: &[Complex64]| f(&values[..arity])))
  }

  fn is_symbolic(&self) -> bool {
    false
  }
}

/// Wrap an expression for use in plot arguments.
pub fn expr(e: Expr) -> ExprRef {
  Arc::new(e)
}

/// Wrap a numeric closure for use in plot arguments.
pub fn lambda<F>(name: &str, arity: usize, f: F) -> ExprRef
where
  F: Fn(&[Complex64]) -> Complex64 + Send + Sync + 'static,
{
  Arc::new(NumericFunction::new(name, arity, f))
}
