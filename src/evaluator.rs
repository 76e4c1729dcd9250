use num_complex::Complex64;
use std::f64::consts::{E, PI};
use std::sync::Arc;

use crate::PlotError;
use crate::expression::{CompiledFn, Symbol};
use crate::syntax::{BinaryOperator, ComparisonOp, Expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
  Sin,
  Cos,
  Tan,
  Sinh,
  Cosh,
  Tanh,
  Asin,
  Acos,
  Atan,
  Exp,
  Log,
  Sqrt,
  Abs,
  Re,
  Im,
  Arg,
  Conj,
  Floor,
  Ceiling,
  Sign,
}

impl Func {
  fn lookup(name: &str) -> Option<Func> {
    let f = match name.to_ascii_lowercase().as_str() {
      "sin" => Func::Sin,
      "cos" => Func::Cos,
      "tan" => Func::Tan,
      "sinh" => Func::Sinh,
      "cosh" => Func::Cosh,
      "tanh" => Func::Tanh,
      "asin" | "arcsin" => Func::Asin,
      "acos" | "arccos" => Func::Acos,
      "atan" | "arctan" => Func::Atan,
      "exp" => Func::Exp,
      "log" | "ln" => Func::Log,
      "sqrt" => Func::Sqrt,
      "abs" => Func::Abs,
      "re" => Func::Re,
      "im" => Func::Im,
      "arg" => Func::Arg,
      "conj" | "conjugate" => Func::Conj,
      "floor" => Func::Floor,
      "ceiling" | "ceil" => Func::Ceiling,
      "sign" => Func::Sign,
      _ => return None,
    };
    Some(f)
  }

  /// Accepted argument counts.
  fn accepts(&self, n: usize) -> bool {
    match self {
      Func::Log => n == 1 || n == 2,
      _ => n == 1,
    }
  }
}

/// Expression lowered against a fixed signature of symbols.
#[derive(Debug, Clone)]
enum Node {
  Const(Complex64),
  Slot(usize),
  Neg(Box<Node>),
  Binary(BinaryOperator, Box<Node>, Box<Node>),
  Compare(ComparisonOp, Box<Node>, Box<Node>),
  Call(Func, Vec<Node>),
}

fn constant_value(name: &str) -> Option<Complex64> {
  match name {
    "I" => Some(Complex64::i()),
    "E" => Some(Complex64::new(E, 0.0)),
    "pi" | "Pi" => Some(Complex64::new(PI, 0.0)),
    _ => None,
  }
}

fn lower(expr: &Expr, signature: &[Symbol]) -> Result<Node, PlotError> {
  let node = match expr {
    Expr::Integer(n) => Node::Const(Complex64::new(*n as f64, 0.0)),
    Expr::Real(r) => Node::Const(Complex64::new(*r, 0.0)),
    Expr::Identifier(name) => {
      // named symbols shadow constants only when they are plot variables
      if let Some(slot) = signature
        .iter()
        .position(|s| !s.is_dummy() && s.name() == name)
      {
        Node::Slot(slot)
      } else if let Some(c) = constant_value(name) {
        Node::Const(c)
      } else {
        return Err(PlotError::EvaluationError(format!(
          "unbound symbol {name}"
        )));
      }
    }
    Expr::UnaryOp { operand, .. } => {
      Node::Neg(Box::new(lower(operand, signature)?))
    }
    Expr::BinaryOp { op, left, right } => Node::Binary(
      *op,
      Box::new(lower(left, signature)?),
      Box::new(lower(right, signature)?),
    ),
    Expr::Comparison { op, left, right } => Node::Compare(
      *op,
      Box::new(lower(left, signature)?),
      Box::new(lower(right, signature)?),
    ),
    Expr::FunctionCall { name, args } => {
      let func = Func::lookup(name).ok_or_else(|| {
        PlotError::EvaluationError(format!("unknown function {name}"))
      })?;
      if !func.accepts(args.len()) {
        return Err(PlotError::EvaluationError(format!(
          "{name} called with {} arguments",
          args.len()
        )));
      }
      let args = args
        .iter()
        .map(|a| lower(a, signature))
        .collect::<Result<Vec<_>, _>>()?;
      Node::Call(func, args)
    }
  };
  Ok(fold(node))
}

/// Replace subtrees without slots by their value.
fn fold(node: Node) -> Node {
  let constant = match &node {
    Node::Const(_) | Node::Slot(_) => return node,
    Node::Neg(a) => matches!(**a, Node::Const(_)),
    Node::Binary(_, a, b) | Node::Compare(_, a, b) => {
      matches!(**a, Node::Const(_)) && matches!(**b, Node::Const(_))
    }
    Node::Call(_, args) => args.iter().all(|a| matches!(a, Node::Const(_))),
  };
  if constant {
    Node::Const(eval(&node, &[]))
  } else {
    node
  }
}

fn is_real(z: Complex64) -> bool {
  z.im == 0.0
}

fn real(x: f64) -> Complex64 {
  Complex64::new(x, 0.0)
}

/// Real numbers carry a `+0.0` imaginary part so that branch cuts of
/// `sqrt` and `log` put the negative real axis on the upper side.
fn unsigned_zero(z: Complex64) -> Complex64 {
  if is_real(z) { real(z.re) } else { z }
}

fn pow(base: Complex64, exponent: Complex64) -> Complex64 {
  if is_real(base) && is_real(exponent) {
    let (b, e) = (base.re, exponent.re);
    if b >= 0.0 || e.fract() == 0.0 {
      return real(b.powf(e));
    }
  }
  if base == Complex64::new(0.0, 0.0) {
    return if exponent.re > 0.0 {
      base
    } else {
      Complex64::new(f64::INFINITY, 0.0)
    };
  }
  base.powc(exponent)
}

fn binary(op: BinaryOperator, a: Complex64, b: Complex64) -> Complex64 {
  if op == BinaryOperator::Power {
    return pow(a, b);
  }
  if is_real(a) && is_real(b) {
    let (x, y) = (a.re, b.re);
    return real(match op {
      BinaryOperator::Plus => x + y,
      BinaryOperator::Minus => x - y,
      BinaryOperator::Times => x * y,
      BinaryOperator::Divide => x / y,
      BinaryOperator::Power => unreachable!(),
    });
  }
  match op {
    BinaryOperator::Plus => a + b,
    BinaryOperator::Minus => a - b,
    BinaryOperator::Times => a * b,
    BinaryOperator::Divide => a / b,
    BinaryOperator::Power => unreachable!(),
  }
}

fn compare(op: ComparisonOp, a: Complex64, b: Complex64) -> Complex64 {
  if op == ComparisonOp::Equal {
    return a - b;
  }
  if a.re.is_nan() || b.re.is_nan() {
    return real(f64::NAN);
  }
  let holds = match op {
    ComparisonOp::Less => a.re < b.re,
    ComparisonOp::LessEqual => a.re <= b.re,
    ComparisonOp::Greater => a.re > b.re,
    ComparisonOp::GreaterEqual => a.re >= b.re,
    ComparisonOp::Equal => unreachable!(),
  };
  real(if holds { 1.0 } else { 0.0 })
}

fn apply(func: Func, args: &[Complex64]) -> Complex64 {
  let z = args[0];
  if func == Func::Log && args.len() == 2 {
    return apply(Func::Log, &[z]) / apply(Func::Log, &[args[1]]);
  }
  if is_real(z) {
    let x = z.re;
    let value = match func {
      Func::Sin => Some(x.sin()),
      Func::Cos => Some(x.cos()),
      Func::Tan => Some(x.tan()),
      Func::Sinh => Some(x.sinh()),
      Func::Cosh => Some(x.cosh()),
      Func::Tanh => Some(x.tanh()),
      Func::Asin if x.abs() <= 1.0 => Some(x.asin()),
      Func::Acos if x.abs() <= 1.0 => Some(x.acos()),
      Func::Atan => Some(x.atan()),
      Func::Exp => Some(x.exp()),
      Func::Log if x >= 0.0 => Some(x.ln()),
      Func::Sqrt if x >= 0.0 => Some(x.sqrt()),
      Func::Abs => Some(x.abs()),
      Func::Re | Func::Conj => Some(x),
      Func::Im => Some(0.0),
      Func::Floor => Some(x.floor()),
      Func::Ceiling => Some(x.ceil()),
      Func::Sign if x == 0.0 || x.is_nan() => Some(x),
      Func::Sign => Some(x.signum()),
      _ => None,
    };
    if let Some(v) = value {
      return real(v);
    }
  }
  match func {
    Func::Sin => z.sin(),
    Func::Cos => z.cos(),
    Func::Tan => z.tan(),
    Func::Sinh => z.sinh(),
    Func::Cosh => z.cosh(),
    Func::Tanh => z.tanh(),
    Func::Asin => z.asin(),
    Func::Acos => z.acos(),
    Func::Atan => z.atan(),
    Func::Exp => z.exp(),
    Func::Log => z.ln(),
    Func::Sqrt => z.sqrt(),
    Func::Abs => real(z.norm()),
    Func::Re => real(z.re),
    Func::Im => real(z.im),
    Func::Arg => real(z.arg()),
    Func::Conj => z.conj(),
    Func::Floor => Complex64::new(z.re.floor(), z.im.floor()),
    Func::Ceiling => Complex64::new(z.re.ceil(), z.im.ceil()),
    Func::Sign => {
      let r = z.norm();
      if r == 0.0 { z } else { z / r }
    }
  }
}

fn eval(node: &Node, values: &[Complex64]) -> Complex64 {
  match node {
    Node::Const(c) => *c,
    Node::Slot(i) => unsigned_zero(values[*i]),
    Node::Neg(a) => unsigned_zero(-eval(a, values)),
    Node::Binary(op, a, b) => binary(*op, eval(a, values), eval(b, values)),
    Node::Compare(op, a, b) => compare(*op, eval(a, values), eval(b, values)),
    Node::Call(func, args) => {
      let args: Vec<Complex64> = args.iter().map(|a| eval(a, values)).collect();
      apply(*func, &args)
    }
  }
}

/// Compile `expr` into a closure over the values of `signature`.
///
/// Identifiers are bound to the named (non-dummy) symbols of the signature
/// by name; `I`, `E` and `pi` are constants unless shadowed.
pub fn compile(
  expr: &Expr,
  signature: &[Symbol],
) -> Result<CompiledFn, PlotError> {
  let node = lower(expr, signature)?;
  Ok(Arc::new(move |values: &[Complex64]| eval(&node, values)))
}

/// Value of an expression without free symbols.
pub fn evaluate_constant(expr: &Expr) -> Option<Complex64> {
  match lower(expr, &[]).ok()? {
    Node::Const(c) => Some(c),
    _ => None,
  }
}

/// Real part of a value that is meant to be real; NaN when the imaginary
/// part is not negligible.
pub fn real_value(z: Complex64) -> f64 {
  if z.im.abs() > 1e-10 * z.re.abs().max(1.0) {
    f64::NAN
  } else {
    z.re
  }
}
