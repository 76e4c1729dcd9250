use pest::iterators::Pair;
use std::collections::BTreeSet;
use std::fmt;

use crate::Rule;
use crate::expression::Symbol;

/// Identifiers that name numeric constants rather than free symbols.
pub const CONSTANTS: [&str; 4] = ["I", "E", "pi", "Pi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
  Plus,
  Minus,
  Times,
  Divide,
  Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
  Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
  Equal,
  Less,
  LessEqual,
  Greater,
  GreaterEqual,
}

impl ComparisonOp {
  fn as_str(&self) -> &'static str {
    match self {
      ComparisonOp::Equal => "==",
      ComparisonOp::Less => "<",
      ComparisonOp::LessEqual => "<=",
      ComparisonOp::Greater => ">",
      ComparisonOp::GreaterEqual => ">=",
    }
  }
}

/// Symbolic expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Integer(i64),
  Real(f64),
  Identifier(String),
  UnaryOp {
    op: UnaryOperator,
    operand: Box<Expr>,
  },
  BinaryOp {
    op: BinaryOperator,
    left: Box<Expr>,
    right: Box<Expr>,
  },
  Comparison {
    op: ComparisonOp,
    left: Box<Expr>,
    right: Box<Expr>,
  },
  FunctionCall {
    name: String,
    args: Vec<Expr>,
  },
}

impl Expr {
  pub fn symbol(name: &str) -> Expr {
    Expr::Identifier(name.to_string())
  }

  pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::FunctionCall {
      name: name.to_string(),
      args,
    }
  }

  pub fn pow(self, exponent: Expr) -> Expr {
    binary(BinaryOperator::Power, self, exponent)
  }

  pub fn equals(self, rhs: Expr) -> Expr {
    Expr::Comparison {
      op: ComparisonOp::Equal,
      left: Box::new(self),
      right: Box::new(rhs),
    }
  }

  /// Identifiers appearing in the tree, constants and function heads excluded.
  pub fn free_symbols(&self) -> BTreeSet<Symbol> {
    let mut out = BTreeSet::new();
    collect_symbols(self, &mut out);
    out
  }

  fn precedence(&self) -> u8 {
    match self {
      Expr::Comparison { .. } => 0,
      Expr::BinaryOp { op, .. } => match op {
        BinaryOperator::Plus | BinaryOperator::Minus => 1,
        BinaryOperator::Times | BinaryOperator::Divide => 2,
        BinaryOperator::Power => 4,
      },
      Expr::UnaryOp { .. } => 3,
      Expr::Integer(n) if *n < 0 => 3,
      Expr::Real(r) if *r < 0.0 => 3,
      _ => 5,
    }
  }
}

fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
  Expr::BinaryOp {
    op,
    left: Box::new(left),
    right: Box::new(right),
  }
}

fn collect_symbols(expr: &Expr, out: &mut BTreeSet<Symbol>) {
  match expr {
    Expr::Identifier(name) if !CONSTANTS.contains(&name.as_str()) => {
      out.insert(Symbol::new(name));
    }
    Expr::UnaryOp { operand, .. } => collect_symbols(operand, out),
    Expr::BinaryOp { left, right, .. } | Expr::Comparison { left, right, .. } => {
      collect_symbols(left, out);
      collect_symbols(right, out);
    }
    Expr::FunctionCall { args, .. } => {
      for a in args {
        collect_symbols(a, out);
      }
    }
    _ => {}
  }
}

impl std::ops::Add for Expr {
  type Output = Expr;
  fn add(self, rhs: Expr) -> Expr {
    binary(BinaryOperator::Plus, self, rhs)
  }
}

impl std::ops::Sub for Expr {
  type Output = Expr;
  fn sub(self, rhs: Expr) -> Expr {
    binary(BinaryOperator::Minus, self, rhs)
  }
}

impl std::ops::Mul for Expr {
  type Output = Expr;
  fn mul(self, rhs: Expr) -> Expr {
    binary(BinaryOperator::Times, self, rhs)
  }
}

impl std::ops::Div for Expr {
  type Output = Expr;
  fn div(self, rhs: Expr) -> Expr {
    binary(BinaryOperator::Divide, self, rhs)
  }
}

impl std::ops::Neg for Expr {
  type Output = Expr;
  fn neg(self) -> Expr {
    Expr::UnaryOp {
      op: UnaryOperator::Minus,
      operand: Box::new(self),
    }
  }
}

impl From<i64> for Expr {
  fn from(n: i64) -> Self {
    Expr::Integer(n)
  }
}

impl From<f64> for Expr {
  fn from(r: f64) -> Self {
    Expr::Real(r)
  }
}

/// Write `expr`, parenthesized when it binds looser than `min_prec`.
fn write_operand(
  f: &mut fmt::Formatter<'_>,
  expr: &Expr,
  min_prec: u8,
) -> fmt::Result {
  if expr.precedence() < min_prec {
    write!(f, "({expr})")
  } else {
    write!(f, "{expr}")
  }
}

impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expr::Integer(n) => write!(f, "{n}"),
      Expr::Real(r) => {
        if r.fract() == 0.0 && r.is_finite() {
          write!(f, "{r:.1}")
        } else {
          write!(f, "{r}")
        }
      }
      Expr::Identifier(name) => write!(f, "{name}"),
      Expr::UnaryOp { operand, .. } => {
        write!(f, "-")?;
        write_operand(f, operand, 4)
      }
      Expr::BinaryOp { op, left, right } => match op {
        BinaryOperator::Plus => {
          write_operand(f, left, 1)?;
          write!(f, " + ")?;
          write_operand(f, right, 2)
        }
        BinaryOperator::Minus => {
          write_operand(f, left, 1)?;
          write!(f, " - ")?;
          write_operand(f, right, 2)
        }
        BinaryOperator::Times => {
          write_operand(f, left, 2)?;
          write!(f, "*")?;
          write_operand(f, right, 3)
        }
        BinaryOperator::Divide => {
          write_operand(f, left, 2)?;
          write!(f, "/")?;
          write_operand(f, right, 5)
        }
        BinaryOperator::Power => {
          write_operand(f, left, 5)?;
          write!(f, "^")?;
          write_operand(f, right, 3)
        }
      },
      Expr::Comparison { op, left, right } => {
        write_operand(f, left, 1)?;
        write!(f, " {} ", op.as_str())?;
        write_operand(f, right, 1)
      }
      Expr::FunctionCall { name, args } => {
        write!(f, "{name}(")?;
        for (i, a) in args.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{a}")?;
        }
        write!(f, ")")
      }
    }
  }
}

/// Convert a parsed `Expression` (or any of its sub-rules) into an [`Expr`].
pub fn pair_to_expr(pair: Pair<Rule>) -> Expr {
  match pair.as_rule() {
    Rule::Expression => {
      let mut inner = pair.into_inner();
      let left = pair_to_expr(inner.next().unwrap());
      match (inner.next(), inner.next()) {
        (Some(op), Some(right)) => {
          let op = match op.as_str() {
            "==" => ComparisonOp::Equal,
            "<" => ComparisonOp::Less,
            "<=" => ComparisonOp::LessEqual,
            ">" => ComparisonOp::Greater,
            _ => ComparisonOp::GreaterEqual,
          };
          Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(pair_to_expr(right)),
          }
        }
        _ => left,
      }
    }
    Rule::Sum | Rule::Product => {
      let mut inner = pair.into_inner();
      let mut acc = pair_to_expr(inner.next().unwrap());
      while let (Some(op), Some(rhs)) = (inner.next(), inner.next()) {
        let op = match op.as_str() {
          "+" => BinaryOperator::Plus,
          "-" => BinaryOperator::Minus,
          "*" => BinaryOperator::Times,
          _ => BinaryOperator::Divide,
        };
        acc = binary(op, acc, pair_to_expr(rhs));
      }
      acc
    }
    Rule::Unary => {
      let mut negations = 0;
      let mut operand = None;
      for p in pair.into_inner() {
        if p.as_rule() == Rule::Negate {
          negations += 1;
        } else {
          operand = Some(pair_to_expr(p));
        }
      }
      let mut expr = operand.unwrap();
      for _ in 0..negations {
        expr = -expr;
      }
      expr
    }
    Rule::Power => {
      let mut inner = pair.into_inner();
      let base = pair_to_expr(inner.next().unwrap());
      match inner.next() {
        Some(exponent) => base.pow(pair_to_expr(exponent)),
        None => base,
      }
    }
    Rule::Call => {
      let mut inner = pair.into_inner();
      let name = inner.next().unwrap().as_str().to_string();
      Expr::FunctionCall {
        name,
        args: inner.map(pair_to_expr).collect(),
      }
    }
    Rule::Number => {
      let s = pair.as_str();
      if s.contains(['.', 'e', 'E']) {
        Expr::Real(s.parse().unwrap_or(f64::NAN))
      } else {
        s.parse()
          .map(Expr::Integer)
          .unwrap_or_else(|_| Expr::Real(s.parse().unwrap_or(f64::NAN)))
      }
    }
    Rule::Identifier => Expr::Identifier(pair.as_str().to_string()),
    rule => unreachable!("unexpected rule in expression: {rule:?}"),
  }
}
