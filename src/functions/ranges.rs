use std::collections::BTreeSet;

use crate::PlotError;
use crate::config::PlotConfig;
use crate::expression::Symbol;
use crate::series::Range;

pub(crate) fn fmt_symbols<'a>(
  symbols: impl IntoIterator<Item = &'a Symbol>,
) -> String {
  let names: Vec<String> = symbols.into_iter().map(|s| s.to_string()).collect();
  format!("{{{}}}", names.join(", "))
}

/// Complete `supplied` to exactly `arity` ranges.
///
/// Free symbols without a range get `cfg.default_range`, in sorted order;
/// remaining slots are filled with ranges over fresh dummy symbols. Every
/// free symbol must end up with a range, so supplied ranges over foreign
/// symbols may not crowd one out.
pub fn create_ranges(
  free_symbols: &BTreeSet<Symbol>,
  supplied: Vec<Range>,
  arity: usize,
  cfg: &PlotConfig,
) -> Result<Vec<Range>, PlotError> {
  if free_symbols.len() > arity {
    return Err(PlotError::TooManyFreeSymbols {
      expected: arity,
      received: free_symbols.len(),
      symbols: fmt_symbols(free_symbols),
    });
  }
  if supplied.len() > arity {
    return Err(PlotError::TooManyRanges {
      expected: arity,
      received: supplied.len(),
    });
  }

  let mut range_symbols = BTreeSet::new();
  for r in &supplied {
    if !range_symbols.insert(r.symbol.clone()) {
      return Err(PlotError::DuplicateRangeSymbol(r.symbol.to_string()));
    }
  }

  let (start, end) = cfg.default_range;
  let mut ranges = supplied;
  for s in free_symbols.difference(&range_symbols) {
    if ranges.len() == arity {
      break;
    }
    log::debug!("no range given for {s}, using ({start}, {end})");
    ranges.push(Range::new(s.clone(), start, end));
  }
  while ranges.len() < arity {
    ranges.push(Range::new(Symbol::dummy(), start, end));
  }

  let resolved: BTreeSet<&Symbol> = ranges.iter().map(|r| &r.symbol).collect();
  if free_symbols.iter().any(|s| !resolved.contains(s)) {
    return Err(PlotError::IncompatibleRanges {
      expressions: fmt_symbols(free_symbols),
      ranges: fmt_symbols(resolved),
    });
  }
  Ok(ranges)
}
