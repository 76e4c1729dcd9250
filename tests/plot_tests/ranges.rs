use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use symplot::functions::create_ranges;
use symplot::{Range, Symbol};

fn symbols(names: &[&str]) -> BTreeSet<Symbol> {
  names.iter().map(|n| Symbol::new(n)).collect()
}

fn resolve(
  free: &[&str],
  supplied: Vec<Range>,
  arity: usize,
) -> Result<Vec<Range>, PlotError> {
  create_ranges(&symbols(free), supplied, arity, &PlotConfig::default())
}

mod create_ranges_tests {
  use super::*;

  #[test]
  fn free_symbol_gets_default_range() {
    let ranges = resolve(&["x"], vec![], 1).unwrap();
    assert_eq!(ranges, vec![Range::new("x", -10.0, 10.0)]);
  }

  #[test]
  fn supplied_ranges_come_first() {
    let ranges =
      resolve(&["x", "y"], vec![Range::new("y", 0.0, 1.0)], 2).unwrap();
    assert_eq!(ranges[0].symbol.name(), "y");
    assert_eq!(ranges[1], Range::new("x", -10.0, 10.0));
  }

  #[test]
  fn missing_symbols_are_added_in_sorted_order() {
    let ranges = resolve(&["y", "x"], vec![], 2).unwrap();
    assert_eq!(ranges[0].symbol.name(), "x");
    assert_eq!(ranges[1].symbol.name(), "y");
  }

  #[test]
  fn unused_axes_get_distinct_dummies() {
    let ranges = resolve(&[], vec![], 2).unwrap();
    assert!(ranges.iter().all(|r| r.symbol.is_dummy()));
    assert_ne!(ranges[0].symbol, ranges[1].symbol);
  }

  #[test]
  fn partial_ranges_are_padded() {
    let ranges = resolve(&["x"], vec![Range::new("x", 0.0, 2.0)], 2).unwrap();
    assert_eq!(ranges[0], Range::new("x", 0.0, 2.0));
    assert!(ranges[1].symbol.is_dummy());
    assert_eq!(ranges[1].start.re, -10.0);
  }

  #[test]
  fn custom_default_range() {
    let cfg = PlotConfig {
      default_range: (-1.0, 3.0),
      ..Default::default()
    };
    let ranges = create_ranges(&symbols(&["t"]), vec![], 1, &cfg).unwrap();
    assert_eq!(ranges, vec![Range::new("t", -1.0, 3.0)]);
  }
}

mod errors {
  use super::*;

  #[test]
  fn too_many_free_symbols() {
    match resolve(&["x", "y"], vec![], 1) {
      Err(PlotError::TooManyFreeSymbols {
        expected,
        received,
        symbols,
      }) => {
        assert_eq!((expected, received), (1, 2));
        assert_eq!(symbols, "{x, y}");
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn too_many_ranges() {
    let supplied = vec![Range::new("x", 0.0, 1.0), Range::new("y", 0.0, 1.0)];
    assert!(matches!(
      resolve(&["x"], supplied, 1),
      Err(PlotError::TooManyRanges {
        expected: 1,
        received: 2
      })
    ));
  }

  #[test]
  fn duplicate_range_symbols() {
    let supplied = vec![Range::new("x", 0.0, 1.0), Range::new("x", 2.0, 3.0)];
    assert!(matches!(
      resolve(&["x"], supplied, 2),
      Err(PlotError::DuplicateRangeSymbol(s)) if s == "x"
    ));
  }

  #[test]
  fn foreign_ranges_cannot_crowd_out_a_free_symbol() {
    let supplied = vec![Range::new("a", 0.0, 1.0), Range::new("b", 0.0, 1.0)];
    match resolve(&["x", "y"], supplied, 3) {
      Err(PlotError::IncompatibleRanges {
        expressions,
        ranges,
      }) => {
        assert_eq!(expressions, "{x, y}");
        assert_eq!(ranges, "{a, b, x}");
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn range_over_a_foreign_symbol() {
    let err = resolve(&["x"], vec![Range::new("y", 0.0, 1.0)], 1).unwrap_err();
    match err {
      PlotError::IncompatibleRanges {
        expressions,
        ranges,
      } => {
        assert_eq!(expressions, "{x}");
        assert_eq!(ranges, "{y}");
      }
      other => panic!("unexpected {other:?}"),
    }
  }
}

mod randomized {
  use super::*;

  const NAMES: [&str; 4] = ["a", "b", "c", "d"];

  #[test]
  fn result_always_has_arity_ranges_covering_free_symbols() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
      let arity = rng.gen_range(1..=4);
      let nfree = rng.gen_range(0..=arity);
      let free: Vec<&str> = NAMES[..nfree].to_vec();
      let nsupplied = rng.gen_range(0..=nfree);
      let supplied: Vec<Range> = free[..nsupplied]
        .iter()
        .map(|n| Range::new(*n, 0.0, 1.0))
        .collect();

      let ranges = resolve(&free, supplied, arity).unwrap();
      assert_eq!(ranges.len(), arity);
      let resolved: BTreeSet<&Symbol> =
        ranges.iter().map(|r| &r.symbol).collect();
      assert_eq!(resolved.len(), arity);
      for n in &free {
        assert!(resolved.contains(&Symbol::new(n)));
      }
      for r in &ranges[..nsupplied] {
        assert_eq!(r.end.re, 1.0);
      }
    }
  }
}
