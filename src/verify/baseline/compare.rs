//! Comparison of a fresh procedure result against its baseline.
//!
//! Equality is strict and positional: the same columns in the same order and
//! the same rows in the same order. A result whose rows were merely reordered
//! is reported as a mismatch with an empty difference set.

use std::collections::HashMap;

use super::types::{ColumnChange, DiffRow, DifferenceReport, Side};
use crate::models::{Row, TabularResult};

/// Compare `current` against `baseline`.
///
/// When the two differ, the report lists the multiset symmetric difference of
/// their rows: a row occurring `n` times on one side and `m` times on the
/// other contributes `|n - m|` copies to the side holding more of them.
pub fn compare(current: &TabularResult, baseline: &TabularResult) -> DifferenceReport {
    if current == baseline {
        return DifferenceReport::matched(current.columns().to_vec());
    }

    if current.columns() != baseline.columns() {
        // Rows of differently shaped tables never match each other
        let rows = tag(current.rows().iter(), Side::Current)
            .chain(tag(baseline.rows().iter(), Side::Baseline))
            .collect();
        return DifferenceReport {
            exact_match: false,
            columns: current.columns().to_vec(),
            column_change: Some(ColumnChange {
                current: current.columns().to_vec(),
                baseline: baseline.columns().to_vec(),
            }),
            rows,
        };
    }

    let only_current = unmatched(current.rows(), baseline.rows());
    let only_baseline = unmatched(baseline.rows(), current.rows());

    DifferenceReport {
        exact_match: false,
        columns: current.columns().to_vec(),
        column_change: None,
        rows: tag(only_current.into_iter(), Side::Current)
            .chain(tag(only_baseline.into_iter(), Side::Baseline))
            .collect(),
    }
}

/// Rows of `side` left over once each row of `other` has cancelled one equal copy.
///
/// The earliest copies cancel first, so any surplus is made of the later copies.
fn unmatched<'a>(side: &'a [Row], other: &[Row]) -> Vec<&'a Row> {
    let mut available: HashMap<&Row, usize> = HashMap::new();
    for row in other {
        *available.entry(row).or_insert(0) += 1;
    }

    side.iter()
        .filter(|row| match available.get_mut(*row) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .collect()
}

fn tag<'a>(
    rows: impl Iterator<Item = &'a Row> + 'a,
    side: Side,
) -> impl Iterator<Item = DiffRow> + 'a {
    rows.map(move |row| DiffRow {
        side,
        row: row.clone(),
    })
}
