//! Structural units the rewriter must not fracture.

use crate::models::{StructuralUnit, TextRange};

/// One unit per line (newline excluded), ids `line-1`, `line-2`, ...
pub fn line_units(raw: &str) -> Vec<StructuralUnit> {
    let mut units = Vec::new();
    let mut start = 0;
    for (n, line) in raw.split('\n').enumerate() {
        units.push(StructuralUnit {
            unit_id: format!("line-{}", n + 1),
            range: TextRange::new(start, start + line.len()),
        });
        start += line.len() + 1;
    }
    units
}

/// Supplied units sorted by position. Units that do not fit the text or
/// overlap an earlier unit are dropped. Falls back to line units when none
/// are supplied.
pub fn resolve_units(raw: &str, supplied: &[StructuralUnit]) -> Vec<StructuralUnit> {
    if supplied.is_empty() {
        return line_units(raw);
    }

    let mut sorted: Vec<&StructuralUnit> = supplied.iter().collect();
    sorted.sort_by_key(|u| u.range);

    let mut units: Vec<StructuralUnit> = Vec::with_capacity(sorted.len());
    for unit in sorted {
        if !unit.range.is_valid_in(raw) {
            tracing::warn!(
                "Dropping structural unit '{}' with invalid range {}..{}",
                unit.unit_id,
                unit.range.start,
                unit.range.end
            );
            continue;
        }
        if units.last().is_some_and(|prev| prev.range.intersects(&unit.range)) {
            tracing::warn!(
                "Dropping structural unit '{}' overlapping an earlier unit",
                unit.unit_id
            );
            continue;
        }
        units.push(unit.clone());
    }
    units
}

/// The unit that fully contains `range`, if any.
pub fn containing_unit<'u>(
    units: &'u [StructuralUnit],
    range: &TextRange,
) -> Option<&'u StructuralUnit> {
    // Units are sorted and disjoint: only the last unit starting at or before
    // `range.start` can contain it.
    let idx = units.partition_point(|u| u.range.start <= range.start);
    idx.checked_sub(1)
        .map(|i| &units[i])
        .filter(|u| u.range.contains(range))
}
