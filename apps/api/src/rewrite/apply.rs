//! Applies a `RewritePlan` to the original text and carries the structural
//! units over to the edited text.

use serde::{Deserialize, Serialize};

use crate::models::{StructuralUnit, TextRange};
use crate::rewrite::plan::RewritePlan;

/// A structural unit of the rewritten document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputUnit {
    pub unit_id: String,
    /// Byte range into the rewritten text.
    pub range: TextRange,
    pub text: String,
}

/// Walks the edits left to right, copying the untouched text between them.
///
/// `plan` must come from `build_plan` over the same `raw` and `units`: edits
/// are sorted, disjoint, on char boundaries and each sits inside one unit.
pub fn apply_plan(
    raw: &str,
    plan: &RewritePlan,
    units: &[StructuralUnit],
) -> (String, Vec<OutputUnit>) {
    let added: usize = plan.edits.iter().map(|e| e.replacement.len()).sum();
    let mut output = String::with_capacity(raw.len() + added);
    let mut cursor = 0;
    for edit in &plan.edits {
        output.push_str(&raw[cursor..edit.range.start]);
        output.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    output.push_str(&raw[cursor..]);

    let units = remap_units(&output, plan, units);
    (output, units)
}

/// Shifts every unit by the length change of the edits before it and
/// stretches it by the change of the edits inside it.
fn remap_units(output: &str, plan: &RewritePlan, units: &[StructuralUnit]) -> Vec<OutputUnit> {
    let edits = &plan.edits;
    let mut next = 0;
    let (mut added, mut removed) = (0usize, 0usize);

    units
        .iter()
        .map(|unit| {
            while next < edits.len() && edits[next].range.start < unit.range.start {
                added += edits[next].replacement.len();
                removed += edits[next].range.len();
                next += 1;
            }
            let start = unit.range.start + added - removed;

            let (mut inner_added, mut inner_removed) = (0usize, 0usize);
            let mut j = next;
            while j < edits.len() && unit.range.contains(&edits[j].range) {
                inner_added += edits[j].replacement.len();
                inner_removed += edits[j].range.len();
                j += 1;
            }
            let end = start + unit.range.len() + inner_added - inner_removed;

            let range = TextRange::new(start, end);
            OutputUnit {
                unit_id: unit.unit_id.clone(),
                range,
                text: output.get(start..end).unwrap_or_default().to_string(),
            }
        })
        .collect()
}
