//! List-level deduplication of cleaned company labels.

use std::collections::HashSet;

use tracing::trace;

use crate::normalise::clean_company_entry;

/// Clean every raw entry and keep the first occurrence of each label,
/// comparing labels case-insensitively. Entries that clean to nothing are
/// dropped. The input slice is never modified.
pub fn clean_companies<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    let (_seen, cleaned) = entries
        .iter()
        .filter_map(|raw| {
            let label = clean_company_entry(raw.as_ref());
            if label.is_none() {
                trace!(raw = raw.as_ref(), "Entry discarded by normaliser");
            }
            label
        })
        .fold(
            (HashSet::new(), Vec::new()),
            |(mut seen, mut cleaned): (HashSet<String>, Vec<String>), label| {
                if seen.insert(label.to_lowercase()) {
                    cleaned.push(label);
                } else {
                    trace!(label = %label, "Duplicate label dropped");
                }
                (seen, cleaned)
            },
        );
    cleaned
}
