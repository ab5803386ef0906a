//! Progressive point numbering.

use crate::dataset::Dataset;

/// Returns the next unused number for labeling newly inserted points,
/// continuing whatever numbering scheme the dataset already uses.
///
/// Identifiers composed entirely of digits are parsed whole; otherwise a
/// leading digit run counts ("12B" contributes 12, "B12" contributes
/// nothing).  Idempotent: the number is not reserved, the caller must write a
/// record carrying it before asking again.
pub fn next_identifier(dataset: &Dataset) -> u32 {
    let mut max = 0u32;
    for record in &dataset.records {
        let id = dataset.identifier_of(record).trim();
        let numeric = if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            id.parse::<u32>().ok()
        } else {
            let digits: String = id.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                None
            } else {
                digits.parse::<u32>().ok()
            }
        };
        if let Some(n) = numeric {
            max = max.max(n);
        }
    }
    max + 1
}
