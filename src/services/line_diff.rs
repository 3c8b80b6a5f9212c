//! Positional line diff used for staged-change review.
//!
//! Lines are compared index by index, not aligned. An inserted line therefore
//! shows up as a cascade of removed/added pairs for every line after it. Review
//! screens rely on exactly this output.

use crate::models::{DiffKind, DiffLine};

pub fn positional_diff(original: &str, proposed: &str) -> Vec<DiffLine> {
    let old: Vec<&str> = original.split('\n').collect();
    let new: Vec<&str> = proposed.split('\n').collect();
    let len = old.len().max(new.len());

    let mut diff = Vec::with_capacity(len);
    for i in 0..len {
        let line_number = i + 1;
        match (old.get(i), new.get(i)) {
            (Some(a), Some(b)) if a == b => diff.push(DiffLine::new(line_number, DiffKind::Unchanged, a)),
            (a, b) => {
                if let Some(a) = a {
                    diff.push(DiffLine::new(line_number, DiffKind::Removed, a));
                }
                if let Some(b) = b {
                    diff.push(DiffLine::new(line_number, DiffKind::Added, b));
                }
            }
        }
    }
    diff
}
