//! Spreadsheet-style column labels (`A`, `B`, ..., `Z`, `AA`, ...).

/// Converts a zero-based column number to its alphabetic label.
///
/// Bijective base-26 without a zero digit: 0 -> `A`, 25 -> `Z`, 26 -> `AA`.
pub fn column_label(index: usize) -> String {
    let mut letters = Vec::with_capacity(4);
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    // Only ASCII uppercase letters were pushed
    letters.into_iter().map(char::from).collect()
}

/// Converts a column label back to its zero-based number.
///
/// Returns `None` for empty input, non-letters or labels too large for `usize`.
pub fn column_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// Column part of a cell reference such as `AB12` (-> `AB`).
pub fn column_of_reference(reference: &str) -> &str {
    let end = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(reference.len());
    &reference[..end]
}

/// Per-reader memo of generated labels.
#[derive(Debug, Default)]
pub struct ColumnLabels {
    cache: Vec<String>,
}

impl ColumnLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&mut self, index: usize) -> &str {
        while self.cache.len() <= index {
            let next = column_label(self.cache.len());
            self.cache.push(next);
        }
        &self.cache[index]
    }
}
