use super::CellValue;

/// Error literals a spreadsheet renders in place of a failed formula.
pub const ERROR_LITERALS: &[&str] = &[
    "#N/A", "#DIV/0!", "#REF!", "#VALUE!", "#NAME?", "#NUM!", "#NULL!",
];

pub fn is_error_literal(s: &str) -> bool {
    ERROR_LITERALS.contains(&s.trim())
}

/// Blank every error literal in place; returns how many cells were blanked.
pub fn scrub_error_literals(rows: &mut [Vec<CellValue>]) -> usize {
    let mut blanked = 0;
    for cell in rows.iter_mut().flat_map(|r| r.iter_mut()) {
        if let CellValue::Text(s) = cell {
            if is_error_literal(s) {
                s.clear();
                blanked += 1;
            }
        }
    }
    blanked
}
