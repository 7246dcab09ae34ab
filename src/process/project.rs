use crate::a1;
use anyhow::{anyhow, Result};

/// Picks a fixed list of source columns, in order, out of wide rows.
#[derive(Debug, Clone)]
pub struct ColumnProjector {
    letters: Vec<String>,
    indices: Vec<usize>,
}

impl ColumnProjector {
    pub fn new<S: AsRef<str>>(letters: &[S]) -> Result<Self> {
        let mut out_letters = Vec::with_capacity(letters.len());
        let mut indices = Vec::with_capacity(letters.len());
        for l in letters {
            let l = l.as_ref();
            let idx = a1::column_index(l).ok_or_else(|| anyhow!("invalid column letter {:?}", l))?;
            out_letters.push(l.trim().to_ascii_uppercase());
            indices.push(idx);
        }
        Ok(Self {
            letters: out_letters,
            indices,
        })
    }

    pub fn width(&self) -> usize {
        self.indices.len()
    }

    /// Highest source index read; rows shorter than this get padded.
    pub fn max_index(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }

    /// Output position of a source column letter, if selected.
    pub fn position_of(&self, letter: &str) -> Option<usize> {
        let letter = letter.trim().to_ascii_uppercase();
        self.letters.iter().position(|l| *l == letter)
    }

    /// Projected header row.
    pub fn headers<S: AsRef<str>>(&self, header_row: &[S]) -> Vec<String> {
        self.project(header_row)
    }

    /// Values at the selected positions; missing cells become `""`.
    pub fn project<S: AsRef<str>>(&self, row: &[S]) -> Vec<String> {
        self.indices
            .iter()
            .map(|&i| row.get(i).map(|c| c.as_ref().to_string()).unwrap_or_default())
            .collect()
    }
}
