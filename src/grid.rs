use std::fmt;

use crate::error::{Error, Result};

/// Fixed-size rectangle of cells, `true` meaning alive.
///
/// The dimensions are chosen at construction and never change. Accessors
/// take signed coordinates and reject anything outside `[0, rows) x [0, cols)`;
/// wrapping is left to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<bool>>,
}

impl Grid {
    /// All-dead grid of the given size.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimension { rows, cols });
        }

        Ok(Grid {
            rows,
            cols,
            cells: vec![vec![false; cols]; rows],
        })
    }

    /// Takes ownership of already-built rows. Every row must have the same
    /// non-zero length.
    pub fn from_rows(cells: Vec<Vec<bool>>) -> Result<Self> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimension { rows, cols });
        }
        if let Some(i) = cells.iter().position(|r| r.len() != cols) {
            return Err(Error::MalformedPattern(format!(
                "row {} has {} cells, expected {}",
                i,
                cells[i].len(),
                cols
            )));
        }

        Ok(Grid { rows, cols, cells })
    }

    /// Grid read from text, one line per row. `' '`, `'0'` and `'.'` are dead
    /// cells, anything else is alive. Only empty lines are skipped; a line of
    /// spaces is a row of dead cells.
    pub fn from_pattern(s: &str) -> Result<Self> {
        let data: Vec<Vec<bool>> = s
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| l.chars().map(|c| !matches!(c, ' ' | '0' | '.')).collect())
            .collect();

        if data.is_empty() {
            return Err(Error::MalformedPattern("no rows".into()));
        }
        Grid::from_rows(data)
    }

    /// Same-sized grid whose cells are `f(row, col, current)`.
    pub(crate) fn map<F>(&self, mut f: F) -> Grid
    where
        F: FnMut(isize, isize, bool) -> bool,
    {
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, &c)| f(i as isize, j as isize, c))
                    .collect()
            })
            .collect();

        Grid {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    fn index(&self, row: isize, col: isize) -> Result<(usize, usize)> {
        if self.contains(row, col) {
            Ok((row as usize, col as usize))
        } else {
            Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn get(&self, row: isize, col: isize) -> Result<bool> {
        let (r, c) = self.index(row, col)?;
        Ok(self.cells[r][c])
    }

    pub fn set(&mut self, row: isize, col: isize, value: bool) -> Result<()> {
        let (r, c) = self.index(row, col)?;
        self.cells[r][c] = value;
        Ok(())
    }

    /// Number of live cells on the whole grid.
    pub fn count_alive(&self) -> usize {
        self.cells
            .iter()
            .map(|r| r.iter().filter(|&&c| c).count())
            .sum()
    }

    /// Rows top to bottom, for renderers.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.iter().map(Vec::as_slice)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for &c in row {
                f.write_str(if c { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
