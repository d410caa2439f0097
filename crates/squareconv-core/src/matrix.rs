use crate::dtype::Element;
use crate::error::{ConvError, ConvResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Square 2-D grid of integers, the only shape squareconv works with.
///
/// Stores data in a flat contiguous `Vec<T>` with row-major layout and
/// `size == rows == columns`. A matrix is never mutated after it has been
/// handed out; every operation returns a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Vec<T>>",
    into = "Vec<Vec<T>>",
    bound = "T: Element"
)]
pub struct SquareMatrix<T: Element> {
    data: Vec<T>,
    size: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Element> SquareMatrix<T> {
    /// Create a matrix from row-major data.
    pub fn new(data: Vec<T>, size: usize) -> ConvResult<Self> {
        if data.len() != size * size {
            return Err(ConvError::ShapeMismatch {
                op: "new",
                expected: size * size,
                got: data.len(),
            });
        }
        Ok(SquareMatrix { data, size })
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(size: usize) -> Self {
        Self::full(size, T::ZERO)
    }

    /// Create a matrix filled with a constant value.
    pub fn full(size: usize, value: T) -> Self {
        SquareMatrix {
            data: vec![value; size * size],
            size,
        }
    }

    /// Identity matrix of size n×n.
    pub fn eye(n: usize) -> Self {
        let mut data = vec![T::ZERO; n * n];
        for i in 0..n {
            data[i * n + i] = T::ONE;
        }
        SquareMatrix { data, size: n }
    }

    /// Create a matrix from nested rows. Every row must be as long as there
    /// are rows.
    pub fn from_rows(rows: &[Vec<T>]) -> ConvResult<Self> {
        let size = rows.len();
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != size {
                return Err(ConvError::NotSquare {
                    rows: size,
                    row,
                    cols: cells.len(),
                });
            }
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Ok(SquareMatrix { data, size })
    }

    pub(crate) fn from_parts(data: Vec<T>, size: usize) -> Self {
        debug_assert_eq!(data.len(), size * size);
        SquareMatrix { data, size }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    /// Number of rows, which is also the number of columns.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> ConvResult<T> {
        if row >= self.size || col >= self.size {
            return Err(ConvError::IndexOutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        Ok(self.data[row * self.size + col])
    }

    /// Iterate over the rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        // chunks(0) panics, and an empty matrix has no rows anyway
        self.data.chunks(self.size.max(1)).take(self.size)
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    // ─── Slicing ────────────────────────────────────────────────────────────

    /// Copy out the `size × size` block whose top-left corner is `(top, left)`.
    pub fn window(&self, top: usize, left: usize, size: usize) -> ConvResult<SquareMatrix<T>> {
        if top + size > self.size || left + size > self.size {
            return Err(ConvError::WindowOutOfBounds {
                row: top,
                col: left,
                window: size,
                size: self.size,
            });
        }
        let mut data = Vec::with_capacity(size * size);
        for r in top..top + size {
            let start = r * self.size + left;
            data.extend_from_slice(&self.data[start..start + size]);
        }
        Ok(SquareMatrix { data, size })
    }
}

// ─── Conversions ────────────────────────────────────────────────────────────

impl<T: Element> TryFrom<Vec<Vec<T>>> for SquareMatrix<T> {
    type Error = ConvError;

    fn try_from(rows: Vec<Vec<T>>) -> ConvResult<Self> {
        SquareMatrix::from_rows(&rows)
    }
}

impl<T: Element> From<SquareMatrix<T>> for Vec<Vec<T>> {
    fn from(m: SquareMatrix<T>) -> Self {
        m.to_rows()
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

/// One line per row, cells separated by a single space.
impl<T: Element> fmt::Display for SquareMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", v)?;
            }
        }
        Ok(())
    }
}
