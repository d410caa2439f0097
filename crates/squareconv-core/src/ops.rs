//! Element-wise arithmetic on square matrices.
//!
//! `dot` is the filter-application primitive (multiply cell by cell, then
//! sum), not a matrix product.

use crate::dtype::Element;
use crate::error::{ConvError, ConvResult};
use crate::matrix::SquareMatrix;

use std::ops;

impl<T: Element> SquareMatrix<T> {
    fn check_same_size(&self, other: &SquareMatrix<T>, op: &'static str) -> ConvResult<()> {
        if self.size() != other.size() {
            return Err(ConvError::ShapeMismatch {
                op,
                expected: self.size(),
                got: other.size(),
            });
        }
        Ok(())
    }

    /// Cell-wise sum of two matrices of equal size.
    pub fn add(&self, other: &SquareMatrix<T>) -> ConvResult<SquareMatrix<T>> {
        self.check_same_size(other, "add")?;
        let data = self
            .data()
            .iter()
            .zip(other.data())
            .map(|(&a, &b)| a + b)
            .collect();
        Ok(SquareMatrix::from_parts(data, self.size()))
    }

    /// `Σ a[i][j] * b[i][j]` over all cells.
    pub fn dot(&self, other: &SquareMatrix<T>) -> ConvResult<T> {
        self.check_same_size(other, "dot")?;
        Ok(self
            .data()
            .iter()
            .zip(other.data())
            .map(|(&a, &b)| a * b)
            .sum())
    }

    /// Fold `add` left to right over `matrices`, starting from a zero matrix.
    ///
    /// Fails on an empty sequence, since there is no size to build the
    /// starting matrix from.
    pub fn sum_all<'a, I>(matrices: I) -> ConvResult<SquareMatrix<T>>
    where
        I: IntoIterator<Item = &'a SquareMatrix<T>>,
    {
        let mut iter = matrices.into_iter().peekable();
        let size = match iter.peek() {
            Some(first) => first.size(),
            None => return Err(ConvError::EmptySequence { op: "sum_all" }),
        };
        let mut acc = SquareMatrix::zeros(size);
        for m in iter {
            if m.size() != size {
                return Err(ConvError::ShapeMismatch {
                    op: "sum_all",
                    expected: size,
                    got: m.size(),
                });
            }
            acc = acc.add(m)?;
        }
        Ok(acc)
    }
}

// ─── Operator Overloads ─────────────────────────────────────────────────────

impl<T: Element> ops::Add for &SquareMatrix<T> {
    type Output = ConvResult<SquareMatrix<T>>;
    fn add(self, rhs: Self) -> ConvResult<SquareMatrix<T>> {
        SquareMatrix::add(self, rhs)
    }
}
