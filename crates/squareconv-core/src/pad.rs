use crate::dtype::Element;
use crate::matrix::SquareMatrix;

use std::borrow::Cow;

impl<T: Element> SquareMatrix<T> {
    /// Surround the matrix with `amount` rows and columns of zeros on every
    /// side.
    ///
    /// The result has size `self.size() + 2 * amount` and holds this matrix's
    /// cells at offset `(amount, amount)`. A zero amount borrows `self`
    /// unchanged.
    pub fn padded(&self, amount: usize) -> Cow<'_, SquareMatrix<T>> {
        if amount == 0 {
            return Cow::Borrowed(self);
        }
        let n = self.size();
        let dim = n + 2 * amount;
        let mut data = vec![T::ZERO; dim * dim];
        for (i, row) in self.rows().enumerate() {
            let start = (amount + i) * dim + amount;
            data[start..start + n].copy_from_slice(row);
        }
        Cow::Owned(SquareMatrix::from_parts(data, dim))
    }
}
