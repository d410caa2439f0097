use serde::{Deserialize, Serialize};

/// Geometry of one convolution: sizes plus the solved stride and padding.
///
/// Produced once per run by the solver and threaded unchanged through
/// padding, sliding and accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConvolutionParameters {
    pub input_size: usize,
    pub filter_size: usize,
    pub output_size: usize,
    pub stride: usize,
    pub zero_padding: usize,
}

impl ConvolutionParameters {
    /// `input_size - filter_size + 2 * padding`, which may be negative.
    /// `None` when the sizes do not fit in an `i64`.
    pub fn stride_spots(input_size: usize, filter_size: usize, zero_padding: usize) -> Option<i64> {
        let input = i64::try_from(input_size).ok()?;
        let filter = i64::try_from(filter_size).ok()?;
        let padding = i64::try_from(zero_padding).ok()?;
        input.checked_sub(filter)?.checked_add(padding.checked_mul(2)?)
    }

    /// Whether `(stride, zero_padding)` yields exactly `output_size` windows.
    pub fn fits(
        input_size: usize,
        filter_size: usize,
        output_size: usize,
        stride: usize,
        zero_padding: usize,
    ) -> bool {
        let (Some(spots), Ok(stride), Ok(output)) = (
            Self::stride_spots(input_size, filter_size, zero_padding),
            i64::try_from(stride),
            i64::try_from(output_size),
        ) else {
            return false;
        };
        // a zero stride never divides anything
        spots >= 0
            && spots.checked_rem(stride) == Some(0)
            && spots / stride + 1 == output
    }

    /// Check the output-size formula holds for these parameters.
    pub fn is_consistent(&self) -> bool {
        self.stride >= 1
            && Self::fits(
                self.input_size,
                self.filter_size,
                self.output_size,
                self.stride,
                self.zero_padding,
            )
    }

    /// Size of the input after zero padding, `None` on overflow.
    pub fn padded_size(&self) -> Option<usize> {
        self.zero_padding
            .checked_mul(2)?
            .checked_add(self.input_size)
    }

    /// Top-left corner of the window feeding output cell `(row, col)`.
    pub fn window_origin(&self, row: usize, col: usize) -> (usize, usize) {
        (row * self.stride, col * self.stride)
    }
}
