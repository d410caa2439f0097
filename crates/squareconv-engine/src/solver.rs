use log::{debug, info};
use serde::{Deserialize, Serialize};
use squareconv_core::{ConvError, ConvResult};

use crate::params::ConvolutionParameters;

/// Starting point and extent of the stride/padding search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Largest stride tried; the search walks down to zero from here.
    pub initial_stride: usize,
    /// Smallest padding tried for each stride.
    pub initial_padding: usize,
    /// How many consecutive padding values are tried per stride.
    pub padding_attempts: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            initial_stride: 2,
            initial_padding: 0,
            padding_attempts: 4,
        }
    }
}

/// Finds a stride and zero padding that turn `input_size` into exactly
/// `output_size` windows of `filter_size`.
///
/// Strides are tried from `initial_stride` down to zero and, within a
/// stride, paddings from `initial_padding` upwards for `padding_attempts`
/// values. The first pair that fits wins, so larger strides are preferred
/// over smaller ones and smaller paddings over larger ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct StridePaddingSolver {
    config: SolverConfig,
}

impl StridePaddingSolver {
    pub fn new(config: SolverConfig) -> Self {
        StridePaddingSolver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve(
        &self,
        input_size: usize,
        filter_size: usize,
        output_size: usize,
    ) -> ConvResult<ConvolutionParameters> {
        let SolverConfig {
            initial_stride,
            initial_padding,
            padding_attempts,
        } = self.config;
        let paddings = initial_padding..initial_padding.saturating_add(padding_attempts);

        for stride in (0..=initial_stride).rev() {
            for zero_padding in paddings.clone() {
                if ConvolutionParameters::fits(
                    input_size,
                    filter_size,
                    output_size,
                    stride,
                    zero_padding,
                ) {
                    info!("stride: {stride}, zero padding: {zero_padding}");
                    return Ok(ConvolutionParameters {
                        input_size,
                        filter_size,
                        output_size,
                        stride,
                        zero_padding,
                    });
                }
            }
            debug!("No padding in {paddings:?} fits stride {stride}");
        }

        Err(ConvError::NoFeasibleStride {
            input_size,
            filter_size,
            output_size,
            max_stride: initial_stride,
            min_padding: initial_padding,
            max_padding: paddings.end.saturating_sub(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squareconv_core::ErrorKind;

    fn solve(input: usize, filter: usize) -> ConvResult<ConvolutionParameters> {
        StridePaddingSolver::default().solve(input, filter, filter)
    }

    #[test]
    fn test_prefers_larger_stride() {
        // (5 - 3 + 2) / 2 + 1 = 3; stride 1 with no padding also fits but is
        // tried later
        let p = solve(5, 3).unwrap();
        assert_eq!((p.stride, p.zero_padding), (2, 1));
        assert!(p.is_consistent());
        assert!(ConvolutionParameters::fits(5, 3, 3, 1, 0));

        let p = solve(7, 3).unwrap();
        assert_eq!((p.stride, p.zero_padding), (2, 0));
    }

    #[test]
    fn test_prefers_smaller_padding() {
        // stride 2 fits only once the padding reaches 2
        let p = solve(3, 3).unwrap();
        assert_eq!((p.stride, p.zero_padding), (2, 2));
    }

    #[test]
    fn test_falls_back_to_stride_one() {
        let p = solve(5, 5).unwrap();
        assert_eq!((p.stride, p.zero_padding), (1, 2));
    }

    #[test]
    fn test_filter_larger_than_input() {
        let p = solve(3, 5).unwrap();
        assert!(p.is_consistent());
        assert_eq!((p.stride, p.zero_padding), (1, 3));

        // odd spots at every padding, for every stride
        assert!(solve(2, 3).is_err());
    }

    #[test]
    fn test_no_feasible_stride() {
        let err = solve(4, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoFeasibleStride);
        assert_eq!(
            err,
            ConvError::NoFeasibleStride {
                input_size: 4,
                filter_size: 3,
                output_size: 3,
                max_stride: 2,
                min_padding: 0,
                max_padding: 3,
            }
        );
    }

    #[test]
    fn test_custom_start() {
        let solver = StridePaddingSolver::new(SolverConfig {
            initial_stride: 1,
            ..SolverConfig::default()
        });
        let p = solver.solve(5, 3, 3).unwrap();
        assert_eq!((p.stride, p.zero_padding), (1, 0));

        let solver = StridePaddingSolver::new(SolverConfig {
            initial_padding: 2,
            ..SolverConfig::default()
        });
        let p = solver.solve(3, 3, 3).unwrap();
        assert_eq!((p.stride, p.zero_padding), (2, 2));
        // the fitting paddings for 5/3 both lie below the starting guess
        assert!(solver.solve(5, 3, 3).is_err());

        let solver = StridePaddingSolver::new(SolverConfig {
            padding_attempts: 0,
            ..SolverConfig::default()
        });
        assert!(solver.solve(5, 3, 3).is_err());
    }

    #[test]
    fn test_huge_padding_settings_fail_cleanly() {
        let solver = StridePaddingSolver::new(SolverConfig {
            initial_padding: usize::MAX,
            ..SolverConfig::default()
        });
        let err = solver.solve(5, 3, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoFeasibleStride);

        let solver = StridePaddingSolver::new(SolverConfig {
            initial_padding: usize::MAX - 1,
            padding_attempts: usize::MAX,
            ..SolverConfig::default()
        });
        assert!(matches!(
            solver.solve(5, 3, 3).unwrap_err(),
            ConvError::NoFeasibleStride { max_padding, .. } if max_padding == usize::MAX - 1
        ));
    }

    #[test]
    fn test_zero_start_stride_never_fits() {
        let solver = StridePaddingSolver::new(SolverConfig {
            initial_stride: 0,
            ..SolverConfig::default()
        });
        assert_eq!(solver.solve(5, 3, 3).unwrap_err().kind(), ErrorKind::NoFeasibleStride);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_solution_satisfies_formula(filter in 1usize..=8, extra in 0usize..=12) {
                let input = filter + extra;
                if let Ok(p) = solve(input, filter) {
                    prop_assert!(p.stride >= 1);
                    prop_assert_eq!(
                        ConvolutionParameters::stride_spots(input, filter, p.zero_padding).unwrap()
                            / p.stride as i64 + 1,
                        filter as i64
                    );
                    prop_assert!(p.is_consistent());
                }
            }

            #[test]
            fn prop_first_fit_in_scan_order(filter in 1usize..=8, input in 1usize..=16) {
                let config = SolverConfig::default();
                let expected = (0..=config.initial_stride).rev().find_map(|s| {
                    (0..config.padding_attempts)
                        .find(|&p| ConvolutionParameters::fits(input, filter, filter, s, p))
                        .map(|p| (s, p))
                });
                let got = solve(input, filter).ok().map(|p| (p.stride, p.zero_padding));
                prop_assert_eq!(got, expected);
            }
        }
    }
}
