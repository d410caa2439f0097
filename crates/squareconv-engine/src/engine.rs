use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use squareconv_core::{ConvError, ConvResult, Element, SquareMatrix};
use std::io;

use crate::params::ConvolutionParameters;
use crate::solver::{SolverConfig, StridePaddingSolver};

/// One input matrix paired with the filter applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Element")]
pub struct Channel<T: Element> {
    pub input: SquareMatrix<T>,
    pub filter: SquareMatrix<T>,
}

impl<T: Element> Channel<T> {
    pub fn new(input: SquareMatrix<T>, filter: SquareMatrix<T>) -> Self {
        Channel { input, filter }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverConfig,
    /// Process channels on the rayon thread pool.
    pub parallel: bool,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convolution<T: Element> {
    pub parameters: ConvolutionParameters,
    /// Per-channel outputs, in channel order, before bias.
    pub channel_outputs: Vec<SquareMatrix<T>>,
    /// Channel sum plus bias.
    pub output: SquareMatrix<T>,
}

/// Multi-channel 2-D convolution with a derived stride and padding.
///
/// The output is always as large as the filters. Each run goes through
/// four phases: solve the geometry, zero-pad every input, slide each
/// filter over its padded input, then sum the channels and add the bias.
///
/// Input shape:  N channels of (input_size², filter_size²)
/// Output shape: filter_size²
pub struct ConvolutionEngine<T: Element> {
    channels: Vec<Channel<T>>,
    bias: SquareMatrix<T>,
    config: EngineConfig,
    last: Option<Convolution<T>>,
}

impl<T: Element> ConvolutionEngine<T> {
    pub fn new(channels: Vec<Channel<T>>, bias: SquareMatrix<T>) -> Self {
        ConvolutionEngine {
            channels,
            bias,
            config: EngineConfig::default(),
            last: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn channels(&self) -> &[Channel<T>] {
        &self.channels
    }

    pub fn bias(&self) -> &SquareMatrix<T> {
        &self.bias
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Input and filter size shared by every channel.
    fn common_sizes(&self) -> ConvResult<(usize, usize)> {
        let first = self
            .channels
            .first()
            .ok_or(ConvError::EmptySequence { op: "channels" })?;
        let (input_size, filter_size) = (first.input.size(), first.filter.size());
        for channel in &self.channels[1..] {
            if channel.input.size() != input_size {
                return Err(ConvError::ShapeMismatch {
                    op: "channel input",
                    expected: input_size,
                    got: channel.input.size(),
                });
            }
            if channel.filter.size() != filter_size {
                return Err(ConvError::ShapeMismatch {
                    op: "channel filter",
                    expected: filter_size,
                    got: channel.filter.size(),
                });
            }
        }
        Ok((input_size, filter_size))
    }

    /// Derive stride and padding for the current channels.
    pub fn solve(&self) -> ConvResult<ConvolutionParameters> {
        let (input_size, filter_size) = self.common_sizes()?;
        StridePaddingSolver::new(self.config.solver).solve(input_size, filter_size, filter_size)
    }

    /// Run all four phases without touching the stored result.
    pub fn run(&self) -> ConvResult<Convolution<T>> {
        let parameters = self.solve()?;
        debug!(
            "Convolving {} channel(s): {}x{} input, {}x{} filter",
            self.channels.len(),
            parameters.input_size,
            parameters.input_size,
            parameters.filter_size,
            parameters.filter_size
        );

        let channel_outputs: Vec<SquareMatrix<T>> = if self.config.parallel {
            self.channels
                .par_iter()
                .map(|c| convolve_channel(c, &parameters))
                .collect::<ConvResult<_>>()?
        } else {
            self.channels
                .iter()
                .map(|c| convolve_channel(c, &parameters))
                .collect::<ConvResult<_>>()?
        };

        let output = accumulate(&channel_outputs, &self.bias, &parameters)?;
        Ok(Convolution {
            parameters,
            channel_outputs,
            output,
        })
    }

    /// Run and keep the outcome as the current result. A failed run leaves
    /// no result behind.
    pub fn convolve(&mut self) -> ConvResult<&mut Self> {
        self.last = None;
        self.last = Some(self.run()?);
        Ok(self)
    }

    pub fn result(&self) -> Option<&SquareMatrix<T>> {
        self.last.as_ref().map(|c| &c.output)
    }

    pub fn parameters(&self) -> Option<&ConvolutionParameters> {
        self.last.as_ref().map(|c| &c.parameters)
    }

    pub fn last(&self) -> Option<&Convolution<T>> {
        self.last.as_ref()
    }

    /// Write the current result as whitespace-separated rows. Returns
    /// `false` if nothing has been computed yet.
    pub fn print_to<W: io::Write>(&self, mut out: W) -> io::Result<bool> {
        match self.result() {
            Some(m) => {
                writeln!(out, "{}", m)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Pad one channel's input and slide its filter across it.
pub fn convolve_channel<T: Element>(
    channel: &Channel<T>,
    params: &ConvolutionParameters,
) -> ConvResult<SquareMatrix<T>> {
    let padded = channel.input.padded(params.zero_padding);
    apply_filter(&padded, &channel.filter, params)
}

/// Dot the filter with every window of an already padded input.
pub fn apply_filter<T: Element>(
    padded: &SquareMatrix<T>,
    filter: &SquareMatrix<T>,
    params: &ConvolutionParameters,
) -> ConvResult<SquareMatrix<T>> {
    let expected = params.padded_size().unwrap_or(usize::MAX);
    if padded.size() != expected {
        return Err(ConvError::PaddedSizeMismatch {
            expected,
            got: padded.size(),
        });
    }
    let out = params.output_size;
    let mut data = Vec::with_capacity(out * out);
    for t in 0..out {
        for i in 0..out {
            let (top, left) = params.window_origin(t, i);
            let window = padded.window(top, left, params.filter_size)?;
            data.push(filter.dot(&window)?);
        }
    }
    SquareMatrix::new(data, out)
}

/// Sum the channel outputs and add the bias.
pub fn accumulate<T: Element>(
    channel_outputs: &[SquareMatrix<T>],
    bias: &SquareMatrix<T>,
    params: &ConvolutionParameters,
) -> ConvResult<SquareMatrix<T>> {
    if bias.size() != params.output_size {
        return Err(ConvError::ShapeMismatch {
            op: "bias",
            expected: params.output_size,
            got: bias.size(),
        });
    }
    let summed = SquareMatrix::sum_all(channel_outputs)?;
    debug!("Adding {}x{} bias", bias.size(), bias.size());
    summed.add(bias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use squareconv_core::ErrorKind;

    fn m(rows: &[Vec<i64>]) -> SquareMatrix<i64> {
        SquareMatrix::from_rows(rows).unwrap()
    }

    fn sample_input() -> SquareMatrix<i64> {
        m(&[
            vec![0, 1, 0, 2, 1],
            vec![2, 2, 2, 0, 1],
            vec![0, 1, 2, 1, 2],
            vec![2, 1, 1, 1, 0],
            vec![2, 1, 2, 1, 0],
        ])
    }

    fn sample_filters() -> Vec<SquareMatrix<i64>> {
        vec![
            m(&[vec![-1, 0, -1], vec![-1, -1, -1], vec![1, 0, -1]]),
            m(&[vec![0, -1, 0], vec![-1, 0, 0], vec![1, 0, 1]]),
            m(&[vec![-1, 0, 1], vec![-1, 1, -1], vec![1, 0, 1]]),
        ]
    }

    fn sample_engine() -> ConvolutionEngine<i64> {
        let channels = sample_filters()
            .into_iter()
            .map(|f| Channel::new(sample_input(), f))
            .collect();
        ConvolutionEngine::new(channels, SquareMatrix::full(3, 1))
    }

    #[test]
    fn test_all_ones() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut engine = ConvolutionEngine::new(
            vec![Channel::new(SquareMatrix::full(5, 1i64), SquareMatrix::full(3, 1))],
            SquareMatrix::zeros(3),
        );
        engine.convolve().unwrap();

        assert_eq!(engine.parameters().map(|p| (p.stride, p.zero_padding)), Some((2, 1)));
        // corners overlap the zero border on two sides, edges on one
        assert_eq!(
            engine.result().unwrap().to_rows(),
            vec![vec![4, 6, 4], vec![6, 9, 6], vec![4, 6, 4]]
        );
    }

    #[test]
    fn test_three_channels_with_bias() {
        let mut engine = sample_engine();
        let conv = engine.convolve().unwrap().last().unwrap().clone();

        assert_eq!(conv.channel_outputs.len(), 3);
        assert_eq!(
            conv.channel_outputs[0].to_rows(),
            vec![vec![-3, -1, -3], vec![-4, -6, -2], vec![-4, -6, -2]]
        );

        let mut expected = SquareMatrix::full(3, 1i64);
        for filter in sample_filters() {
            let single = convolve_channel(&Channel::new(sample_input(), filter), &conv.parameters)
                .unwrap();
            expected = expected.add(&single).unwrap();
        }
        assert_eq!(conv.output, expected);
        assert_eq!(
            conv.output.to_rows(),
            vec![vec![1, 0, -5], vec![-2, -6, 0], vec![-3, -7, -4]]
        );
    }

    #[test]
    fn test_convolve_is_idempotent() {
        let mut engine = sample_engine();
        let first = engine.convolve().unwrap().result().cloned();
        let second = engine.convolve().unwrap().result().cloned();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = sample_engine().run().unwrap();
        let parallel = sample_engine()
            .with_config(EngineConfig { parallel: true, ..EngineConfig::default() })
            .run()
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_bias_size_mismatch() {
        let mut engine = ConvolutionEngine::new(
            vec![Channel::new(SquareMatrix::full(5, 1i64), SquareMatrix::full(3, 1))],
            SquareMatrix::zeros(4),
        );
        let err = engine.convolve().map(|_| ()).unwrap_err();
        assert_eq!(err, ConvError::ShapeMismatch { op: "bias", expected: 3, got: 4 });
        assert!(engine.result().is_none());
    }

    #[test]
    fn test_failed_run_clears_result() {
        let mut engine = sample_engine();
        engine.convolve().unwrap();
        assert!(engine.result().is_some());

        engine.config.solver.initial_stride = 0;
        assert_eq!(
            engine.convolve().map(|_| ()).unwrap_err().kind(),
            ErrorKind::NoFeasibleStride
        );
        assert!(engine.result().is_none());
    }

    #[test]
    fn test_channel_size_mismatch() {
        let engine = ConvolutionEngine::new(
            vec![
                Channel::new(SquareMatrix::<i64>::zeros(5), SquareMatrix::zeros(3)),
                Channel::new(SquareMatrix::zeros(7), SquareMatrix::zeros(3)),
            ],
            SquareMatrix::zeros(3),
        );
        assert_eq!(
            engine.run().unwrap_err(),
            ConvError::ShapeMismatch { op: "channel input", expected: 5, got: 7 }
        );

        let engine = ConvolutionEngine::new(
            vec![
                Channel::new(SquareMatrix::<i64>::zeros(5), SquareMatrix::zeros(3)),
                Channel::new(SquareMatrix::zeros(5), SquareMatrix::zeros(2)),
            ],
            SquareMatrix::zeros(3),
        );
        assert_eq!(engine.run().unwrap_err().kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_no_channels() {
        let engine: ConvolutionEngine<i64> = ConvolutionEngine::new(vec![], SquareMatrix::zeros(3));
        assert_eq!(engine.run().unwrap_err(), ConvError::EmptySequence { op: "channels" });
    }

    #[test]
    fn test_window_out_of_bounds() {
        // parameters that claim more room than the padded input has
        let params = ConvolutionParameters {
            input_size: 5,
            filter_size: 3,
            output_size: 3,
            stride: 2,
            zero_padding: 0,
        };
        let err = apply_filter(&SquareMatrix::<i64>::zeros(5), &SquareMatrix::zeros(3), &params)
            .unwrap_err();
        assert_eq!(err, ConvError::WindowOutOfBounds { row: 0, col: 4, window: 3, size: 5 });
        assert_eq!(err.kind(), ErrorKind::Bounds);
    }

    #[test]
    fn test_unpadded_input_is_rejected() {
        let params = ConvolutionParameters {
            input_size: 5,
            filter_size: 3,
            output_size: 3,
            stride: 2,
            zero_padding: 1,
        };
        let input = SquareMatrix::<i64>::full(5, 1);
        let filter = SquareMatrix::full(3, 1);
        let err = apply_filter(&input, &filter, &params).unwrap_err();
        assert_eq!(err, ConvError::PaddedSizeMismatch { expected: 7, got: 5 });
        assert_eq!(err.kind(), ErrorKind::Bounds);

        let out = apply_filter(&input.padded(1), &filter, &params).unwrap();
        assert_eq!(out.get(1, 1).unwrap(), 9);
    }

    #[test]
    fn test_print_to() {
        let mut engine = sample_engine();
        let mut out = Vec::new();
        assert!(!engine.print_to(&mut out).unwrap());
        assert!(out.is_empty());

        engine.convolve().unwrap();
        assert!(engine.print_to(&mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "1 0 -5\n-2 -6 0\n-3 -7 -4\n");
    }
}
