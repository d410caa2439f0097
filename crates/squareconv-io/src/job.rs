use crate::error::IoResult;
use log::debug;
use serde::{Deserialize, Serialize};
use squareconv_core::SquareMatrix;
use squareconv_engine::{
    Channel, Convolution, ConvolutionEngine, ConvolutionParameters, EngineConfig, SolverConfig,
};
use std::fs;
use std::path::Path;

/// Serializable description of one convolution: channels, bias and the
/// optional solver/engine settings. Missing settings take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvolutionJob {
    pub channels: Vec<Channel<i64>>,
    pub bias: SquareMatrix<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_stride: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_padding: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_attempts: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

impl ConvolutionJob {
    pub fn new(channels: Vec<Channel<i64>>, bias: SquareMatrix<i64>) -> Self {
        ConvolutionJob {
            channels,
            bias,
            initial_stride: None,
            initial_padding: None,
            padding_attempts: None,
            parallel: None,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        let defaults = SolverConfig::default();
        EngineConfig {
            solver: SolverConfig {
                initial_stride: self.initial_stride.unwrap_or(defaults.initial_stride),
                initial_padding: self.initial_padding.unwrap_or(defaults.initial_padding),
                padding_attempts: self.padding_attempts.unwrap_or(defaults.padding_attempts),
            },
            parallel: self.parallel.unwrap_or(false),
        }
    }

    pub fn into_engine(self) -> ConvolutionEngine<i64> {
        let config = self.engine_config();
        ConvolutionEngine::new(self.channels, self.bias).with_config(config)
    }
}

/// Load a job from a JSON file.
pub fn load_job(path: impl AsRef<Path>) -> IoResult<ConvolutionJob> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let job: ConvolutionJob = serde_json::from_str(&json)?;
    debug!("Loaded job with {} channel(s) from {}", job.channels.len(), path.display());
    Ok(job)
}

/// Save a job to a JSON file.
pub fn save_job(job: &ConvolutionJob, path: impl AsRef<Path>) -> IoResult<()> {
    let json = serde_json::to_string_pretty(job)?;
    fs::write(path, json)?;
    Ok(())
}

/// Solved geometry and final matrix of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvolutionReport {
    #[serde(flatten)]
    pub parameters: ConvolutionParameters,
    pub channels: usize,
    pub result: SquareMatrix<i64>,
}

impl From<&Convolution<i64>> for ConvolutionReport {
    fn from(conv: &Convolution<i64>) -> Self {
        ConvolutionReport {
            parameters: conv.parameters,
            channels: conv.channel_outputs.len(),
            result: conv.output.clone(),
        }
    }
}

impl ConvolutionReport {
    pub fn to_json(&self) -> IoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Save a report to a JSON file.
pub fn save_report(report: &ConvolutionReport, path: impl AsRef<Path>) -> IoResult<()> {
    fs::write(path, report.to_json()?)?;
    Ok(())
}
