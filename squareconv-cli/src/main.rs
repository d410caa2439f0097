//! squareconv CLI: build a convolution job, run it, print the result.

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use env_logger::Env;
use log::info;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use squareconv::datasets::{load_demo, make_random_job};
use squareconv::io::{
    load_job, read_matrix_csv, save_report, write_matrix_csv, ConvolutionJob, ConvolutionReport,
};
use squareconv::{Channel, SquareMatrix};

#[derive(Parser)]
#[command(name = "squareconv")]
#[command(about = "Multi-channel square convolution with a derived stride and zero padding")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    tuning: Tuning,

    /// Write the result matrix to a CSV file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Write a JSON report (stride, padding, sizes, result)
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Log level (overrides RUST_LOG)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Solver and engine settings; each overrides the job's own value.
#[derive(Args)]
struct Tuning {
    /// Largest stride the solver tries
    #[arg(long, global = true)]
    initial_stride: Option<usize>,

    /// Smallest zero padding the solver tries
    #[arg(long, global = true)]
    initial_padding: Option<usize>,

    /// Padding values tried per stride
    #[arg(long, global = true)]
    padding_attempts: Option<usize>,

    /// Process channels in parallel
    #[arg(long, global = true)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in demonstration job
    Demo,

    /// Run a JSON job file
    Run {
        /// Job file
        #[arg(value_name = "JOB")]
        job: PathBuf,
    },

    /// Build a job from CSV matrices
    Csv {
        /// Input matrix; give one to share it across all filters
        #[arg(long = "input", value_name = "CSV", required = true)]
        inputs: Vec<PathBuf>,

        /// Filter matrix, one per channel
        #[arg(long = "filter", value_name = "CSV", required = true)]
        filters: Vec<PathBuf>,

        /// Bias matrix, as large as the filters
        #[arg(long, value_name = "CSV")]
        bias: PathBuf,
    },

    /// Run a seeded random job
    Random {
        #[arg(long, default_value_t = 3)]
        channels: usize,

        #[arg(long, default_value_t = 5)]
        input_size: usize,

        #[arg(long, default_value_t = 3)]
        filter_size: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if cli.quiet {
        logger.filter_level(log::LevelFilter::Warn);
    } else if let Some(level) = cli.log_level {
        logger.filter_level(level.into());
    }
    logger.init();

    if let Err(e) = run(cli) {
        report_error(e.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut job = build_job(cli.command)?;
    apply_tuning(&mut job, &cli.tuning);

    let mut engine = job.into_engine();
    engine.convolve()?;
    let conv = engine.last().ok_or("convolution produced no result")?;
    info!(
        "{} channel(s), {}x{} output",
        conv.channel_outputs.len(),
        conv.parameters.output_size,
        conv.parameters.output_size
    );

    let mut stdout = io::stdout();
    if stdout.is_terminal() {
        let p = conv.parameters;
        execute!(
            stdout,
            SetForegroundColor(Color::Cyan),
            Print(format!("stride {}, zero padding {}\n", p.stride, p.zero_padding)),
            ResetColor,
        )?;
    }
    engine.print_to(stdout.lock())?;

    if let Some(path) = &cli.output {
        write_matrix_csv(path, &conv.output)?;
        info!("Wrote result to {}", path.display());
    }
    if let Some(path) = &cli.report {
        save_report(&ConvolutionReport::from(conv), path)?;
        info!("Wrote report to {}", path.display());
    }
    Ok(())
}

fn build_job(command: Commands) -> Result<ConvolutionJob, Box<dyn Error>> {
    let job = match command {
        Commands::Demo => {
            let (channels, bias) = load_demo();
            ConvolutionJob::new(channels, bias)
        }
        Commands::Run { job } => load_job(job)?,
        Commands::Csv {
            inputs,
            filters,
            bias,
        } => {
            if inputs.len() != 1 && inputs.len() != filters.len() {
                return Err(format!(
                    "got {} inputs for {} filters; give one input or one per filter",
                    inputs.len(),
                    filters.len()
                )
                .into());
            }
            let inputs = inputs
                .iter()
                .map(read_matrix_csv)
                .collect::<Result<Vec<SquareMatrix<i64>>, _>>()?;
            let mut channels = Vec::with_capacity(filters.len());
            for (i, path) in filters.iter().enumerate() {
                let input = inputs.get(i).unwrap_or(&inputs[0]).clone();
                channels.push(Channel::new(input, read_matrix_csv(path)?));
            }
            ConvolutionJob::new(channels, read_matrix_csv(bias)?)
        }
        Commands::Random {
            channels,
            input_size,
            filter_size,
            seed,
        } => {
            let (channels, bias) = make_random_job(channels, input_size, filter_size, seed);
            ConvolutionJob::new(channels, bias)
        }
    };
    Ok(job)
}

fn apply_tuning(job: &mut ConvolutionJob, tuning: &Tuning) {
    if tuning.initial_stride.is_some() {
        job.initial_stride = tuning.initial_stride;
    }
    if tuning.initial_padding.is_some() {
        job.initial_padding = tuning.initial_padding;
    }
    if tuning.padding_attempts.is_some() {
        job.padding_attempts = tuning.padding_attempts;
    }
    if tuning.parallel {
        job.parallel = Some(true);
    }
}

fn report_error(e: &dyn Error) {
    let mut stderr = io::stderr();
    if stderr.is_terminal() {
        let _ = execute!(
            stderr,
            SetForegroundColor(Color::Red),
            Print(format!("Error: {}\n", e)),
            ResetColor,
        );
    } else {
        eprintln!("Error: {}", e);
    }
}
