//! step2mesh command line entry point

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{CommandFactory, Parser};
use sm_core::{ConvertError, ExportOptions, read_named_solids, select, write};
use sm_kernel::{KernelConfig, LengthUnit, StlFormat, default_kernel};

/// STEP to triangle mesh conversion
#[derive(Parser, Debug)]
#[command(name = "step2mesh", version)]
struct Cli {
    /// Input file
    #[arg(short = 'i', long = "in", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Output file format (stl_bin or stl_ascii)
    #[arg(short, long, default_value = "stl_bin")]
    format: String,

    /// List content (solids)
    #[arg(short, long)]
    content: bool,

    /// Select solids by name or index (comma separated list, index starts with 1)
    #[arg(short, long, value_delimiter = ',')]
    select: Vec<String>,

    /// Linear deflection
    #[arg(short, long)]
    linear: Option<f64>,

    /// Angular deflection (degrees)
    #[arg(short, long)]
    angular: Option<f64>,

    #[arg(short, long, default_value = "MM", help = unit_help())]
    unit: String,
}

fn unit_help() -> String {
    format!("Output unit (one of {})", LengthUnit::valid_names())
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    match run(&cli, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprint!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, stdout: &mut impl Write) -> anyhow::Result<()> {
    // The unit is applied before anything else is looked at
    let unit: LengthUnit = cli.unit.parse()?;
    let provider = default_kernel(KernelConfig { unit });
    tracing::debug!("Using {} kernel, output unit {}", provider.name(), unit);

    if cli.content {
        let input = cli.input.as_deref().context("Missing option 'in'")?;
        for solid in read_named_solids(provider.as_ref(), input)? {
            writeln!(stdout, "{}", solid.name)?;
        }
        return Ok(());
    }

    if let (Some(input), Some(output)) = (&cli.input, &cli.out) {
        let Some(linear_deflection) = cli.linear else {
            bail!("Missing option 'linear'");
        };
        let Some(angular_deflection_degrees) = cli.angular else {
            bail!("Missing option 'angular'");
        };
        let format: StlFormat = cli
            .format
            .parse()
            .map_err(ConvertError::UnsupportedFormat)?;

        let named = read_named_solids(provider.as_ref(), input)?;
        let solids = select(&named, &cli.select)?;
        let options = ExportOptions {
            linear_deflection,
            angular_deflection_degrees,
            format,
        };
        write(provider.as_ref(), output, &solids, &options)?;
        return Ok(());
    }

    writeln!(stdout, "{}", Cli::command().render_help())?;
    Ok(())
}
