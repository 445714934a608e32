use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use filterdesign::config::{FilterConfig, FilterType, FirMethod, OutputFormat};
use filterdesign::design::{self, DesignedFilter};
use filterdesign::synthesis::{IirFamily, Window};
use filterdesign::units::Scalar;

#[derive(Parser, Debug)]
#[command(name = "filterdesign")]
#[command(about = "Design lowpass, highpass, bandpass and notch filters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML file with [design] and [notch] defaults
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Report format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text", global = true)]
    format: ReportFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Low-pass filter passing frequencies below FREQUENCY
    Lowpass {
        /// Cutoff (e.g. "1000", "1.5kHz")
        frequency: Scalar,
        #[command(flatten)]
        common: CommonArgs,
        /// Start of the stopband (default: 1.5 x cutoff, capped at Nyquist)
        #[arg(long)]
        fstop: Option<Scalar>,
    },
    /// High-pass filter passing frequencies above FREQUENCY
    Highpass {
        frequency: Scalar,
        #[command(flatten)]
        common: CommonArgs,
        /// End of the stopband (default: 2/3 x cutoff)
        #[arg(long)]
        fstop: Option<Scalar>,
    },
    /// Band-pass filter passing FLOW..FHIGH
    Bandpass {
        flow: Scalar,
        fhigh: Scalar,
        #[command(flatten)]
        common: CommonArgs,
        /// Stopband edges as two values
        #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
        fstop: Option<Vec<Scalar>>,
    },
    /// IIR notch filter at FREQUENCY
    Notch {
        frequency: Scalar,
        /// Sampling rate of the data to filter
        #[arg(short = 's', long)]
        sample_rate: Scalar,
        #[arg(long)]
        gpass: Option<f64>,
        #[arg(long)]
        gstop: Option<f64>,
        #[arg(long, value_enum)]
        family: Option<IirFamily>,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Sampling rate of the data to filter
    #[arg(short = 's', long)]
    sample_rate: Scalar,

    /// Maximum passband loss (dB)
    #[arg(long)]
    gpass: Option<f64>,

    /// Minimum stopband attenuation (dB)
    #[arg(long)]
    gstop: Option<f64>,

    /// Filter type: iir, fir
    #[arg(short = 't', long = "type", value_enum)]
    filter_type: Option<FilterType>,

    /// IIR output form: zpk, ba, sos
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormat>,

    /// IIR family: butter, cheby1, cheby2, ellip
    #[arg(long, value_enum)]
    family: Option<IirFamily>,

    /// Design an analog filter (roots in Hz)
    #[arg(long)]
    analog: bool,

    /// FIR window (e.g. "hamming", "kaiser:8.6")
    #[arg(long)]
    window: Option<Window>,

    /// FIR synthesis method: window, remez
    #[arg(long, value_enum)]
    method: Option<FirMethod>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

impl CommonArgs {
    fn apply(&self, config: &mut FilterConfig) {
        let design = &mut config.design;
        if let Some(gpass) = self.gpass {
            design.gpass = gpass;
        }
        if let Some(gstop) = self.gstop {
            design.gstop = gstop;
        }
        if let Some(filter_type) = self.filter_type {
            design.filter_type = filter_type;
        }
        if let Some(output) = self.output {
            design.output = output;
        }
        if let Some(family) = self.family {
            design.family = family;
        }
        if self.analog {
            design.analog = true;
        }
        if self.window.is_some() {
            design.fir.window = self.window;
        }
        if let Some(method) = self.method {
            design.fir.method = method;
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<FilterConfig> {
    let Some(path) = path else {
        return Ok(FilterConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    FilterConfig::from_toml_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn print_text(filter: &DesignedFilter) {
    match filter {
        DesignedFilter::Zpk(zpk) => {
            println!("Zeros ({}):", zpk.zeros.len());
            for z in &zpk.zeros {
                println!("  {:+.10} {:+.10}j", z.re, z.im);
            }
            println!("Poles ({}):", zpk.poles.len());
            for p in &zpk.poles {
                println!("  {:+.10} {:+.10}j", p.re, p.im);
            }
            println!("Gain: {:.10e}", zpk.gain);
        }
        DesignedFilter::TransferFunction(tf) => {
            println!("b: {:?}", tf.numerator);
            println!("a: {:?}", tf.denominator);
        }
        DesignedFilter::Sos(sos) => {
            println!("Sections ({}):", sos.len());
            for s in &sos.sections {
                println!(
                    "  {:+.10e} {:+.10e} {:+.10e} | {:+.10e} {:+.10e} {:+.10e}",
                    s[0], s[1], s[2], s[3], s[4], s[5]
                );
            }
        }
        DesignedFilter::Fir(taps) => {
            println!("Taps ({}):", taps.len());
            for t in taps {
                println!("  {:+.10e}", t);
            }
        }
    }
}

fn design_filter(command: &Command, config: &mut FilterConfig) -> anyhow::Result<DesignedFilter> {
    let filter = match command {
        Command::Lowpass {
            frequency,
            common,
            fstop,
        } => {
            common.apply(config);
            design::lowpass(*frequency, common.sample_rate, *fstop, &config.design)
                .context("Failed to design lowpass filter")?
        }
        Command::Highpass {
            frequency,
            common,
            fstop,
        } => {
            common.apply(config);
            design::highpass(*frequency, common.sample_rate, *fstop, &config.design)
                .context("Failed to design highpass filter")?
        }
        Command::Bandpass {
            flow,
            fhigh,
            common,
            fstop,
        } => {
            common.apply(config);
            let fstop = fstop.as_deref().map(|f| (f[0], f[1]));
            design::bandpass(*flow, *fhigh, common.sample_rate, fstop, &config.design)
                .context("Failed to design bandpass filter")?
        }
        Command::Notch {
            frequency,
            sample_rate,
            gpass,
            gstop,
            family,
        } => {
            let notch = &mut config.notch;
            if let Some(gpass) = gpass {
                notch.gpass = *gpass;
            }
            if let Some(gstop) = gstop {
                notch.gstop = *gstop;
            }
            if let Some(family) = family {
                notch.family = *family;
            }
            let zpk = design::notch(*frequency, *sample_rate, &config.notch)
                .context("Failed to design notch filter")?;
            DesignedFilter::Zpk(zpk)
        }
    };

    Ok(filter)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = load_config(cli.config.as_ref())?;

    let filter = design_filter(&cli.command, &mut config)?;

    match cli.format {
        ReportFormat::Text => print_text(&filter),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&filter)
                .context("Failed to serialize filter")?;
            println!("{}", json);
        }
    }

    Ok(())
}
