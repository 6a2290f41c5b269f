use clap::{value_parser, Parser};
use thiserror::Error;

/// Standard input filename
const STDIN_FILE: &str = "-";

const BYTES_PER_SAMPLE: usize = 2;

/// Default read size, in DSC bits
const BITS_PER_READ: usize = 2;

const USAGE_SHORT: &str = r#"
This program accepts raw PCM samples in signed 16-bit little-endian (s16le) format, at the given sampling --rate, and decodes any maritime DSC calls that are present. Decoded calls are printed as they settle.

See --help for more details.

ALWAYS TEST YOUR DECODING SETUP!
"#;

const USAGE_LONG: &str = r#"
This program accepts raw PCM samples in signed 16-bit little-endian (s16le) format, at the given sampling --rate, and decodes any maritime DSC calls that are present. Decoded calls are printed as they settle.

Tune your receiver to a DSC channel in upper sideband, 1.7 kHz below the assigned frequency, so that the DSC tones fall near 1615 Hz and 1785 Hz. The receiver will track small tuning errors.

You can pipe in an audio file with sox

    sox input.wav -t raw -r 44.1k -e signed -b 16 -c 1 -L - \
        | dscdec -r 44100

or listen live

    parec --channels 1 --format s16le \
      --rate 44100 --latency-msec 500 \
        | dscdec -r 44100

Calls which fail their error check are printed too. Check the Status line before acting on a call.

ALWAYS TEST YOUR DECODING SETUP!
"#;

const ADVANCED: &str = "Advanced Modem Options";

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING, not even DSC calls
    #[arg(short, long)]
    pub quiet: bool,

    /// Sampling rate (Hz)
    ///
    /// Set to the sampling rate of your audio source. If sampling from
    /// a sound card, use the card's native rate, usually 44100 or 48000.
    /// Avoid resampling the audio.
    #[arg(short, long, default_value_t = 44100)]
    #[arg(value_parser = value_parser!(u32).range(8000..))]
    pub rate: u32,

    /// Input file (or "-" for stdin)
    ///
    /// The input must be one-channel (mono), signed 16-bit
    /// little-endian at --rate.
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Exit after this many calls
    #[arg(short = 'n', long)]
    pub count: Option<u64>,

    /// Mark (lower) tone frequency (Hz)
    #[arg(long, default_value_t = 1615.0)]
    pub mark: f32,

    /// Space (upper) tone frequency (Hz)
    #[arg(long, default_value_t = 1785.0)]
    pub space: f32,

    /// Do not track the tone frequencies
    #[arg(long)]
    pub no_auto_tune: bool,

    /// Number of bit phases to decode (1 to 8)
    #[arg(long, default_value_t = 3)]
    #[arg(value_parser = value_parser!(u8).range(1..=8))]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub phases: u8,

    /// FFT length for tone detection (samples)
    #[arg(long, default_value_t = 2048)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub fft_size: usize,

    /// Lowest frequency searched by the tone tracker (Hz)
    #[arg(long, default_value_t = 1400.0)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub tune_min: f32,

    /// Highest frequency searched by the tone tracker (Hz)
    #[arg(long, default_value_t = 2000.0)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub tune_max: f32,

    /// Expected FSK shift (Hz)
    #[arg(long, default_value_t = 170.0)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub shift: f32,

    /// Permitted error in the FSK shift (Hz)
    #[arg(long, default_value_t = 10.0)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub shift_tolerance: f32,

    /// Power req'd to start decoding (mean square)
    #[arg(long, default_value_t = 1.0e-7)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub squelch: f32,

    /// Power drop req'd to stop decoding (mean square)
    #[arg(long, default_value_t = 0.0)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub squelch_hysteresis: f32,

    /// Time to wait for a better copy of each call (ms)
    #[arg(long, default_value_t = 2000)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub settle_ms: u64,

    /// Bytes per read [default: two bits of audio]
    #[arg(long)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub chunk_bytes: Option<usize>,

    /// Permitted parity errors per synchronization attempt
    #[arg(long, default_value_t = 75)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub max_parity_errors: u32,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }

    /// Bytes per read
    ///
    /// Defaults to two bits (20 ms) of 16-bit audio.
    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
            .unwrap_or(BYTES_PER_SAMPLE * BITS_PER_READ * (self.rate / dscrx::BAUD_HZ) as usize)
    }
}

/// Reasons for `dscdec` to exit early
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad arguments, or a request for help or version
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// The audio input could not be opened
    #[error("input: {0:#}")]
    Input(anyhow::Error),

    /// The receiver stopped with an error
    #[error("receiver: {0:#}")]
    Receiver(anyhow::Error),
}

impl CliError {
    /// Process exit code
    ///
    /// Input errors use `EX_NOINPUT` from `sysexits.h`.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(err) if err.use_stderr() => 2,
            CliError::Usage(_) => 0,
            CliError::Input(_) => 66,
            CliError::Receiver(_) => 1,
        }
    }

    /// Print this error to the terminal and exit
    ///
    /// Usage errors, help, and version are printed by clap.
    pub fn exit(&self) -> ! {
        match self {
            CliError::Usage(err) => err.exit(),
            other => {
                eprintln!("dscdec: {}", other);
                std::process::exit(other.exit_code());
            }
        }
    }
}
