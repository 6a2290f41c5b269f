use std::io;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, LevelFilter};

use dscrx::DscReceiverBuilder;

mod app;
mod cli;

use cli::{Args, CliError};

fn main() {
    match dscdec() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn dscdec() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    // create the decoder
    let rx = DscReceiverBuilder::new(args.rate)
        .with_phases(args.phases as usize)
        .with_fft_size(args.fft_size)
        .with_tones(args.mark, args.space)
        .with_auto_tune(!args.no_auto_tune)
        .with_tuning_band(args.tune_min, args.tune_max)
        .with_shift(args.shift, args.shift_tolerance)
        .with_squelch(args.squelch, args.squelch_hysteresis)
        .with_settle_window(Duration::from_millis(args.settle_ms))
        .with_chunk_bytes(args.chunk_bytes())
        .with_max_parity_errors(args.max_parity_errors)
        .with_spectrum_events(false)
        .build();

    let input = file_setup(&args).map_err(CliError::Input)?;
    app::run(&args, rx, input).map_err(CliError::Receiver)?;

    Ok(())
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("dscrx", log_filter)
            .filter_module("dscdec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

fn file_setup(args: &Args) -> Result<Box<dyn io::Read + Send>, anyhow::Error> {
    if args.input_is_stdin() {
        info!("DSC decoder reading standard input");
        let stdin = io::stdin();
        if !is_terminal(&stdin) {
            Ok(Box::new(stdin))
        } else {
            Err(anyhow!(
                "cowardly refusing to read audio samples from a terminal.

Pipe a source of raw uncompressed audio from sox, parec, rtl_fm,
or similar into this program."
            ))
        }
    } else {
        info!("DSC decoder reading file: \"{}\"", &args.file);
        Ok(Box::new(io::BufReader::new(
            std::fs::File::open(&args.file)
                .with_context(|| format!("Unable to open --file \"{}\"", args.file))?,
        )))
    }
}

#[cfg(not(target_os = "windows"))]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::fd::AsRawFd,
{
    terminal_size::terminal_size_using_fd(stream.as_raw_fd()).is_some()
}

#[cfg(target_os = "windows")]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::windows::io::AsRawHandle,
{
    terminal_size::terminal_size_using_handle(stream.as_raw_handle()).is_some()
}
