//! Receiver thread and call printer
//!
//! The receiver runs on its own thread and reads the input
//! until it is exhausted. The main thread prints each call as
//! it arrives. With `--count`, the main thread asks the
//! receiver to stop once enough calls have been printed and
//! waits up to the receiver's grace period for it to finish.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use chrono::{SecondsFormat, Utc};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info};

use dscrx::{DscEvent, DscMessage, DscReceiver, PcmSource};

use crate::cli::Args;

/// Audio device number passed to the source
///
/// Files and pipes have only one.
const DEVICE: u32 = 0;

/// Run the application
///
/// Runs the fully-initialized `receiver` on a worker thread,
/// reading 16-bit PCM from `input`, and prints calls until the
/// input is exhausted or `--count` calls have been printed.
pub fn run<R>(args: &Args, mut receiver: DscReceiver, input: R) -> Result<(), anyhow::Error>
where
    R: Read + Send + 'static,
{
    let events = receiver.subscribe();
    let grace = receiver.stop_grace();
    let stop = Arc::new(AtomicBool::new(false));

    let worker_stop = stop.clone();
    let worker = thread::Builder::new()
        .name("dscrx".to_owned())
        .spawn(move || {
            let mut source = PcmSource::new(input);
            receiver.run(&mut source, DEVICE, &worker_stop)
        })
        .context("unable to start receiver thread")?;

    let mut printed = 0u64;
    for evt in events.iter() {
        match evt {
            DscEvent::Message(msg) => {
                print_call(args, &msg);
                printed += 1;
                if args.count.map(|count| printed >= count).unwrap_or(false) {
                    info!("printed {} calls; stopping", printed);
                    stop.store(true, Ordering::Relaxed);
                    break;
                }
            }
            DscEvent::Status(status) => debug!("receiver {}", status),
            DscEvent::Error(err) => debug!("receiver reported: {}", err),
            DscEvent::Spectrum(_) => {}
        }
    }

    if stop.load(Ordering::Relaxed) {
        wait_for_exit(&events, grace)?;
    }

    match worker.join() {
        Ok(result) => result.context("receiver failed"),
        Err(_) => Err(anyhow!("receiver thread panicked")),
    }
}

/// Print a call with its time of receipt
fn print_call(args: &Args, msg: &DscMessage) {
    if args.quiet {
        return;
    }

    println!(
        "[{}] {}\n{}\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        msg.format(),
        msg
    );
}

/// Wait for the receiver to drop its event queues
///
/// The receiver drops its end of the queue when its thread
/// exits.
fn wait_for_exit(events: &Receiver<DscEvent>, grace: Duration) -> Result<(), anyhow::Error> {
    let deadline = Instant::now() + grace;
    loop {
        match events.recv_deadline(deadline) {
            Ok(_) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
            Err(RecvTimeoutError::Timeout) => {
                return Err(anyhow!(
                    "receiver did not stop within {:.1} s",
                    grace.as_secs_f32()
                ))
            }
        }
    }
}
