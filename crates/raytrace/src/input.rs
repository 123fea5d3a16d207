use std::io::{self, BufRead};
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use progressive::ControlCommand;
use tracing::{debug, info, warn};

/// Reads control commands from standard input on a background thread.
///
/// The channel closes when stdin reaches end of file. The thread is left
/// detached: it may stay blocked on a read until the process exits.
pub fn spawn_stdin_reader() -> Result<Receiver<ControlCommand>> {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("raytrace-stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            forward_commands(stdin.lock(), &tx);
        })
        .context("failed to spawn stdin reader")?;
    info!("type pause/p, resume/r or stop/s and press enter to control the render");
    Ok(rx)
}

/// Parses one command per line until the input ends or the receiver is gone.
/// Blank lines are skipped and unknown commands are logged.
pub fn forward_commands<R: BufRead>(reader: R, commands: &Sender<ControlCommand>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to read from stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ControlCommand>() {
            Ok(command) => {
                debug!(%command, "control command received");
                if commands.send(command).is_err() {
                    break;
                }
            }
            Err(err) => warn!(input = %line.trim(), "{err}"),
        }
    }
    debug!("stdin reader finished");
}
