//! Pipe command implementation.

use creek::RotatingWriter;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

/// Runs the pipe command.
///
/// Each line read from standard input becomes one write. A line the log
/// cannot take is printed to standard error instead, so nothing is dropped.
pub fn run(path: &Path, max_size: u64, recover: bool) -> Result<(), Box<dyn std::error::Error>> {
    if recover {
        creek::compress_pending(path)?;
    }

    let writer = RotatingWriter::new(path, max_size)?;
    info!(
        "Writing standard input to {:?} (rotating at {} MB)",
        path, max_size
    );

    let stdin = io::stdin();
    let mut lines = 0u64;
    let mut fallbacks = 0u64;
    for line in stdin.lock().split(b'\n') {
        let mut line = line?;
        line.push(b'\n');
        lines += 1;

        if let Err(err) = writer.write(&line) {
            fallbacks += 1;
            warn!(error = %err, "log write failed; writing to stderr");
            io::stderr().write_all(&line)?;
        }
    }

    writer.close()?;
    info!(lines, fallbacks, "Input closed");

    Ok(())
}
