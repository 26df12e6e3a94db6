//! Compress command implementation.

use std::path::Path;
use tracing::info;

/// Runs the compress command.
///
/// Run this only while no process is writing to `path`; a live writer's own
/// compression jobs would race with these.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Compressing leftover backups of {:?}", path);

    let compressed = creek::compress_pending(path)?;
    if compressed.is_empty() {
        println!("No uncompressed backups found");
        return Ok(());
    }

    for file in &compressed {
        println!("  {}", file.display());
    }
    println!("✓ Compressed {} backup(s)", compressed.len());

    Ok(())
}
