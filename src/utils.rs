//! File system helpers.

use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Make sure `dir` exists and accepts new files.
///
/// Creates the directory if needed, then writes and removes a probe file so
/// permission problems surface before a long crawl rather than after it.
#[instrument(level = "info", skip_all, fields(path = %dir.display()))]
pub async fn ensure_writable_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir).await?;
    let probe = dir.join(".write_probe");
    fs::write(&probe, b"").await?;
    fs::remove_file(&probe).await?;
    info!("Output directory is writable");
    Ok(())
}
