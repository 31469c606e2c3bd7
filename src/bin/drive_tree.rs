//! Print the folder tree below a Drive folder as JSON.
//!
//! ```text
//! DRIVE_ACCESS_TOKEN=ya29... drive-tree <folder-id> [max-depth]
//! ```

use anyhow::{bail, Context, Result};
use bridge_desktop::ReqwestHttpClient;
use core_drive::DriveFacade;
use core_runtime::config::DriveConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use provider_google_drive::GoogleDriveClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(LoggingConfig::default().with_format(LogFormat::Compact))?;

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| "root".to_string());
    let max_depth: u32 = match args.next() {
        Some(depth) => depth.parse().context("max-depth must be a number")?,
        None => 2,
    };

    let token = std::env::var("DRIVE_ACCESS_TOKEN")
        .context("DRIVE_ACCESS_TOKEN must hold an OAuth access token")?;

    let http_client = Arc::new(ReqwestHttpClient::new()?);
    let client = Arc::new(GoogleDriveClient::new(http_client, token));
    let drive = DriveFacade::new(client, DriveConfig::builder().build()?);

    let Some(tree) = drive.folder_tree(&root, max_depth).await else {
        bail!("could not list folder {root}");
    };

    tracing::info!(folders = tree.len(), "Folder tree loaded");
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}
