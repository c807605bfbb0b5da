//! Preview server command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use portico_server::{PreviewServer, ServerError};

use crate::config::Project;

/// Run the serve command.
pub async fn run(
    config_path: &Path,
    port: Option<u16>,
    dir: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let project = Project::load(config_path)?;

    let mut config = project.server_config(port, open);
    if let Some(dir) = dir {
        config.dir = dir;
    }

    match PreviewServer::new(config).start().await {
        Err(ServerError::MissingDir(dir)) => {
            anyhow::bail!(
                "Directory not found: {}. Run 'portico build' first.",
                dir.display()
            )
        }
        other => Ok(other?),
    }
}
