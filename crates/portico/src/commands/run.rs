//! Build-then-serve command.

use std::path::Path;

use anyhow::Result;
use portico_server::PreviewServer;

use super::build::build_site;
use crate::config::Project;

/// Run the build, then serve its output until Ctrl+C.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let project = Project::load(config_path)?;

    build_site(project.build_config())?;
    tracing::info!("Generation complete!");

    let config = project.server_config(port, open);
    tracing::info!("Open your browser and go to http://localhost:{}", config.port);

    PreviewServer::new(config).start().await?;

    Ok(())
}
