//! Development server command.

use std::path::Path;

use anyhow::Result;
use portico_server::{FileWatcher, PreviewServer};
use portico_static::BuildConfig;

use super::build::build_site;
use crate::config::Project;

/// Build, serve, and rebuild on source changes.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let project = Project::load(config_path)?;
    let build_config = project.build_config();

    // A broken first build is reported but the watcher still starts
    if let Err(e) = build_site(build_config.clone()) {
        tracing::error!("Build failed: {:#}", e);
    }

    let (watcher, mut rx) =
        FileWatcher::new(&build_config.source_dirs(), &[build_config.output_path()])?;

    tokio::spawn(async move {
        // Keep watcher alive
        let _watcher = watcher;

        while let Some(event) = rx.recv().await {
            tracing::info!("{} changed: {}", event.kind(), event.path().display());

            // One rebuild covers everything queued so far
            while rx.try_recv().is_ok() {}

            rebuild(build_config.clone()).await;
        }
    });

    PreviewServer::new(project.server_config(port, open))
        .start()
        .await?;

    Ok(())
}

async fn rebuild(config: BuildConfig) {
    match tokio::task::spawn_blocking(move || build_site(config)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::error!("Rebuild failed: {:#}", e),
        Err(e) => tracing::error!("Rebuild task panicked: {}", e),
    }
}
