//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use portico_static::{BuildConfig, BuildResult, StaticBuilder};

use crate::config::Project;

/// Build with `config`, logging progress and the final summary.
pub fn build_site(config: BuildConfig) -> Result<BuildResult> {
    tracing::info!("Starting static site generation...");

    let result = StaticBuilder::new(config).build()?;

    tracing::info!(
        "Built {} pages and copied {} files in {}ms",
        result.pages,
        result.copied_files,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(result)
}

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let project = Project::load(config_path)?;

    let mut config = project.build_config();
    if let Some(output) = output {
        config.output_dir = output;
    }

    build_site(config)?;

    tracing::info!("Static site generation complete!");

    Ok(())
}
