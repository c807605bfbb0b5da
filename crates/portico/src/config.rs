//! `portico.toml` configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use portico_server::ServerConfig;
use portico_static::{BuildConfig, DemoProject, RenderJob};
use serde::Deserialize;

/// Configuration file structure (portico.toml).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    site: SiteSection,
    demos: Option<Vec<DemoSection>>,
    pages: Option<Vec<PageSection>>,
    #[serde(default)]
    serve: ServeSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SiteSection {
    output: PathBuf,
    data_dir: PathBuf,
    templates: PathBuf,
    static_dir: PathBuf,
    tags_text: String,
    lang: String,
    exclude: Vec<String>,
    autoescape: bool,
}

impl Default for SiteSection {
    fn default() -> Self {
        let build = BuildConfig::default();
        Self {
            output: build.output_dir,
            data_dir: build.data_dir,
            templates: build.templates_dir,
            static_dir: build.static_dir,
            tags_text: build.tags_text,
            lang: build.lang,
            exclude: build.exclude,
            autoescape: build.autoescape,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DemoSection {
    dir: PathBuf,
    /// Template root, defaults to `<dir>/templates`
    templates: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PageSection {
    template: String,
    output: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ServeSection {
    host: String,
    port: u16,
}

impl Default for ServeSection {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            host: server.host,
            port: server.port,
        }
    }
}

/// A loaded configuration together with the project root it applies to.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub file: ConfigFile,
}

impl Project {
    /// Load `config_path` if it exists, otherwise use defaults.
    ///
    /// The project root is the directory containing the config file.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(config_path: &Path) -> Result<Self> {
        let root = project_root(config_path);

        let file = if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let file: ConfigFile = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            tracing::info!("Loaded config from {}", config_path.display());
            file
        } else {
            tracing::debug!("No {} found, using defaults", config_path.display());
            ConfigFile::default()
        };

        Ok(Self { root, file })
    }

    /// Build settings for the static pipeline.
    pub fn build_config(&self) -> BuildConfig {
        let defaults = BuildConfig::default();
        let site = &self.file.site;

        let demos = match &self.file.demos {
            Some(demos) => demos
                .iter()
                .map(|d| {
                    let mut demo = DemoProject::new(&d.dir);
                    if let Some(templates) = &d.templates {
                        demo.templates = templates.clone();
                    }
                    demo
                })
                .collect(),
            None => defaults.demos,
        };

        let pages = match &self.file.pages {
            Some(pages) => pages
                .iter()
                .map(|p| RenderJob::new(&p.template, &p.output))
                .collect(),
            None => defaults.pages,
        };

        BuildConfig {
            root: self.root.clone(),
            output_dir: site.output.clone(),
            data_dir: site.data_dir.clone(),
            templates_dir: site.templates.clone(),
            static_dir: site.static_dir.clone(),
            demos,
            pages,
            exclude: site.exclude.clone(),
            tags_text: site.tags_text.clone(),
            lang: site.lang.clone(),
            autoescape: site.autoescape,
        }
    }

    /// Preview server settings, serving the build output.
    pub fn server_config(&self, port: Option<u16>, open: bool) -> ServerConfig {
        ServerConfig {
            dir: self.root.join(&self.file.site.output),
            host: self.file.serve.host.clone(),
            port: port.unwrap_or(self.file.serve.port),
            open,
        }
    }
}

fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
