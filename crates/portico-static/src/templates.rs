//! Template resolution and rendering.

use std::fs;
use std::path::{Component, Path, PathBuf};

use minijinja::{context, AutoEscape, Environment, ErrorKind};

use crate::context::RenderContext;
use crate::error::BuildError;

/// Ordered template search roots.
///
/// A logical name such as `pages/index.html` is looked up in each root in
/// turn and the first existing file wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRoots {
    roots: Vec<PathBuf>,
}

impl TemplateRoots {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Find the file backing a logical template name.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = logical_path(name)?;
        self.roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|candidate| candidate.is_file())
    }
}

/// Convert a `/`-separated template name into a relative path.
///
/// Absolute names and names that climb out of the root never resolve.
fn logical_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Renders templates against one shared context.
///
/// The environment and its globals are set up once in [`SiteRenderer::new`]
/// and reused for every page.
pub struct SiteRenderer {
    env: Environment<'static>,
    roots: TemplateRoots,
}

impl SiteRenderer {
    /// Create a renderer over `roots` with `context` registered as globals.
    pub fn new(roots: TemplateRoots, context: &RenderContext, autoescape: bool) -> Self {
        let mut env = Environment::new();

        let loader_roots = roots.clone();
        env.set_loader(move |name| match loader_roots.resolve(name) {
            Some(path) => fs::read_to_string(&path).map(Some).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {}", path.display()),
                )
                .with_source(e)
            }),
            None => Ok(None),
        });

        if !autoescape {
            env.set_auto_escape_callback(|_| AutoEscape::None);
        }

        for (name, value) in context.globals() {
            env.add_global(name, value);
        }

        Self { env, roots }
    }

    pub fn roots(&self) -> &TemplateRoots {
        &self.roots
    }

    /// Render a template to a string.
    pub fn render(&self, name: &str) -> Result<String, BuildError> {
        let tmpl = self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => BuildError::TemplateNotFound {
                name: name.to_string(),
                searched: self.roots.roots().to_vec(),
            },
            _ => template_error(name, e),
        })?;

        // A missing include or parent layout surfaces here as a render error.
        tmpl.render(context! {}).map_err(|e| template_error(name, e))
    }

    /// Render a template and write it to `output_root/output`.
    ///
    /// Parent directories are created as needed and an existing file is
    /// overwritten. Returns the path written.
    pub fn render_to(
        &self,
        name: &str,
        output_root: &Path,
        output: &Path,
    ) -> Result<PathBuf, BuildError> {
        let html = self.render(name)?;
        let path = output_root.join(output);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::write(parent, e))?;
        }
        fs::write(&path, html).map_err(|e| BuildError::write(&path, e))?;

        Ok(path)
    }
}

fn template_error(name: &str, err: minijinja::Error) -> BuildError {
    BuildError::Template {
        name: name.to_string(),
        message: err.to_string(),
    }
}
