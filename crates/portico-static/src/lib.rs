//! Static site build pipeline for portico.
//!
//! Loads JSON site data, resets the output directory, copies static assets and
//! demo sub-projects into it, and renders Jinja templates against one shared
//! context.

pub mod assets;
pub mod builder;
pub mod context;
pub mod data;
pub mod error;
pub mod templates;

pub use assets::{CopyRoot, ExcludeSet, OutputPreparer};
pub use builder::{BuildConfig, BuildResult, DemoProject, RenderJob, StaticBuilder};
pub use context::{BuildTimestamp, RenderContext};
pub use data::{load_data, DataMap};
pub use error::BuildError;
pub use templates::{SiteRenderer, TemplateRoots};
