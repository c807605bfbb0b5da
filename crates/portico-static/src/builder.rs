//! Static site builder.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::assets::{CopyRoot, ExcludeSet, OutputPreparer};
use crate::context::{BuildTimestamp, RenderContext};
use crate::data::load_data;
use crate::error::BuildError;
use crate::templates::{SiteRenderer, TemplateRoots};

/// An embedded demo sub-project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoProject {
    /// Demo directory, copied to `<output>/<dir>`
    pub dir: PathBuf,

    /// Template root searched after the primary one (defaults to `<dir>/templates`)
    pub templates: PathBuf,
}

impl DemoProject {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let templates = dir.join("templates");
        Self { dir, templates }
    }
}

/// One page to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Logical template name, e.g. `pages/index.html`
    pub template: String,

    /// Output file, relative to the output directory
    pub output: PathBuf,
}

impl RenderJob {
    pub fn new(template: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output: output.into(),
        }
    }
}

/// Configuration for building a site.
///
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project root
    pub root: PathBuf,

    /// Output directory, wiped on every build
    pub output_dir: PathBuf,

    /// Directory holding `site.json` and `timeline.json`
    pub data_dir: PathBuf,

    /// Primary template root
    pub templates_dir: PathBuf,

    /// Static assets, copied to `<output>/static`
    pub static_dir: PathBuf,

    /// Demo sub-projects, in template search order
    pub demos: Vec<DemoProject>,

    /// Pages to render, in order
    pub pages: Vec<RenderJob>,

    /// File name globs never copied into the output
    pub exclude: Vec<String>,

    /// Tag line exposed as `tags_text`
    pub tags_text: String,

    /// Language code exposed as `lang`
    pub lang: String,

    /// Escape HTML in `.html` templates
    pub autoescape: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from("dist"),
            data_dir: PathBuf::from("data"),
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
            demos: vec![DemoProject::new("ml-demo"), DemoProject::new("kpi-demo")],
            pages: vec![
                RenderJob::new("pages/index.html", "index.html"),
                RenderJob::new("pages/ml-demo-page.html", "ml-demo/index.html"),
                RenderJob::new("pages/kpi-demo.html", "kpi-demo/index.html"),
            ],
            exclude: vec!["*.py".to_string()],
            tags_text: "Python, Data Science, Portfolio".to_string(),
            lang: "en".to_string(),
            autoescape: false,
        }
    }
}

impl BuildConfig {
    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// The output directory, resolved.
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Template search roots: primary first, then each demo.
    pub fn template_roots(&self) -> TemplateRoots {
        TemplateRoots::new(
            std::iter::once(self.resolve(&self.templates_dir))
                .chain(self.demos.iter().map(|d| self.resolve(&d.templates))),
        )
    }

    /// Source trees copied into the output, with their destinations.
    pub fn copy_roots(&self) -> Vec<CopyRoot> {
        std::iter::once(CopyRoot {
            source: self.resolve(&self.static_dir),
            dest: PathBuf::from("static"),
        })
        .chain(self.demos.iter().map(|d| CopyRoot {
            source: self.resolve(&d.dir),
            dest: d.dir.file_name().map(PathBuf::from).unwrap_or_else(|| d.dir.clone()),
        }))
        .collect()
    }

    /// Every source directory a rebuild depends on.
    pub fn source_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            self.resolve(&self.data_dir),
            self.resolve(&self.templates_dir),
            self.resolve(&self.static_dir),
        ];
        dirs.extend(self.demos.iter().map(|d| self.resolve(&d.dir)));
        dirs
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages rendered
    pub pages: usize,

    /// Number of files copied from static and demo trees
    pub copied_files: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the site.
    ///
    /// Runs each phase in order and stops at the first error.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let output_dir = self.config.output_path();

        // Compile exclusions before anything is deleted
        let exclude = ExcludeSet::new(&self.config.exclude)?;
        let preparer = OutputPreparer::new(&output_dir, &exclude);

        preparer.reset(&self.config.root)?;
        let copied_files = self.copy_sources(&preparer)?;

        tracing::info!("Setting up templates...");
        let renderer = self.renderer()?;

        let mut pages = 0;
        for job in &self.config.pages {
            renderer.render_to(&job.template, &output_dir, &job.output)?;
            tracing::info!("Generated {}", job.output.display());
            pages += 1;
        }

        Ok(BuildResult {
            pages,
            copied_files,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir,
        })
    }

    /// Load site data and set up the template environment.
    pub fn renderer(&self) -> Result<SiteRenderer, BuildError> {
        let context = self.load_context()?;
        Ok(SiteRenderer::new(
            self.config.template_roots(),
            &context,
            self.config.autoescape,
        ))
    }

    fn load_context(&self) -> Result<RenderContext, BuildError> {
        let data_dir = self.config.resolve(&self.config.data_dir);

        Ok(RenderContext {
            site: load_data(&data_dir.join("site.json"))?,
            timeline_data: load_data(&data_dir.join("timeline.json"))?,
            tags_text: self.config.tags_text.clone(),
            lang: self.config.lang.clone(),
            now: BuildTimestamp::now(),
        })
    }

    fn copy_sources(&self, preparer: &OutputPreparer<'_>) -> Result<usize, BuildError> {
        let mut total = 0;

        for root in self.config.copy_roots() {
            if let Some(count) = preparer.copy_tree(&root.source, &root.dest)? {
                tracing::info!(
                    "Copied {} files from {}",
                    count,
                    root.source.display()
                );
                total += count;
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::{tempdir, TempDir};
    use walkdir::WalkDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    /// A project laid out like the default configuration expects.
    fn project() -> TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();

        write(root, "data/site.json", r#"{"title": "Jane Doe", "github": "janedoe"}"#);
        write(
            root,
            "data/timeline.json",
            r#"{"entries": [{"year": 2023, "title": "Analyst"}, {"year": 2025, "title": "Engineer"}]}"#,
        );
        write(
            root,
            "templates/base.html",
            r#"<html lang="{{ lang }}"><title>{{ site.title }}</title>{% block body %}{% endblock %}<footer>{{ now.year }}</footer></html>"#,
        );
        write(
            root,
            "templates/pages/index.html",
            r#"{% extends "base.html" %}{% block body %}{% for e in timeline_data.entries %}<li>{{ e.year }} {{ e.title }}</li>{% endfor %}<p>{{ tags_text }}</p>{% endblock %}"#,
        );
        write(
            root,
            "ml-demo/templates/pages/ml-demo-page.html",
            r#"{% extends "base.html" %}{% block body %}ml{% endblock %}"#,
        );
        write(
            root,
            "kpi-demo/templates/pages/kpi-demo.html",
            r#"{% extends "base.html" %}{% block body %}kpi{% endblock %}"#,
        );
        write(root, "static/js/main.js", "console.log('hi');");
        write(root, "static/build_assets.py", "print('never copied')");
        write(root, "ml-demo/static/js/ml-demo.js", "// ml");
        write(root, "kpi-demo/static/js/kpi-demo.js", "// kpi");
        write(root, "kpi-demo/generate_data.py", "print('never copied')");

        temp
    }

    fn builder(root: &Path) -> StaticBuilder {
        StaticBuilder::new(BuildConfig {
            root: root.to_path_buf(),
            ..Default::default()
        })
    }

    fn output_files(out: &Path) -> BTreeSet<String> {
        WalkDir::new(out)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(out)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn builds_expected_layout() {
        let temp = project();

        let result = builder(temp.path()).build().unwrap();

        assert_eq!(result.pages, 3);
        let expected: BTreeSet<String> = [
            "index.html",
            "static/js/main.js",
            "ml-demo/index.html",
            "ml-demo/static/js/ml-demo.js",
            "ml-demo/templates/pages/ml-demo-page.html",
            "kpi-demo/index.html",
            "kpi-demo/static/js/kpi-demo.js",
            "kpi-demo/templates/pages/kpi-demo.html",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(output_files(&result.output_dir), expected);
        assert_eq!(result.copied_files, 5);
    }

    #[test]
    fn renders_shared_context() {
        let temp = project();

        let result = builder(temp.path()).build().unwrap();
        let index = fs::read_to_string(result.output_dir.join("index.html")).unwrap();
        let kpi = fs::read_to_string(result.output_dir.join("kpi-demo/index.html")).unwrap();

        assert!(index.starts_with(r#"<html lang="en"><title>Jane Doe</title>"#));
        assert!(index.contains("<li>2023 Analyst</li><li>2025 Engineer</li>"));
        assert!(index.contains("<p>Python, Data Science, Portfolio</p>"));
        assert!(kpi.contains("<title>Jane Doe</title>kpi"));
    }

    #[test]
    fn rebuild_is_stable_apart_from_timestamp() {
        let temp = project();
        let builder = builder(temp.path());
        // Template without the timestamp so whole files can be compared
        write(
            temp.path(),
            "templates/base.html",
            r#"<title>{{ site.title }}</title>{% block body %}{% endblock %}"#,
        );

        let first = builder.build().unwrap();
        let snapshot: Vec<(String, Vec<u8>)> = output_files(&first.output_dir)
            .into_iter()
            .map(|f| {
                let bytes = fs::read(first.output_dir.join(&f)).unwrap();
                (f, bytes)
            })
            .collect();

        let second = builder.build().unwrap();
        for (file, bytes) in snapshot {
            assert_eq!(fs::read(second.output_dir.join(&file)).unwrap(), bytes, "{file}");
        }
    }

    #[test]
    fn mappings_iterate_in_file_order() {
        let temp = project();
        write(
            temp.path(),
            "data/site.json",
            r#"{"links": {"github": "gh", "linkedin": "li", "email": "mail"}}"#,
        );
        write(
            temp.path(),
            "templates/pages/index.html",
            "{% for name, url in site.links | items %}{{ name }},{% endfor %}",
        );

        let result = builder(temp.path()).build().unwrap();
        let index = fs::read_to_string(result.output_dir.join("index.html")).unwrap();

        assert_eq!(index, "github,linkedin,email,");
    }

    #[test]
    fn missing_site_data_renders_empty_site() {
        let temp = project();
        fs::remove_file(temp.path().join("data/site.json")).unwrap();

        let result = builder(temp.path()).build().unwrap();
        let index = fs::read_to_string(result.output_dir.join("index.html")).unwrap();

        assert!(index.starts_with(r#"<html lang="en"><title></title>"#));
    }

    #[test]
    fn malformed_data_aborts() {
        let temp = project();
        write(temp.path(), "data/timeline.json", "{ broken");

        let result = builder(temp.path()).build();

        assert!(matches!(result, Err(BuildError::Parse { .. })));
    }

    #[test]
    fn missing_template_aborts_build() {
        let temp = project();
        let mut config = BuildConfig {
            root: temp.path().to_path_buf(),
            ..Default::default()
        };
        config.pages.insert(1, RenderJob::new("pages/absent.html", "absent.html"));

        let result = StaticBuilder::new(config).build();

        match result {
            Err(BuildError::TemplateNotFound { name, searched }) => {
                assert_eq!(name, "pages/absent.html");
                assert_eq!(searched.len(), 3);
            }
            other => panic!("expected TemplateNotFound, got {other:?}"),
        }
        // Jobs after the failing one never ran
        assert!(!temp.path().join("dist/kpi-demo/index.html").exists());
    }

    #[test]
    fn reset_removes_unrelated_files() {
        let temp = project();
        write(temp.path(), "dist/leftover.txt", "old");

        let result = builder(temp.path()).build().unwrap();

        assert!(!result.output_dir.join("leftover.txt").exists());
    }

    #[test]
    fn build_script_never_copied() {
        let temp = project();

        let result = builder(temp.path()).build().unwrap();

        assert!(result.output_dir.join("static/js/main.js").exists());
        assert!(!result.output_dir.join("static/build_assets.py").exists());
        assert!(!result.output_dir.join("kpi-demo/generate_data.py").exists());
    }

    #[test]
    fn missing_source_roots_are_skipped() {
        let temp = project();
        fs::remove_dir_all(temp.path().join("static")).unwrap();

        let result = builder(temp.path()).build().unwrap();

        assert!(!result.output_dir.join("static").exists());
        assert_eq!(result.pages, 3);
    }

    #[test]
    fn template_roots_follow_demo_order() {
        let config = BuildConfig::default();

        assert_eq!(
            config.template_roots().roots(),
            [
                PathBuf::from("./templates"),
                PathBuf::from("./ml-demo/templates"),
                PathBuf::from("./kpi-demo/templates"),
            ]
        );
    }
}
