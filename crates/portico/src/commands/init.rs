//! Initialize a new site.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing portico...");

    let created = scaffold(config_path, yes)?;

    if created.is_empty() {
        tracing::warn!("Nothing to do: all files already exist. Use --yes to overwrite.");
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'portico run' to build and preview the site.");

    Ok(())
}

/// Write the starter files next to `config_path`.
///
/// Existing files are left alone unless `overwrite` is set. Returns the
/// files written.
pub fn scaffold(config_path: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let files = [
        (config_path.to_path_buf(), DEFAULT_CONFIG),
        (root.join("data/site.json"), DEFAULT_SITE),
        (root.join("data/timeline.json"), DEFAULT_TIMELINE),
        (root.join("templates/base.html"), DEFAULT_BASE),
        (root.join("templates/pages/index.html"), DEFAULT_INDEX),
        (root.join("static/css/site.css"), DEFAULT_CSS),
    ];

    let mut created = Vec::new();
    for (path, content) in files {
        if path.exists() && !overwrite {
            tracing::debug!("Keeping existing {}", path.display());
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Created {}", path.display());
        created.push(path);
    }

    Ok(created)
}

const DEFAULT_CONFIG: &str = r#"# Portico configuration

# Demo sub-projects copied into the output, each with its own templates/
# directory searched after the main one. Add entries as
#   [[demos]]
#   dir = "ml-demo"
demos = []

[site]
# Output directory, recreated on every build
output = "dist"

# Directory holding site.json and timeline.json
data_dir = "data"

# Main template directory
templates = "templates"

# Static assets, copied to <output>/static
static_dir = "static"

# Exposed to templates as tags_text and lang
tags_text = "Python, Data Science, Portfolio"
lang = "en"

# Files never copied into the output
exclude = ["*.py"]

[[pages]]
template = "pages/index.html"
output = "index.html"

[serve]
host = "127.0.0.1"
port = 8000
"#;

const DEFAULT_SITE: &str = r#"{
  "title": "My Portfolio",
  "description": "Projects, experiments and notes.",
  "author": "Your Name",
  "links": {
    "github": "https://github.com/your-name",
    "email": "mailto:you@example.com"
  }
}
"#;

const DEFAULT_TIMELINE: &str = r#"{
  "entries": [
    {
      "year": 2024,
      "title": "Started this portfolio",
      "description": "First version of the site."
    }
  ]
}
"#;

const DEFAULT_BASE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="keywords" content="{{ tags_text }}">
  <title>{% block title %}{{ site.title }}{% endblock %}</title>
  <link rel="stylesheet" href="/static/css/site.css">
</head>
<body>
  <header>
    <h1>{{ site.title }}</h1>
    <p>{{ site.description }}</p>
  </header>
  <main>
    {% block content %}{% endblock %}
  </main>
  <footer>
    &copy; {{ now.year }} {{ site.author }}
    {% for name, url in site.links | items %}<a href="{{ url }}">{{ name }}</a> {% endfor %}
  </footer>
</body>
</html>
"##;

const DEFAULT_INDEX: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="timeline">
  <h2>Timeline</h2>
  <ol>
  {% for entry in timeline_data.entries %}
    <li>
      <span class="year">{{ entry.year }}</span>
      <strong>{{ entry.title }}</strong>
      <p>{{ entry.description }}</p>
    </li>
  {% endfor %}
  </ol>
</section>
{% endblock %}
"##;

const DEFAULT_CSS: &str = r#"body {
  font-family: system-ui, -apple-system, sans-serif;
  max-width: 800px;
  margin: 2rem auto;
  padding: 0 1rem;
  line-height: 1.6;
}

.timeline ol {
  list-style: none;
  padding: 0;
}

.timeline .year {
  font-weight: 700;
  margin-right: 0.5rem;
}
"#;
