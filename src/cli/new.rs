//! Scaffold a new feature directory.

use std::path::Path;

use anyhow::{Result, bail};

use crate::config::{BuildMode, GlobalConfig, Paths};
use crate::log;
use crate::utils::fs::write_file;

pub fn run(root: &Path, id: &str) -> Result<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        bail!("feature id must be non-empty and kebab-case, got \"{id}\"");
    }

    let paths = Paths::new(root, BuildMode::Dev);
    let global = GlobalConfig::load(&paths.global_config());
    let tool_dir = paths.features_dir().join(id);
    if tool_dir.exists() {
        bail!("feature \"{id}\" already exists at {}", tool_dir.display());
    }

    log!("new"; "creating new tool: {id}...");

    write_file(&tool_dir.join("tool.yaml"), tool_yaml(id))?;
    write_file(&tool_dir.join("index.jinja"), index_jinja(id))?;
    write_file(&tool_dir.join("style.css"), STYLE_CSS)?;
    write_file(&tool_dir.join("script.js"), script_js(id))?;
    for locale in &global.build.locales {
        write_file(
            &tool_dir.join("locales").join(format!("{locale}.yaml")),
            locale_yaml(id),
        )?;
    }

    log!("new"; "tool \"{id}\" created successfully");
    log!("new"; "edit it at: src/features/{id}");
    Ok(())
}

fn tool_yaml(id: &str) -> String {
    format!(
        "id: {id}\n\
         category: utilities\n\
         icon: box\n\
         title_key: {id}.title\n\
         desc_key: {id}.desc\n\
         status: active\n\
         link: /{id}/\n\
         mode: standard\n\
         meta:\n\
         \x20 version: 1.0.0\n"
    )
}

fn index_jinja(id: &str) -> String {
    format!(
        r#"<section class="tool-page-container">
  <div class="tool-header">
    <h1><i data-lucide="box"></i> {{{{ t('{id}.title') }}}}</h1>
    <p>{{{{ t('{id}.desc') }}}}</p>
    <div class="tool-meta">
      <span class="version-badge" id="open-changelog">v{{{{ tool_config.meta.version }}}}</span>
    </div>
  </div>

  <div class="card tool-card">
    <div class="input-group">
      <label>Sample Input</label>
      <input type="text" id="sample-input" placeholder="Type something...">
    </div>
    <button id="action-btn" class="btn-primary">Execute</button>
    <div id="result-area" class="result-box muted">
      Result will appear here...
    </div>
  </div>
</section>

<script src="{{{{ tool_config._assets.js }}}}"></script>
<link rel="stylesheet" href="{{{{ tool_config._assets.css }}}}">
"#
    )
}

const STYLE_CSS: &str = r#".tool-card {
  max-width: 600px;
  margin: 2rem auto;
  padding: 2rem;
}
.result-box {
  margin-top: 1.5rem;
  padding: 1rem;
  background: var(--bg-hover);
  border-radius: 8px;
  border: 1px solid var(--border-color);
  min-height: 50px;
}
"#;

fn script_js(id: &str) -> String {
    format!(
        r#"document.addEventListener('DOMContentLoaded', () => {{
  const input = document.getElementById('sample-input');
  const btn = document.getElementById('action-btn');
  const result = document.getElementById('result-area');

  btn.addEventListener('click', () => {{
    const val = input.value || 'No input';
    result.textContent = 'You entered: ' + val;
    result.classList.remove('muted');
    console.log('[{id}] Action executed');
  }});
}});
"#
    )
}

fn locale_yaml(id: &str) -> String {
    let mut title: Vec<char> = id.replace('-', " ").chars().collect();
    if let Some(first) = title.first_mut() {
        *first = first.to_ascii_uppercase();
    }
    let title: String = title.into_iter().collect();
    format!(
        "{id}:\n\
         \x20 title: \"{title}\"\n\
         \x20 desc: \"Professional utility tool for {id}.\"\n"
    )
}
