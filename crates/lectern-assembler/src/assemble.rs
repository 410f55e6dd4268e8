use anyhow::{Context, Result};
use lectern_context::project::Project;
use std::fs;

const RUNTIME_JS: &str = include_str!("templates/runtime.js");

/// Assemble the full page: head, enabled sections in manifest order, footer.
///
/// Section files that do not exist produce a warning and are skipped, so a
/// manifest can list sections before they are written. Returns the page and
/// the number of sections actually included.
pub(crate) fn assemble(project: &Project) -> Result<(String, usize)> {
    let mut parts = vec![html_head(project)];
    let mut included = 0;

    for section in project.active_sections() {
        let path = project.root.join(&section.file);
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parts.push(content);
            included += 1;
        } else {
            println!("  Warning: section file not found: {}", section.file);
        }
    }

    parts.push(html_footer());
    Ok((parts.join("\n"), included))
}

/// The built page lives in `_build/`, so the stylesheet href points one
/// directory up.
fn html_head(project: &Project) -> String {
    let info = &project.manifest.project;
    let stylesheet = &project.manifest.build_config.stylesheet;
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="../{stylesheet}">
</head>
<body>
    <div class="presentation-container">
"#,
        lang = info.lang,
        title = info.title,
    )
}

fn html_footer() -> String {
    format!("    </div>\n    <script>\n{RUNTIME_JS}    </script>\n</body>\n</html>")
}
