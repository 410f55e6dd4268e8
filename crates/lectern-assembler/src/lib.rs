mod assemble;
mod standalone;

use anyhow::{bail, Context, Result};
use lectern_context::project::Project;
use std::fs;
use std::path::PathBuf;

/// Summary of a finished build, for command-level reporting.
#[derive(Debug)]
pub struct BuildReport {
    /// The file the user should open: the standalone copy when one was
    /// written, otherwise the assembled page.
    pub output_path: PathBuf,
    pub sections: usize,
    pub images_embedded: Option<usize>,
    pub size_bytes: u64,
}

/// Assemble the project into `_build/<output_filename>`.
///
/// With `standalone`, additionally write a self-contained copy with the
/// stylesheet inlined and local images embedded as data URIs, suitable for
/// PDF export or sharing as a single file.
pub fn build(project: &Project, standalone: bool) -> Result<BuildReport> {
    let (html, sections) = assemble::assemble(project)?;

    let build_dir = project.build_dir();
    fs::create_dir_all(&build_dir)
        .with_context(|| format!("Failed to create {}", build_dir.display()))?;

    let output_path = project.entry_file();
    fs::write(&output_path, &html)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if !standalone {
        let size_bytes = fs::metadata(&output_path)?.len();
        return Ok(BuildReport {
            output_path,
            sections,
            images_embedded: None,
            size_bytes,
        });
    }

    let Some(standalone_filename) = project
        .manifest
        .build_config
        .standalone_filename
        .as_deref()
    else {
        bail!("manifest.json is missing build_config.standalone_filename, required for a standalone build");
    };

    let html = standalone::inline_stylesheet(&html, &project.stylesheet_path())?;
    let (html, images_embedded) = standalone::embed_images(&html, &build_dir)?;

    let standalone_path = build_dir.join(standalone_filename);
    fs::write(&standalone_path, &html)
        .with_context(|| format!("Failed to write {}", standalone_path.display()))?;
    let size_bytes = fs::metadata(&standalone_path)?.len();

    Ok(BuildReport {
        output_path: standalone_path,
        sections,
        images_embedded: Some(images_embedded),
        size_bytes,
    })
}
