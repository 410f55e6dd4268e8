use crate::config::{Manifest, SectionEntry};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A loaded Lectern project: the parsed manifest plus the directory it was
/// found in, with accessors for the conventional project paths.
#[derive(Clone)]
pub struct Project {
    pub root: PathBuf,
    pub manifest: Manifest,
}

impl Project {
    /// Load a Lectern project from the given directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join("manifest.json");
        if !manifest_path.exists() {
            bail!("No manifest.json found. Are you in a Lectern project directory?");
        }
        let raw =
            fs::read_to_string(&manifest_path).context("Failed to read manifest.json")?;
        let manifest: Manifest =
            serde_json::from_str(&raw).context("Failed to parse manifest.json")?;
        Ok(Self {
            root: dir.to_path_buf(),
            manifest,
        })
    }

    /// Load a Lectern project from the current working directory.
    pub fn load_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::load(&cwd)
    }

    /// Sections that take part in a build: enabled ones, sorted by `order`.
    pub fn active_sections(&self) -> Vec<&SectionEntry> {
        let mut active: Vec<&SectionEntry> = self
            .manifest
            .sections
            .iter()
            .filter(|s| s.enabled)
            .collect();
        active.sort_by_key(|s| s.order);
        active
    }

    pub fn sections_dir(&self) -> PathBuf {
        self.root.join("sections")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join("_build")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    /// The stylesheet referenced by the built page, resolved from the root.
    pub fn stylesheet_path(&self) -> PathBuf {
        self.root.join(&self.manifest.build_config.stylesheet)
    }

    /// The built page the dev server serves at `/`.
    pub fn entry_file(&self) -> PathBuf {
        self.build_dir()
            .join(&self.manifest.build_config.output_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildConfig, ProjectInfo};

    fn project_with_sections(sections: Vec<SectionEntry>) -> Project {
        Project {
            root: PathBuf::from("/tmp/demo"),
            manifest: Manifest {
                project: ProjectInfo {
                    title: "Demo".into(),
                    lang: "en".into(),
                },
                sections,
                build_config: BuildConfig {
                    output_filename: "demo.html".into(),
                    standalone_filename: None,
                    stylesheet: "css/style.css".into(),
                    build_command: None,
                },
            },
        }
    }

    fn entry(file: &str, order: u32, enabled: bool) -> SectionEntry {
        SectionEntry {
            file: file.into(),
            order,
            enabled,
        }
    }

    #[test]
    fn test_active_sections_sorted_by_order() {
        let project = project_with_sections(vec![
            entry("sections/c.html", 3, true),
            entry("sections/a.html", 1, true),
            entry("sections/b.html", 2, true),
        ]);
        let files: Vec<&str> = project
            .active_sections()
            .iter()
            .map(|s| s.file.as_str())
            .collect();
        assert_eq!(
            files,
            vec!["sections/a.html", "sections/b.html", "sections/c.html"]
        );
    }

    #[test]
    fn test_active_sections_skip_disabled() {
        let project = project_with_sections(vec![
            entry("sections/a.html", 1, true),
            entry("sections/b.html", 2, false),
        ]);
        let active = project.active_sections();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].file, "sections/a.html");
    }

    #[test]
    fn test_entry_file_under_build_dir() {
        let project = project_with_sections(vec![]);
        assert_eq!(
            project.entry_file(),
            PathBuf::from("/tmp/demo/_build/demo.html")
        );
    }
}
