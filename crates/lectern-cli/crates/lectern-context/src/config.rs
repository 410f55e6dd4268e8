use serde::{Deserialize, Serialize};

/// Represents the `manifest.json` project configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectInfo,
    #[serde(default)]
    pub sections: Vec<SectionEntry>,
    pub build_config: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub title: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

/// One section fragment listed in the manifest. Disabled sections stay in the
/// manifest but are skipped at assembly time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionEntry {
    pub file: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub output_filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standalone_filename: Option<String>,
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
    /// Command the dev server runs on change. Defaults to `lectern build`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
}

fn default_lang() -> String {
    "en".into()
}

fn default_enabled() -> bool {
    true
}

fn default_stylesheet() -> String {
    "css/style.css".into()
}

impl Manifest {
    pub fn new(title: &str) -> Self {
        Self {
            project: ProjectInfo {
                title: title.into(),
                lang: default_lang(),
            },
            sections: vec![SectionEntry {
                file: "sections/01_title.html".into(),
                order: 1,
                enabled: true,
            }],
            build_config: BuildConfig {
                output_filename: format!("{title}.html"),
                standalone_filename: Some(format!("{title}_standalone.html")),
                stylesheet: default_stylesheet(),
                build_command: None,
            },
        }
    }

    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
