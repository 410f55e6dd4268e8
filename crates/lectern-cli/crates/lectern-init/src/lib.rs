use anyhow::{bail, Context, Result};
use console::style;
use dialoguer::Input;
use lectern_context::config::Manifest;
use std::fs;
use std::path::{Path, PathBuf};

/// Run the interactive `lectern init` command.
pub fn run(name: Option<String>) -> Result<()> {
    println!();
    println!(
        "  {}",
        style("Lectern - Create a new presentation").bold().cyan()
    );
    println!();

    // Prompt for project name if not provided
    let project_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt(format!("  {}", style("Project name").bold()))
            .interact_text()
            .context("Failed to read project name")?,
    };

    // Validate project name
    if project_name.is_empty() {
        bail!("Project name cannot be empty");
    }
    if project_name
        .chars()
        .any(|c| !c.is_alphanumeric() && c != '-' && c != '_')
    {
        bail!("Project name can only contain alphanumeric characters, hyphens, and underscores");
    }

    let project_dir = PathBuf::from(&project_name);

    // Check if directory already exists
    if project_dir.exists() {
        bail!("Directory '{}' already exists", project_name);
    }

    // Scaffold the project
    println!();
    println!(
        "  {} {}",
        style("Scaffolding project in").dim(),
        style(format!("./{project_name}/")).dim().bold()
    );
    println!();

    let files =
        scaffold_project(&project_dir, &project_name).context("Failed to scaffold project")?;

    // Print created files
    for file in &files {
        println!("  {}  {}", style("+").green().bold(), style(file).dim());
    }

    // Done message
    println!();
    println!(
        "  {} Project created successfully.",
        style("Done.").green().bold()
    );
    println!();
    println!("  Now run:");
    println!();
    println!("    {}  {}", style("cd").cyan(), project_name);
    println!("    {}", style("lectern build").cyan());
    println!("    {}", style("lectern dev").cyan());
    println!();

    Ok(())
}

/// Scaffold a new Lectern project with starter files.
pub fn scaffold_project(project_dir: &Path, name: &str) -> Result<Vec<String>> {
    let mut created_files = Vec::new();

    // Create directory structure
    for dir in ["sections", "css"] {
        fs::create_dir_all(project_dir.join(dir))
            .with_context(|| format!("Failed to create directory: {dir}"))?;
    }

    // manifest.json
    let manifest = Manifest::new(name);
    fs::write(project_dir.join("manifest.json"), manifest.to_json_pretty()?)?;
    created_files.push("manifest.json".into());

    // sections/01_title.html
    fs::write(
        project_dir.join("sections/01_title.html"),
        include_str!("templates/sections/01_title.html"),
    )?;
    created_files.push("sections/01_title.html".into());

    // css/style.css
    fs::write(
        project_dir.join("css/style.css"),
        include_str!("templates/css/style.css"),
    )?;
    created_files.push("css/style.css".into());

    // .gitignore
    fs::write(project_dir.join(".gitignore"), "_build/\n")?;
    created_files.push(".gitignore".into());

    Ok(created_files)
}
