use anyhow::Result;
use lectern_context::project::Project;

pub fn run(standalone: bool) -> Result<()> {
    let project = Project::load_cwd()?;
    println!("Building '{}'...", project.manifest.project.title);

    let report = lectern_assembler::build(&project, standalone)?;

    println!("  Assembled {} section(s)", report.sections);
    if let Some(images) = report.images_embedded {
        println!("  Embedded {} image(s)", images);
    }

    let rel = report
        .output_path
        .strip_prefix(&project.root)
        .unwrap_or(&report.output_path);
    println!(
        "\nBuild complete: {} ({:.1} KB)",
        rel.display(),
        report.size_bytes as f64 / 1024.0
    );

    Ok(())
}
