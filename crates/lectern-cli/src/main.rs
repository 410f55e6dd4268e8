mod cmd;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lectern",
    version,
    about = "Lectern - manifest-driven HTML presentation toolchain"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new Lectern project
    Init {
        /// Project name (optional, will prompt if not provided)
        name: Option<String>,
    },
    /// Start the dev server with live reload
    Dev,
    /// Assemble the enabled sections into _build/
    Build {
        /// Also write a self-contained page with inlined CSS and embedded images
        #[arg(long)]
        standalone: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(name),
        Commands::Dev => cmd::dev::run().await,
        Commands::Build { standalone } => cmd::build::run(standalone),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
