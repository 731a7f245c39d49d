//! Solbatch command-line tool
//!
//! Collects every Solidity source in a project, follows imports through
//! remappings and dependency packages, and compiles the lot in one solc run.

mod commands;
mod logger;
mod output;
mod search;
mod solc;
mod workspace;

use clap::{ArgAction, Parser, Subcommand};

use commands::compile::CompileOptions;
use commands::ProjectArgs;
use output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "solbatch")]
#[command(about = "Batch compiler for Solidity projects", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Color output: auto, always, never
    #[arg(long, global = true, value_name = "WHEN")]
    color: Option<String>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile all sources in the project
    Compile {
        #[command(flatten)]
        project: ProjectArgs,
        /// Compiler executable
        #[arg(long)]
        solc: Option<String>,
        /// Print the solc standard-JSON input and exit
        #[arg(long)]
        emit_input: bool,
    },

    /// List the sources a compile would include, in order
    Sources {
        #[command(flatten)]
        project: ProjectArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(logger::level_filter(cli.verbose, cli.quiet));
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    let failures = match cli.command {
        Commands::Compile {
            project,
            solc,
            emit_input,
        } => commands::compile::execute(
            CompileOptions {
                project,
                solc,
                emit_input,
            },
            &mut out,
        )?,
        Commands::Sources { project } => commands::sources::execute(project, &mut out)?,
    };

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
