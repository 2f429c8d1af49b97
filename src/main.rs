mod commands;
mod config;
mod diagnostics;
mod error;
mod export;
mod markup;
mod outline;
mod paths;
mod project;
mod rewrite;
mod roots;
mod scanner;
mod types;
mod watch;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "diaref", about = "Diagram references for doc comments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan documents and report references without a diagram
    Check {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export every diagram's companion image via the configured converter
    Export,
    /// Move a diagram to another folder, updating references
    Move {
        /// The diagram file, project-relative
        diagram: String,
        /// The destination folder, project-relative
        dest_folder: String,
        /// Print the plan without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List every image reference and its resolution
    Refs {
        /// Emit the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a diagram file, updating references
    Rename {
        /// The diagram file, project-relative
        diagram: String,
        /// The new file name, including the .uxf suffix
        new_name: String,
        /// Print the plan without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Rename a folder, updating references and moving the folder
    RenameFolder {
        /// The folder, project-relative
        folder: String,
        /// The new folder name (single segment)
        new_name: String,
        /// Print the plan without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Rename a package across every source root containing it
    RenamePackage {
        /// The current dot-separated package name
        old: String,
        /// The new dot-separated package name
        new: String,
        /// Print the plan without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage the ordered source-root list in .diaref.toml
    Root {
        #[command(subcommand)]
        command: RootCommands,
    },
    /// Re-run check whenever files under the source roots change
    Watch,
}

#[derive(Subcommand)]
enum RootCommands {
    /// Append a source root
    Add {
        /// The root folder, project-relative
        path: String,
    },
    /// List the configured source roots in resolution order
    List,
    /// Remove a source root
    Remove {
        /// The root folder as configured
        path: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { json } => return exit_of(commands::check(json)),
        Commands::Export => commands::run_export(),
        Commands::Move { diagram, dest_folder, dry_run } => {
            commands::move_diagram(&diagram, &dest_folder, dry_run)
        },
        Commands::Refs { json } => commands::refs(json),
        Commands::Rename { diagram, new_name, dry_run } => {
            commands::rename_diagram(&diagram, &new_name, dry_run)
        },
        Commands::RenameFolder { folder, new_name, dry_run } => {
            commands::rename_folder(&folder, &new_name, dry_run)
        },
        Commands::RenamePackage { old, new, dry_run } => {
            commands::rename_package(&old, &new, dry_run)
        },
        Commands::Root { command } => match command {
            RootCommands::Add { path } => roots::cmd_add(&path),
            RootCommands::List => roots::cmd_list(),
            RootCommands::Remove { path } => roots::cmd_remove(&path),
        },
        Commands::Watch => return exit_of(watch::run()),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}

/// Unify commands that carry their own exit code with error reporting.
fn exit_of(result: Result<ExitCode, error::Error>) -> ExitCode {
    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}
