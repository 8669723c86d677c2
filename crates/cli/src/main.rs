use anyhow::{anyhow, Result};
use cell_gather::commands::{
    facts_command, gather_command, history_command, init_settings_command, GatherTarget,
};
use clap::{Parser, Subcommand};
use tracing::Level;

/// Rebuild the minimal program behind a notebook cell from its execution history.
///
/// This CLI is a thin replay host around `gather-core` (exposed in code as
/// `gather_core`). All substantive logic lives in the library.
#[derive(Parser, Debug)]
#[command(
    name = "cell-gather",
    version,
    about = "Gather the code a notebook cell depends on",
    long_about = None
)]
struct Cli {
    /// Emit debug logging on stderr.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write `.gather/settings.json` under the given root.
    InitSettings {
        /// Session root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Cell boundary marker for gathered programs (default `# %%`).
        #[arg(long)]
        marker: Option<String>,

        /// Write the settings with gathering turned off.
        #[arg(long, default_value_t = false)]
        disabled: bool,
    },

    /// Replay a session transcript and print the program a target depends on.
    ///
    /// Prints nothing when the target was never logged.
    Gather {
        /// Session root directory holding `.gather/settings.json`.
        #[arg(long, default_value = ".")]
        root: String,

        /// Session transcript (.json, .yaml or .yml).
        #[arg(long)]
        session: String,

        /// Gather for the latest execution of this cell id.
        #[arg(long, conflicts_with = "event", required_unless_present = "event")]
        cell: Option<String>,

        /// Gather for this specific execution event id.
        #[arg(long)]
        event: Option<String>,

        /// Override the configured cell marker.
        #[arg(long)]
        marker: Option<String>,

        /// Write the program to this file instead of stdout.
        #[arg(long)]
        output: Option<String>,
    },

    /// List the executions logged from a session transcript.
    History {
        #[arg(long)]
        session: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the def/use facts derived for each logged execution.
    Facts {
        #[arg(long)]
        session: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the gathered program; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match cli.command {
        Command::InitSettings { root, marker, disabled } => {
            init_settings_command(&root, marker, disabled)?
        }
        Command::Gather { root, session, cell, event, marker, output } => {
            let target = match (cell, event) {
                (Some(cell), _) => GatherTarget::Cell(cell),
                (None, Some(event)) => GatherTarget::Event(event),
                (None, None) => return Err(anyhow!("Either --cell or --event is required")),
            };
            gather_command(&root, &session, target, marker, output.as_deref())?
        }
        Command::History { session, json } => history_command(&session, json)?,
        Command::Facts { session, json } => facts_command(&session, json)?,
    }

    Ok(())
}
