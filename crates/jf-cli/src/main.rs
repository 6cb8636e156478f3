//! `journeyflow`: command line access to JourneyFlow projects.
//!
//! Talks to the configured PostgREST store and generation service; map
//! files use the editor's JSON interchange format
//! (`{"steps":[...],"connections":[...]}`).

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "journeyflow.toml";

/// Customer journey maps from the command line
#[derive(Parser, Debug)]
#[command(name = "journeyflow", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draft a journey map from a description
    Generate {
        /// What the customer is trying to do
        prompt: String,
        #[arg(long)]
        persona: Option<String>,
        #[arg(long)]
        scenario: Option<String>,
        #[arg(long)]
        goals: Option<String>,
        /// Append the draft to this project and save it
        #[arg(long)]
        project: Option<String>,
        /// Write the map JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download a project's map as JSON
    Pull {
        project: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace a project's steps and connections with a map file
    Push { project: String, input: PathBuf },
    /// Render a map file as SVG or CSV
    Export {
        input: PathBuf,
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Svg)]
        format: ExportFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List, create, rename or delete projects
    #[command(subcommand)]
    Projects(ProjectsCommand),
}

#[derive(Subcommand, Debug)]
enum ProjectsCommand {
    List,
    Create {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    Rename {
        id: String,
        title: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Svg,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    });
    let config = jf_sync::SyncConfig::load(config_path.as_deref())?;

    commands::run(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_generate_with_context() {
        let cli = Cli::try_parse_from([
            "journeyflow",
            "generate",
            "Hotel booking",
            "--persona",
            "Business traveller",
            "-o",
            "out.json",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                prompt,
                persona,
                output,
                project,
                ..
            } => {
                assert_eq!(prompt, "Hotel booking");
                assert_eq!(persona.as_deref(), Some("Business traveller"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert_eq!(project, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_defaults_to_svg() {
        let cli = Cli::try_parse_from(["journeyflow", "export", "map.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Export {
                format: ExportFormat::Svg,
                ..
            }
        ));
        let cli = Cli::try_parse_from(["journeyflow", "export", "map.json", "-f", "csv"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Export {
                format: ExportFormat::Csv,
                ..
            }
        ));
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["journeyflow", "projects", "list", "--config", "jf.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("jf.toml")));
        assert!(matches!(cli.command, Command::Projects(ProjectsCommand::List)));
    }

    #[test]
    fn rename_needs_a_title() {
        assert!(Cli::try_parse_from(["journeyflow", "projects", "rename", "p-1"]).is_err());
    }
}
