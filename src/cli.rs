use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Copy OpsRamp template customizations between PODs
#[derive(Parser)]
#[command(name = "opsramp-cloner", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone every template in the template names file from POD1 to POD2
    Run {
        /// File with one template name per line (overrides OPSRAMP_TEMPLATE_FILE)
        #[arg(long)]
        template_file: Option<PathBuf>,
    },

    /// Clone a single template from POD1 to POD2
    Clone {
        /// Global template name in both PODs
        name: String,
        /// Name for the new template in POD2
        #[arg(long)]
        new_name: Option<String>,
    },

    /// Acquire an access token and print its details
    Auth {
        #[arg(long, default_value = "1")]
        pod: u8,
    },

    /// List SDK integrations with their published version and native types
    Integrations {
        #[arg(long, default_value = "1")]
        pod: u8,
        /// Filter by app name, e.g. "alletra"
        #[arg(long)]
        app: Option<String>,
    },

    /// List global templates for every native type of an app's integrations
    Globals {
        #[arg(long, default_value = "1")]
        pod: u8,
        #[arg(long)]
        app: String,
        /// Also list the clones of each global template
        #[arg(long)]
        with_clones: bool,
    },

    /// List every clone of a global template
    Clones {
        #[arg(long, default_value = "1")]
        pod: u8,
        /// Global template name
        #[arg(long)]
        template: String,
    },

    /// Fetch and save the customization payload of a template's clone
    Customizations {
        #[arg(long, default_value = "1")]
        pod: u8,
        /// Global template name
        #[arg(long)]
        template: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_clone_parses_positional_name_and_rename() {
        let cli = Cli::try_parse_from([
            "opsramp-cloner",
            "clone",
            "Disk Health",
            "--new-name",
            "Disk Health Copy",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Clone { name, new_name }) => {
                assert_eq!(name, "Disk Health");
                assert_eq!(new_name.as_deref(), Some("Disk Health Copy"));
            }
            _ => panic!("expected clone command"),
        }
    }

    #[test]
    fn test_pod_defaults_to_source() {
        let cli = Cli::try_parse_from(["opsramp-cloner", "integrations", "--app", "alletra"]).unwrap();
        match cli.command {
            Some(Commands::Integrations { pod, app }) => {
                assert_eq!(pod, 1);
                assert_eq!(app.as_deref(), Some("alletra"));
            }
            _ => panic!("expected integrations command"),
        }
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["opsramp-cloner"]).unwrap();
        assert!(cli.command.is_none());
    }
}
