//! Command-line interface.

use clap::{Parser, Subcommand};

use usquest_core::Frequency;

/// UsQuest backend: quest scheduling and push notifications.
#[derive(Parser, Debug)]
#[command(name = "usquest", version, about = "UsQuest backend server")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP API and the in-process schedulers (default).
    Serve,
    /// Run one quest cycle now and print its report as JSON.
    Trigger {
        /// Quest class: daily or weekly
        frequency: Frequency,
    },
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let args = CliArgs::try_parse_from(["usquest"]).unwrap();
        assert_eq!(args.command(), Command::Serve);
    }

    #[test]
    fn trigger_parses_frequency() {
        let args = CliArgs::try_parse_from(["usquest", "trigger", "Weekly"]).unwrap();
        assert_eq!(
            args.command(),
            Command::Trigger {
                frequency: Frequency::Weekly
            }
        );
    }

    #[test]
    fn trigger_rejects_unknown_frequency() {
        assert!(CliArgs::try_parse_from(["usquest", "trigger", "monthly"]).is_err());
    }
}
