//! Command-line interface

pub mod output;
pub mod prompts;

pub use output::ConsoleReporter;
pub use prompts::InteractiveCollector;

use clap::Parser;
use std::ffi::OsString;

/// Guided, resumable Canvas LMS installer.
///
/// Takes no options: everything is asked interactively. Run with sudo on a
/// fresh Ubuntu 22.04 host; re-run after a failure to resume where it stopped.
#[derive(Debug, Parser, Clone)]
#[command(name = "canvas-installer")]
#[command(version)]
#[command(about = "Guided, resumable installer for Canvas LMS on Ubuntu 22.04", long_about = None)]
pub struct Cli {}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_accepted() {
        assert!(Cli::try_parse_from(["canvas-installer"]).is_ok());
        assert!(Cli::try_parse_from(["canvas-installer", "--resume"]).is_err());
        assert!(Cli::try_parse_from(["canvas-installer", "extra"]).is_err());
    }

    #[test]
    fn test_help_and_version() {
        let help = Cli::try_parse_from(["canvas-installer", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);

        let version = Cli::try_parse_from(["canvas-installer", "--version"]).unwrap_err();
        assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
