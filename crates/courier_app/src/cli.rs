use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::platform::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    version,
    about = "Send documents to a processing server and save the result"
)]
pub struct Cli {
    /// RON configuration file (default: ./courier.ron if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server root URL, e.g. http://localhost:8080/
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Directory that receives processed downloads
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Give up on an upload after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub upload_timeout: Option<u64>,

    /// Also write the log to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the operations the server offers
    Actions,
    /// Upload files with the given actions and save the processed result
    Process {
        /// Operation id to apply; repeat for several
        #[arg(short, long = "action", value_name = "ID", required = true)]
        actions: Vec<String>,

        /// Descend into subdirectories when expanding directories
        #[arg(short, long)]
        recursive: bool,

        /// Files or directories (directories contribute their *.pdf files)
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// Interactive session
    Shell,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server_url: self.server.clone(),
            output_dir: self.output_dir.clone(),
            upload_timeout_secs: self.upload_timeout,
            log_file: self.log_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_takes_repeated_actions() {
        let cli = Cli::parse_from([
            "courier",
            "--server",
            "http://pdf.local/",
            "process",
            "-a",
            "merge",
            "--action",
            "compress",
            "a.pdf",
            "scans/",
        ]);
        let Command::Process {
            actions,
            recursive,
            paths,
        } = &cli.command
        else {
            panic!("expected process");
        };
        assert_eq!(actions, &vec!["merge".to_string(), "compress".to_string()]);
        assert!(!recursive);
        assert_eq!(paths.len(), 2);
        assert_eq!(cli.overrides().server_url.as_deref(), Some("http://pdf.local/"));
    }

    #[test]
    fn process_requires_an_action() {
        assert!(Cli::try_parse_from(["courier", "process", "a.pdf"]).is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["courier", "shell", "--verbose", "--upload-timeout", "90"]);
        assert!(cli.verbose);
        assert_eq!(cli.overrides().upload_timeout_secs, Some(90));
    }
}
