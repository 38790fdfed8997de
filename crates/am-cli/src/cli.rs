//! Command-line argument parsing with clap.

use std::path::PathBuf;

use am_silences::FlagValues;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::CliError;

/// View and modify the current Alertmanager state.
#[derive(Parser, Debug, Clone)]
#[command(name = "amtool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file to load instead of the default locations.
    #[arg(long, global = true, env = "AMTOOL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Alertmanager to talk to.
    #[arg(
        long = "alertmanager.url",
        global = true,
        env = "AMTOOL_ALERTMANAGER_URL",
        value_name = "URL"
    )]
    pub alertmanager_url: Option<String>,

    /// Output formatter.
    #[arg(short, long, global = true, value_enum, env = "AMTOOL_OUTPUT")]
    pub output: Option<Format>,

    /// Verbose running information.
    #[arg(short, long, global = true, env = "AMTOOL_VERBOSE")]
    pub verbose: bool,

    /// Reject silences without a comment (normally set in the config file).
    #[arg(
        long,
        global = true,
        hide = true,
        env = "AMTOOL_COMMENT_REQUIRED",
        value_name = "BOOL"
    )]
    pub comment_required: Option<bool>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Flag values for configuration resolution. Unset flags stay `None`.
    #[must_use]
    pub fn flag_values(&self) -> FlagValues {
        let mut flags = FlagValues {
            alertmanager_url: self.alertmanager_url.clone(),
            comment_required: self.comment_required,
            verbose: self.verbose,
            ..FlagValues::default()
        };

        match &self.command {
            Commands::Silence {
                command: SilenceCommands::Add(args),
            } => {
                flags.author.clone_from(&args.author);
                flags.comment.clone_from(&args.comment);
                flags.expires.clone_from(&args.expires);
                flags.expire_on.clone_from(&args.expire_on);
            }
        }

        flags
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Bare values, one per line.
    #[default]
    Simple,
    /// Values with the matchers they belong to.
    Extended,
    /// One JSON document per line.
    Json,
}

impl Format {
    /// Parses a format name as written in the config file.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }

    /// Picks the format from the `--output` flag, then the config file, then the default.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if the config file names an unknown format.
    pub fn resolve(flag: Option<Self>, file: Option<&str>) -> Result<Self, CliError> {
        if let Some(format) = flag {
            return Ok(format);
        }
        match file {
            Some(name) => Self::from_name(name)
                .ok_or_else(|| CliError::Config(format!("unknown output format '{name}'"))),
            None => Ok(Self::default()),
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add, expire or view silences.
    Silence {
        /// Silence subcommand to execute.
        #[command(subcommand)]
        command: SilenceCommands,
    },
}

/// Silence subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SilenceCommands {
    /// Add a new alertmanager silence.
    ///
    /// amtool uses a simplified Prometheus syntax to represent silences. The
    /// non-option section of arguments constructs a list of "Matcher Groups"
    /// that will be used to create a number of silences. The following examples
    /// will attempt to show this behaviour in action:
    ///
    /// amtool silence add alertname=foo node=bar
    ///
    ///     This statement adds a silence that matches alerts with the
    ///     alertname=foo and node=bar label value pairs set.
    ///
    /// amtool silence add foo node=bar
    ///
    ///     If alertname is omitted and the first argument does not contain a '=',
    ///     it is assumed to be the value of the alertname pair.
    ///
    /// amtool silence add 'alertname=~foo.*'
    ///
    ///     As well as direct equality, regex matching is also supported.
    ///
    /// amtool silence add 'alertname=foo' 'node={bar,baz}'
    ///
    ///     Brace alternatives add one silence per value: here alertname=foo
    ///     with node=bar, and alertname=foo with node=baz.
    #[command(verbatim_doc_comment)]
    Add(SilenceAddArgs),
}

/// Arguments for `silence add`.
#[derive(Args, Debug, Clone)]
pub struct SilenceAddArgs {
    /// Username for CreatedBy field [default: current user].
    #[arg(short, long, env = "AMTOOL_AUTHOR")]
    pub author: Option<String>,

    /// Duration of silence [default: 1h].
    #[arg(short, long, env = "AMTOOL_EXPIRES")]
    pub expires: Option<String>,

    /// Expire at a certain time (RFC3339 format 2006-01-02T15:04:05Z07:00).
    #[arg(long, value_name = "TIMESTAMP")]
    pub expire_on: Option<String>,

    /// A comment to help describe the silence.
    #[arg(short, long, env = "AMTOOL_COMMENT")]
    pub comment: Option<String>,

    /// List of matchers.
    #[arg(value_name = "MATCHERS")]
    pub matchers: Vec<String>,
}
