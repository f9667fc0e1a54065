//! Command-line argument parsing for the folder and project tools
//!
//! Both tools accept the single-dash long flags of the original utilities
//! (`-get`, `-user=...`) as well as the usual double-dash form.

use crate::iam::SetMode;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args as ClapArgs, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Long flags that may be spelled with a single dash
const LONG_FLAGS: &[&str] = &[
    "get", "set", "overwrite", "user", "role", "folder", "org", "query", "all-pages", "config",
    "verbose", "quiet", "help", "version",
];

/// Flags whose value may be given as the following argument
const VALUE_FLAGS: &[&str] = &["user", "role", "folder", "org", "query", "config", "c"];

/// Flags shared by both tools
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Configuration file path (default: ~/.crm-tools/config.toml)
    #[arg(short, long, allow_hyphen_values = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

/// folder-iam - report and edit IAM bindings on an organization's folders
#[derive(Parser, Debug, Clone)]
#[command(name = "folder-iam")]
#[command(version)]
#[command(about = "Report and edit IAM policy bindings on Cloud Resource Manager folders", long_about = None)]
#[command(after_help = "Examples:\n  \
    folder-iam -get -org=\"organizations/27464139858\"\n  \
    folder-iam -set -user=\"user:test@gmail.com\" -role=\"roles/resourcemanager.folderEditor\" -folder=\"folders/345573146175\"")]
pub struct FolderIamArgs {
    /// Get folder IAM policies
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub get: bool,

    /// Set folder IAM policy
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub set: bool,

    /// Overwrite IAM policy
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub overwrite: bool,

    /// Member to grant
    #[arg(long, default_value = "", allow_hyphen_values = true, value_name = "user:[user]")]
    pub user: String,

    /// Role to grant
    #[arg(long, default_value = "", allow_hyphen_values = true, value_name = "roles/[role]")]
    pub role: String,

    /// Folder whose policy is set
    #[arg(long, default_value = "", allow_hyphen_values = true, value_name = "folders/[folder ID]")]
    pub folder: String,

    /// Organization whose folders are reported
    #[arg(long, default_value = "", allow_hyphen_values = true, value_name = "organizations/[org ID]")]
    pub org: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// project-search - group active projects by parent
#[derive(Parser, Debug, Clone)]
#[command(name = "project-search")]
#[command(version)]
#[command(about = "Search visible projects and group the active ones by parent", long_about = None)]
pub struct ProjectSearchArgs {
    /// Search query (e.g. "parent:folders/123")
    #[arg(long, allow_hyphen_values = true)]
    pub query: Option<String>,

    /// Fetch every result page instead of only the first
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub all_pages: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl CommonArgs {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl FolderIamArgs {
    /// Parse from argv, accepting single-dash long flags
    pub fn parse_flags<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_flag_style(args))
    }

    pub fn set_mode(&self) -> SetMode {
        if self.overwrite {
            SetMode::Overwrite
        } else {
            SetMode::Merge
        }
    }
}

impl ProjectSearchArgs {
    pub fn parse_flags<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_flag_style(args))
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default `tracing` filter when RUST_LOG is unset
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "crm_tools=info,warn",
            Verbosity::VeryVerbose => "crm_tools=debug,info",
        }
    }
}

/// Rewrite `-flag` / `-flag=value` to `--flag` / `--flag=value` for known long flags.
///
/// Booleans also take `-flag=true` / `-flag=false`. The argument after a
/// value flag given without `=` is its value and is never rewritten, so
/// `-user -get` sets the user to `-get`. The program name and everything
/// after a bare `--` are left alone, as are short flags such as `-v` or `-vv`.
pub fn normalize_flag_style<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    let mut expects_value = false;

    for (i, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if i == 0 || passthrough || expects_value {
            expects_value = false;
            out.push(arg);
            continue;
        }

        let rewritten = match arg.to_str() {
            Some("--") => {
                passthrough = true;
                None
            }
            Some(s) if s.starts_with('-') => {
                let body = s.trim_start_matches('-');
                let (name, has_value) = match body.split_once('=') {
                    Some((name, _)) => (name, true),
                    None => (body, false),
                };
                expects_value = !has_value && VALUE_FLAGS.contains(&name);

                (!s.starts_with("--") && LONG_FLAGS.contains(&name))
                    .then(|| OsString::from(format!("-{}", s)))
            }
            _ => None,
        };

        out.push(rewritten.unwrap_or(arg));
    }

    out
}
