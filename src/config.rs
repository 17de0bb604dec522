use std::error::Error;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::args::{DumpArgs, split_list};
use crate::shared::term::terminal_columns;

pub const DEFAULT_DBPATH: &str = "/var/lib/pacman/";

pub const DEFAULT_REPOS: &[&str] = &[
    "testing",
    "core",
    "extra",
    "community-testing",
    "community",
    "multilib-testing",
    "multilib",
];

/// Which database the dump walks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Installed packages from the local database.
    #[default]
    Query,
    /// Packages from the configured sync repositories.
    Sync,
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct DumpConfig {
    pub mode: Mode,
    pub dbpath: PathBuf,
    pub repos: Vec<String>,
    pub columns: u16,
    pub use_color: bool,
    pub debug_layout: bool,
    pub verbose: bool,
    pub packages: Vec<String>,
}

impl DumpConfig {
    /// Resolve flags against the process environment and the terminal.
    pub fn from_args(args: DumpArgs) -> Result<Self, Box<dyn Error>> {
        let is_tty = std::io::stdout().is_terminal();
        Self::resolve(args, |key| std::env::var(key).ok(), is_tty, terminal_columns)
    }

    /// Flags win over environment variables, which win over defaults. The
    /// terminal is probed only when no width override is given.
    pub fn resolve(
        args: DumpArgs,
        env: impl Fn(&str) -> Option<String>,
        is_tty: bool,
        probe_columns: impl FnOnce() -> u16,
    ) -> Result<Self, Box<dyn Error>> {
        let dbpath = args
            .dbpath
            .or_else(|| env("ALPM_DUMP_DBPATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DBPATH));

        let repos = if !args.repos.is_empty() {
            args.repos
        } else if let Some(raw) = env("ALPM_DUMP_REPOS") {
            split_list(&raw)
        } else {
            DEFAULT_REPOS.iter().map(|r| r.to_string()).collect()
        };

        let env_columns = match env("ALPM_DUMP_COLUMNS") {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
                format!("ALPM_DUMP_COLUMNS must be a column count, got `{raw}`")
            })?),
            None => None,
        };
        let columns = match args.width.or(env_columns) {
            Some(cols) => cols,
            None => probe_columns(),
        };

        let use_color = is_tty && !args.plain && env("NO_COLOR").is_none();

        Ok(Self {
            mode: args.mode,
            dbpath,
            repos,
            columns,
            use_color,
            debug_layout: args.debug_layout,
            verbose: args.verbose,
            packages: args.packages,
        })
    }
}
