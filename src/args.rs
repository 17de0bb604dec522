use std::error::Error;
use std::path::PathBuf;

use crate::config::Mode;

pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Extract a string value for a flag
    pub fn extract_value(
        &mut self,
        flag: &str,
    ) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name)
                .into()
        })
    }

    /// Extract a column count for a flag
    pub fn extract_columns(
        &mut self,
        flag: &str,
    ) -> Result<u16, Box<dyn Error>> {
        let raw = self.extract_value(flag)?;
        raw.parse::<u16>().map_err(|_| {
            format!("{flag} expects a column count, got `{raw}`").into()
        })
    }

    /// Get next argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }

    /// Collect remaining args
    pub fn collect_remaining(self) -> Vec<String> {
        self.iter.collect()
    }
}

/// Flags as given on the command line; unset values fall back to the
/// environment and defaults in [`crate::config::DumpConfig`].
#[derive(Default, Debug)]
pub struct DumpArgs {
    pub mode: Mode,
    pub dbpath: Option<PathBuf>,
    pub repos: Vec<String>,
    pub width: Option<u16>,
    pub plain: bool,
    pub debug_layout: bool,
    pub verbose: bool,
    pub help: bool,
    pub packages: Vec<String>,
}

pub fn parse_args(args: Vec<String>) -> Result<DumpArgs, Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "alpm-dump");
    let mut parsed = DumpArgs::default();

    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-S" | "--sync" => parsed.mode = Mode::Sync,
            "-Q" | "--query" => parsed.mode = Mode::Query,
            "-b" | "--dbpath" => {
                parsed.dbpath = Some(PathBuf::from(parser.extract_value(&arg)?));
            }
            "-r" | "--repo" => {
                let repo = parser.extract_value(&arg)?;
                parsed.repos.extend(split_list(&repo));
            }
            "-w" | "--width" => {
                parsed.width = Some(parser.extract_columns(&arg)?);
            }
            "--plain" => parsed.plain = true,
            "--debug-layout" => parsed.debug_layout = true,
            "-v" | "--verbose" => parsed.verbose = true,
            "-h" | "--help" => parsed.help = true,
            "--" => {
                parsed.packages.extend(parser.collect_remaining());
                break;
            }
            other => {
                if other.starts_with('-') {
                    return Err(format!("Unknown flag: {other}").into());
                }
                parsed.packages.push(other.to_string());
            }
        }
    }
    Ok(parsed)
}

/// Split a comma-separated list, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
