//! Dump pacman package metadata as labelled, terminal-width-aware tables.

use std::env;
use std::error::Error;
use std::io::{self, Write};

use chrono::Local;
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod config;
pub mod formatting;
pub mod package;
pub mod shared;

use config::{DumpConfig, Mode};
use formatting::{FormatContext, format_date, humanize_size};
use package::{DbError, Package, PackageDb};
use shared::table::Table;

pub fn entry() -> Result<(), Box<dyn Error>> {
    let args = args::parse_args(env::args().skip(1).collect())?;
    if args.help {
        print_help();
        return Ok(());
    }
    init_logging(args.verbose);

    let config = DumpConfig::from_args(args)?;
    tracing::debug!(?config, "resolved configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&config, &mut out) {
        Err(err) if is_broken_pipe(err.as_ref()) => Ok(()),
        other => other,
    }
}

fn print_help() {
    println!(
        "\
alpm-dump: print package metadata as wrapped tables
Usage:
  alpm-dump [-Q|-S] [options] [package...]

Options:
  -Q, --query               Dump the local database (default)
  -S, --sync                Dump the sync repositories
  -b, --dbpath <dir>        Database root (default: /var/lib/pacman/)
  -r, --repo <name[,..]>    Sync repositories to read (repeatable)
  -w, --width <cols>        Wrap at <cols> columns; 0 disables wrapping
      --plain               Disable colors
      --debug-layout        Draw pads and continuation indents
  -v, --verbose             Debug logging on stderr
  -h, --help                Show this message

Environment:
  ALPM_DUMP_DBPATH          Database root
  ALPM_DUMP_REPOS           Comma-separated sync repositories
  ALPM_DUMP_COLUMNS         Wrap width override
  NO_COLOR                  Disable colors
  RUST_LOG                  Log filter (overrides --verbose)
"
    );
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Dump every selected package of the configured database(s) to `out`.
pub fn run<W: Write>(
    config: &DumpConfig,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let table = build_table(config.mode, config.columns);
    let ctx = FormatContext::new(config.use_color)
        .with_debug_layout(config.debug_layout);

    let local = match config.mode {
        Mode::Query => PackageDb::open_local(&config.dbpath)?,
        Mode::Sync => match PackageDb::open_local(&config.dbpath) {
            Ok(db) => db,
            Err(err) => {
                tracing::warn!("install state unavailable: {err}");
                PackageDb::default()
            }
        },
    };

    match config.mode {
        Mode::Query => dump_db(&table, &local, None, config, &ctx, out)?,
        Mode::Sync => {
            for repo in &config.repos {
                match PackageDb::open_sync(&config.dbpath, repo) {
                    Ok(db) => {
                        dump_db(&table, &db, Some(&local), config, &ctx, out)?
                    }
                    Err(DbError::NotFound { path }) => {
                        tracing::warn!(
                            repo = repo.as_str(),
                            "repository not found at {}",
                            path.display()
                        );
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn dump_db<W: Write>(
    table: &Table,
    db: &PackageDb,
    local: Option<&PackageDb>,
    config: &DumpConfig,
    ctx: &FormatContext,
    out: &mut W,
) -> io::Result<()> {
    for pkg in &db.packages {
        if !config.packages.is_empty() && !config.packages.contains(&pkg.name) {
            continue;
        }
        table.print_package(out, pkg, local, ctx)?;
    }
    Ok(())
}

/// Rows printed for each package in the given mode.
pub fn build_table(mode: Mode, cols: u16) -> Table {
    let mut table = Table::new(cols);
    if mode == Mode::Sync {
        table.text("Repository", |p| Some(p.db_name.clone()));
    }
    table
        .text("Name", |p| Some(p.name.clone()))
        .text("Version", |p| Some(p.version.clone()))
        .text("Description", |p| p.desc.clone())
        .text("Architecture", |p| p.arch.clone())
        .text("URL", |p| p.url.clone())
        .list("Licenses", |p| &p.licenses)
        .list("Groups", |p| &p.groups)
        .deps("Provides", |p| &p.provides)
        .deps("Depends On", |p| &p.depends)
        .deps("Optional Deps", |p| &p.optdepends)
        .deps("Conflicts With", |p| &p.conflicts)
        .deps("Replaces", |p| &p.replaces)
        .text("Installed Size", |p| p.isize.map(humanize_size))
        .text("Packager", |p| p.packager.clone())
        .text("Build Date", |p| local_date(p.build_date));
    match mode {
        Mode::Query => {
            table
                .text("Install Date", |p| local_date(p.install_date))
                .text("Install Reason", install_reason);
        }
        Mode::Sync => {
            table.install_state("Installed");
        }
    }
    table
}

fn local_date(secs: Option<i64>) -> Option<String> {
    secs.and_then(|s| format_date(s, &Local))
}

fn install_reason(pkg: &Package) -> Option<String> {
    pkg.reason.map(|r| r.describe().to_string())
}

fn is_broken_pipe(err: &(dyn Error + 'static)) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_table_query_rows() {
        let table = build_table(Mode::Query, 80);
        let titles: Vec<&str> = table.rows().iter().map(|r| r.title).collect();
        assert_eq!(titles.first(), Some(&"Name"));
        assert!(titles.contains(&"Install Reason"));
        assert!(!titles.contains(&"Repository"));
        assert!(!titles.contains(&"Installed"));
        assert_eq!(table.label_width(), "Conflicts With".len());
    }

    #[test]
    fn test_build_table_sync_rows() {
        let table = build_table(Mode::Sync, 80);
        let titles: Vec<&str> = table.rows().iter().map(|r| r.title).collect();
        assert_eq!(titles.first(), Some(&"Repository"));
        assert_eq!(titles.last(), Some(&"Installed"));
        assert!(!titles.contains(&"Install Date"));
    }

    #[test]
    fn test_broken_pipe_detection() {
        let err: Box<dyn Error> =
            Box::new(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(is_broken_pipe(err.as_ref()));
        let err: Box<dyn Error> = "other".into();
        assert!(!is_broken_pipe(err.as_ref()));
    }
}
