use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const LOCAL_DB_NAME: &str = "local";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: missing %{field}% section", path.display())]
    MissingField { path: PathBuf, field: &'static str },
}

/// Version constraint operator of a dependency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepMod {
    #[default]
    Any,
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
}

impl DepMod {
    pub fn as_str(self) -> &'static str {
        match self {
            DepMod::Any => "",
            DepMod::Eq => "=",
            DepMod::Ge => ">=",
            DepMod::Le => "<=",
            DepMod::Gt => ">",
            DepMod::Lt => "<",
        }
    }
}

/// A dependency, provision, conflict or replacement entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Depend {
    pub name: String,
    pub version: Option<String>,
    pub modifier: DepMod,
    pub desc: Option<String>,
}

impl Depend {
    /// Parse `name[op version][: description]`.
    pub fn parse(raw: &str) -> Self {
        let (spec, desc) = match raw.split_once(": ") {
            Some((spec, desc)) => (spec, Some(desc.trim().to_string())),
            None => (raw, None),
        };
        let spec = spec.trim();

        // two-character operators first so ">=" is not read as ">"
        const OPS: &[(&str, DepMod)] = &[
            (">=", DepMod::Ge),
            ("<=", DepMod::Le),
            ("=", DepMod::Eq),
            (">", DepMod::Gt),
            ("<", DepMod::Lt),
        ];
        let split = spec
            .find(['<', '>', '='])
            .and_then(|idx| {
                let tail = &spec[idx..];
                OPS.iter()
                    .find(|(op, _)| tail.starts_with(op))
                    .map(|(op, m)| (idx, op.len(), *m))
            });

        let (name, version, modifier) = match split {
            Some((idx, op_len, m)) => (
                &spec[..idx],
                Some(spec[idx + op_len..].to_string()),
                m,
            ),
            None => (spec, None, DepMod::Any),
        };

        Self {
            name: name.to_string(),
            version: version.filter(|v| !v.is_empty()),
            modifier,
            desc: desc.filter(|d| !d.is_empty()),
        }
    }
}

impl fmt::Display for Depend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, "{}{}", self.modifier.as_str(), version)?;
        }
        if let Some(desc) = &self.desc {
            write!(f, ": {desc}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallReason {
    Explicit,
    Dependency,
}

impl InstallReason {
    pub fn describe(self) -> &'static str {
        match self {
            InstallReason::Explicit => "Explicitly installed",
            InstallReason::Dependency => {
                "Installed as a dependency for another package"
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Package {
    pub db_name: String,
    pub name: String,
    pub version: String,
    pub desc: Option<String>,
    pub url: Option<String>,
    pub arch: Option<String>,
    pub packager: Option<String>,
    pub build_date: Option<i64>,
    pub install_date: Option<i64>,
    pub isize: Option<u64>,
    pub reason: Option<InstallReason>,
    pub licenses: Vec<String>,
    pub groups: Vec<String>,
    pub depends: Vec<Depend>,
    pub optdepends: Vec<Depend>,
    pub provides: Vec<Depend>,
    pub conflicts: Vec<Depend>,
    pub replaces: Vec<Depend>,
}

impl Package {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }
}

/// Parse the text of one or more concatenated `desc`/`depends` entry files
/// into `pkg`. Unknown sections are ignored.
pub fn parse_desc(raw: &str, pkg: &mut Package) {
    let mut lines = raw.lines();
    while let Some(line) = lines.next() {
        let Some(key) = line
            .trim()
            .strip_prefix('%')
            .and_then(|l| l.strip_suffix('%'))
        else {
            continue;
        };

        let values: Vec<&str> =
            lines.by_ref().take_while(|l| !l.trim().is_empty()).collect();
        let first = values.first().map(|v| v.trim().to_string());

        match key {
            "NAME" => pkg.name = first.unwrap_or_default(),
            "VERSION" => pkg.version = first.unwrap_or_default(),
            "DESC" => pkg.desc = first,
            "URL" => pkg.url = first,
            "ARCH" => pkg.arch = first,
            "PACKAGER" => pkg.packager = first,
            "BUILDDATE" => pkg.build_date = parse_num(first),
            "INSTALLDATE" => pkg.install_date = parse_num(first),
            // local entries record SIZE, sync entries ISIZE
            "SIZE" | "ISIZE" => pkg.isize = parse_num(first),
            "REASON" => {
                pkg.reason = match first.as_deref() {
                    Some("1") => Some(InstallReason::Dependency),
                    Some(_) => Some(InstallReason::Explicit),
                    None => None,
                }
            }
            "LICENSE" => pkg.licenses = strings(&values),
            "GROUPS" => pkg.groups = strings(&values),
            "DEPENDS" => pkg.depends = depends(&values),
            "OPTDEPENDS" => pkg.optdepends = depends(&values),
            "PROVIDES" => pkg.provides = depends(&values),
            "CONFLICTS" => pkg.conflicts = depends(&values),
            "REPLACES" => pkg.replaces = depends(&values),
            _ => {}
        }
    }
}

fn parse_num<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}

fn depends(values: &[&str]) -> Vec<Depend> {
    values.iter().map(|v| Depend::parse(v)).collect()
}

/// Read one package entry directory (`desc` plus optional `depends`).
pub fn read_entry(dir: &Path, db_name: &str) -> Result<Package, DbError> {
    let mut pkg = Package { db_name: db_name.to_string(), ..Default::default() };

    let desc_path = dir.join("desc");
    let desc = read_lossy(&desc_path)?;
    parse_desc(&desc, &mut pkg);

    let depends_path = dir.join("depends");
    if depends_path.is_file() {
        parse_desc(&read_lossy(&depends_path)?, &mut pkg);
    }

    if pkg.name.is_empty() {
        return Err(DbError::MissingField { path: desc_path, field: "NAME" });
    }
    if pkg.version.is_empty() {
        return Err(DbError::MissingField {
            path: desc_path,
            field: "VERSION",
        });
    }
    Ok(pkg)
}

fn read_lossy(path: &Path) -> Result<String, DbError> {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| DbError::Io { path: path.to_path_buf(), source })
}

/// All packages of one database, sorted by name.
#[derive(Clone, Debug, Default)]
pub struct PackageDb {
    pub packages: Vec<Package>,
}

impl PackageDb {
    pub fn new(mut packages: Vec<Package>) -> Self {
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Self { packages }
    }

    /// The local (installed) database under `<dbpath>/local`.
    pub fn open_local(dbpath: &Path) -> Result<Self, DbError> {
        Self::open_dir(&dbpath.join(LOCAL_DB_NAME), LOCAL_DB_NAME)
    }

    /// An extracted sync repository under `<dbpath>/sync/<repo>`.
    pub fn open_sync(dbpath: &Path, repo: &str) -> Result<Self, DbError> {
        Self::open_dir(&dbpath.join("sync").join(repo), repo)
    }

    fn open_dir(root: &Path, name: &str) -> Result<Self, DbError> {
        if !root.is_dir() {
            return Err(DbError::NotFound { path: root.to_path_buf() });
        }
        let io_err = |source| DbError::Io { path: root.to_path_buf(), source };

        let mut packages = Vec::new();
        for entry in fs::read_dir(root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_dir() {
                continue;
            }
            match read_entry(&entry.path(), name) {
                Ok(pkg) => packages.push(pkg),
                Err(err) => tracing::warn!("skipping package entry: {err}"),
            }
        }
        tracing::debug!(db = name, count = packages.len(), "loaded database");
        Ok(Self::new(packages))
    }

    pub fn find(&self, name: &str) -> Option<&Package> {
        self.packages
            .binary_search_by(|p| p.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.packages[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DESC: &str = "%NAME%\nbash\n\n%VERSION%\n5.2.026-2\n\n\
        %BASE%\nbash\n\n\
        %DESC%\nThe GNU Bourne Again shell\n\n%ARCH%\nx86_64\n\n\
        %BUILDDATE%\n1707000000\n\n%SIZE%\n9463259\n\n%REASON%\n1\n\n\
        %LICENSE%\nGPL-3.0-or-later\n\n%DEPENDS%\nreadline>=7.0\nglibc\n\
        ncurses\n\n%OPTDEPENDS%\nbash-completion: for tab completion\n\n\
        %PROVIDES%\nsh\n\n";

    #[test]
    fn test_depend_parse_operators() {
        let d = Depend::parse("readline>=7.0");
        assert_eq!(d.name, "readline");
        assert_eq!(d.modifier, DepMod::Ge);
        assert_eq!(d.version.as_deref(), Some("7.0"));

        assert_eq!(Depend::parse("glibc<2.40").modifier, DepMod::Lt);
        assert_eq!(Depend::parse("sh=5.2").modifier, DepMod::Eq);
        assert_eq!(Depend::parse("zlib").modifier, DepMod::Any);
        assert_eq!(Depend::parse("zlib").version, None);
    }

    #[test]
    fn test_depend_display() {
        assert_eq!(Depend::parse("readline>=7.0").to_string(), "readline>=7.0");
        assert_eq!(
            Depend::parse("bash-completion: for tab completion").to_string(),
            "bash-completion: for tab completion"
        );
        assert_eq!(
            Depend::parse("python>=3: scripting").to_string(),
            "python>=3: scripting"
        );
    }

    #[test]
    fn test_parse_desc_sections() {
        let mut pkg = Package::default();
        parse_desc(DESC, &mut pkg);
        assert_eq!(pkg.name, "bash");
        assert_eq!(pkg.version, "5.2.026-2");
        assert_eq!(pkg.arch.as_deref(), Some("x86_64"));
        assert_eq!(pkg.build_date, Some(1707000000));
        assert_eq!(pkg.isize, Some(9463259));
        assert_eq!(pkg.reason, Some(InstallReason::Dependency));
        assert_eq!(pkg.licenses, vec!["GPL-3.0-or-later"]);
        assert_eq!(pkg.depends.len(), 3);
        assert_eq!(pkg.optdepends[0].desc.as_deref(), Some("for tab completion"));
        assert_eq!(pkg.provides[0].name, "sh");
        assert!(pkg.groups.is_empty());
        assert!(pkg.url.is_none());
    }

    #[test]
    fn test_read_entry_merges_depends_file() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("zsh-5.9-5");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("desc"), "%NAME%\nzsh\n\n%VERSION%\n5.9-5\n").unwrap();
        fs::write(dir.join("depends"), "%DEPENDS%\npcre\ngdbm\n").unwrap();

        let pkg = read_entry(&dir, "extra").unwrap();
        assert_eq!(pkg.db_name, "extra");
        assert_eq!(pkg.depends.len(), 2);
    }

    #[test]
    fn test_read_entry_requires_name() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("desc"), "%VERSION%\n1-1\n").unwrap();
        let err = read_entry(tmp.path(), "local").unwrap_err();
        assert!(matches!(err, DbError::MissingField { field: "NAME", .. }));
    }

    #[test]
    fn test_open_local_skips_broken_entries() {
        let tmp = tempdir().unwrap();
        let local = tmp.path().join("local");
        for (dir, body) in [
            ("zsh-5.9-5", "%NAME%\nzsh\n\n%VERSION%\n5.9-5\n"),
            ("bash-5.2-2", "%NAME%\nbash\n\n%VERSION%\n5.2-2\n"),
            ("broken", "%DESC%\nno name here\n"),
        ] {
            fs::create_dir_all(local.join(dir)).unwrap();
            fs::write(local.join(dir).join("desc"), body).unwrap();
        }
        fs::write(local.join("ALPM_DB_VERSION"), "9\n").unwrap();

        let db = PackageDb::open_local(tmp.path()).unwrap();
        let names: Vec<&str> =
            db.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["bash", "zsh"]);
        assert_eq!(db.find("zsh").map(|p| p.version.as_str()), Some("5.9-5"));
        assert!(db.find("fish").is_none());
    }

    #[test]
    fn test_open_missing_db() {
        let tmp = tempdir().unwrap();
        let err = PackageDb::open_sync(tmp.path(), "core").unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
