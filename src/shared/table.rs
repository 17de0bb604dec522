//! Table of labelled package fields and the per-record printer.
//! Labels are padded to the widest title; values wrap at the column after
//! the ` : ` separator.

use std::io::{self, Write};

use super::width::width_of;
use super::wrap::{Layout, LineCursor, pad_into, wrap_into};
use crate::formatting::FormatContext;
use crate::package::{Depend, Package, PackageDb};

/// Columns between two list items.
pub const LIST_PAD: usize = 2;

const SEPARATOR: &str = " : ";

pub type FetchText = fn(&Package) -> Option<String>;
pub type FetchList = fn(&Package) -> &[String];
pub type FetchDeps = fn(&Package) -> &[Depend];

/// How a row fetches and renders its value.
#[derive(Clone, Copy)]
pub enum FieldKind {
    Text(FetchText),
    List(FetchList),
    DepList(FetchDeps),
    /// "Yes (version)" or "No", looked up in the local database.
    InstallState,
}

pub struct Row {
    pub title: &'static str,
    pub kind: FieldKind,
}

pub struct Table {
    rows: Vec<Row>,
    label_width: usize,
    cols: usize,
}

impl Table {
    pub fn new(cols: u16) -> Self {
        Self { rows: Vec::new(), label_width: 0, cols: usize::from(cols) }
    }

    fn add(&mut self, title: &'static str, kind: FieldKind) -> &mut Self {
        self.label_width = self.label_width.max(width_of(title));
        self.rows.push(Row { title, kind });
        self
    }

    pub fn text(&mut self, title: &'static str, fetch: FetchText) -> &mut Self {
        self.add(title, FieldKind::Text(fetch))
    }

    pub fn list(&mut self, title: &'static str, fetch: FetchList) -> &mut Self {
        self.add(title, FieldKind::List(fetch))
    }

    pub fn deps(&mut self, title: &'static str, fetch: FetchDeps) -> &mut Self {
        self.add(title, FieldKind::DepList(fetch))
    }

    pub fn install_state(&mut self, title: &'static str) -> &mut Self {
        self.add(title, FieldKind::InstallState)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn label_width(&self) -> usize {
        self.label_width
    }

    /// Layout shared by every value: continuation lines start right after
    /// the label column and separator.
    pub fn layout(&self) -> Layout {
        Layout::new(self.label_width + SEPARATOR.len(), self.cols)
    }

    /// Print every row for `pkg` followed by a blank line. `local` is
    /// consulted only by install-state rows.
    pub fn print_package<W: Write>(
        &self,
        out: &mut W,
        pkg: &Package,
        local: Option<&PackageDb>,
        ctx: &FormatContext,
    ) -> io::Result<()> {
        let layout = self.layout();
        for row in &self.rows {
            let label = pad_field(
                &ctx.format_label(row.title),
                self.label_width,
                width_of(row.title),
            );
            write!(out, "{label}{SEPARATOR}")?;
            match row.kind {
                FieldKind::Text(fetch) => {
                    if let Some(value) = fetch(pkg) {
                        let mut cursor = LineCursor::new();
                        wrap_into(out, &value, layout, &mut cursor, ctx)?;
                    }
                }
                FieldKind::List(fetch) => {
                    print_list(out, fetch(pkg), layout, ctx)?;
                }
                FieldKind::DepList(fetch) => {
                    print_deplist(out, fetch(pkg), layout, ctx)?;
                }
                FieldKind::InstallState => {
                    let state = install_state(pkg, local);
                    let mut cursor = LineCursor::new();
                    wrap_into(out, &state, layout, &mut cursor, ctx)?;
                }
            }
            writeln!(out)?;
        }
        writeln!(out)
    }
}

/// Print list items packed onto shared lines, or `None` when empty.
pub fn print_list<W: Write, S: AsRef<str>>(
    out: &mut W,
    items: &[S],
    layout: Layout,
    ctx: &FormatContext,
) -> io::Result<()> {
    if items.is_empty() {
        return write!(out, "{}", ctx.format_none());
    }
    let mut cursor = LineCursor::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            pad_into(out, LIST_PAD, layout, &mut cursor, ctx)?;
        }
        wrap_into(out, item.as_ref(), layout, &mut cursor, ctx)?;
    }
    Ok(())
}

pub fn print_deplist<W: Write>(
    out: &mut W,
    deps: &[Depend],
    layout: Layout,
    ctx: &FormatContext,
) -> io::Result<()> {
    let rendered: Vec<String> = deps.iter().map(Depend::to_string).collect();
    print_list(out, &rendered, layout, ctx)
}

fn install_state(pkg: &Package, local: Option<&PackageDb>) -> String {
    match local.and_then(|db| db.find(&pkg.name)) {
        Some(installed) => format!("Yes ({})", installed.version),
        None => "No".to_string(),
    }
}

/// Right-pad a field based on visible length (ignoring ANSI codes).
pub fn pad_field(display: &str, target: usize, plain_len: usize) -> String {
    let mut out = display.to_string();
    let padding = target.saturating_sub(plain_len);
    out.push_str(&" ".repeat(padding));
    out
}
