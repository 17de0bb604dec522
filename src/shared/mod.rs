//! Terminal layout helpers shared by the table printer.

pub mod table;
pub mod term;
pub mod width;
pub mod wrap;
