//! Output of the aggregated data.
//!
//! This module handles writing and reporting the final record set:
//! - [`csv`] - CSV file writer
//! - [`terminal`] - banners and run summary on the terminal

mod csv;
mod terminal;

pub use self::csv::{write_csv, CSV_HEADER};
pub use terminal::{banner, format_field, print_summary};
