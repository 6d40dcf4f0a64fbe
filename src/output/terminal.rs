//! Terminal output utilities.
//!
//! Section banners and the end-of-run summary table.

use crate::RunSummary;
use colored::Colorize;

/// Print a boxed section title.
pub fn banner(title: &str) {
    let width = title.len() + 10;
    println!("\n{}", "=".repeat(width));
    println!("||{}||", format!("{title:^w$}", w = width - 4).bold());
    println!("{}", "=".repeat(width));
}

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// Print per-country source counts and the final totals.
pub fn print_summary(summary: &RunSummary) {
    banner("Results");
    println!(
        "{},{},{}",
        format_field("country", 9),
        format_field("ipv4_in", 10),
        format_field("ipv6_in", 10)
    );
    for country in &summary.countries {
        println!(
            "{},{},{}",
            format_field(&country.iso_code, 9),
            format_field(country.ipv4, 10),
            format_field(country.ipv6, 10)
        );
    }
    println!(
        "--- Total unique IPv4 entries: {}",
        summary.ipv4_total.to_string().green()
    );
    println!(
        "--- Total unique IPv6 entries: {}",
        summary.ipv6_total.to_string().green()
    );
    println!("Saved CSV to {}", summary.output.display().to_string().on_blue());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("IR", 6), "  \"IR\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "\"long_value\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }
}
