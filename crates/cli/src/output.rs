//! Output formatting and terminal rendering

use colored::{ColoredString, Colorize};

use crate::api::{Category, TaskSnapshot};

pub struct OutputHandler {
    pub verbose: bool,
}

fn status_label(status: &str) -> ColoredString {
    let label = format!("{:<16}", status);
    match status {
        "DONE" => label.bright_green().bold(),
        "ERROR" => label.bright_red().bold(),
        "PENDING" => label.dimmed(),
        "GENERATING_IMAGE" => label.bright_magenta(),
        _ => label.bright_cyan(),
    }
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", format!("▶ {}", text).bright_yellow().bold());
        println!("{}", "─".repeat(60).dimmed());
    }

    pub fn print_success(&self, text: &str) {
        println!("{} {}", "✓".bright_green(), text.bright_white());
    }

    pub fn print_error(&self, text: &str) {
        println!("{} {}", "✗".bright_red(), text.bright_red());
    }

    pub fn print_warning(&self, text: &str) {
        println!("{} {}", "⚠".bright_yellow(), text.yellow());
    }

    pub fn print_info(&self, text: &str) {
        println!("{} {}", "ℹ".bright_blue(), text);
    }

    pub fn print_categories(&self, categories: &[Category]) {
        for category in categories {
            println!(
                "  {:<16} {}",
                category.api_value.bright_white(),
                category.name.dimmed()
            );
        }
    }

    /// One line per status change
    pub fn print_snapshot(&self, snapshot: &TaskSnapshot) {
        if snapshot.status == "PENDING" && !self.verbose {
            return;
        }
        let detail = match (&snapshot.error, &snapshot.result) {
            (Some(error), _) => error.red().to_string(),
            (None, Some(result)) => result.headline.bright_white().to_string(),
            (None, None) => String::new(),
        };
        println!(
            "  {} {:<16} {}",
            status_label(&snapshot.status),
            snapshot.category_name,
            detail
        );
    }
}
