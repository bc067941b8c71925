// Colored terminal output helpers
use colored::Colorize;

pub fn print_success(msg: &str) {
    println!("{} {}", "OK".green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠️ ".yellow(), msg);
}

/// Dimmed secondary line, e.g. per-file progress
pub fn print_detail(msg: &str) {
    println!("  {}", msg.dimmed());
}
