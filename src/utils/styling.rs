//! Terminal styling utilities for step-by-step audit output

use console::{style, Emoji};

use crate::config::AuditConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SCALE: Emoji<'_, '_> = Emoji("⚖️  ", "");
pub static SPLIT: Emoji<'_, '_> = Emoji("✂️  ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("fairweigh").cyan().bold(),
        style("Bias detection and reweighing for credit data").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(config: &AuditConfig) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    let protected: Vec<&str> = config
        .schema
        .protected_attributes
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    let seed = config
        .split
        .seed
        .map_or_else(|| "random".to_string(), |s| s.to_string());

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:     {:<36}│",
        FOLDER,
        truncate_string(&config.input.display().to_string(), 35)
    );
    println!(
        "    │  {} Label:     {:<36}│",
        TARGET,
        truncate_string(&config.schema.label.column, 35)
    );
    println!(
        "    │  {} Protected: {:<36}│",
        SCALE,
        truncate_string(&protected.join(", "), 35)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Train fraction: {:<31}│",
        SPLIT,
        style(format!("{:.0}%", config.split.fraction * 100.0)).yellow()
    );
    println!(
        "    │  {} Seed:           {:<31}│",
        SPLIT,
        style(seed).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a mean difference, green when balanced and red when the
/// unprivileged group is disadvantaged
pub fn print_mean_difference(label: &str, value: f64) {
    let formatted = format!("{:.6}", value);
    let styled = if value.abs() < 1e-6 {
        style(formatted).green().bold()
    } else if value < 0.0 {
        style(formatted).red().bold()
    } else {
        style(formatted).yellow().bold()
    };
    println!("      {}: {}", label, styled);
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Fairness audit complete!").green().bold()
    );
    println!();
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_string("age", 10), "age");
    }

    #[test]
    fn test_truncate_keeps_tail() {
        let truncated = truncate_string("/data/credit/german.data", 12);
        assert_eq!(truncated, "...rman.data");
        assert_eq!(truncated.chars().count(), 12);
    }
}
