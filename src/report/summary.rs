//! Fairness summary table for terminal output

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{AuditReport, GroupSummary, Label, Membership};

/// Mean differences closer to zero than this are shown as balanced
const BALANCED_TOLERANCE: f64 = 1e-6;

/// Before/after view of an audit
#[derive(Debug)]
pub struct FairnessSummary<'a> {
    report: &'a AuditReport,
}

fn difference_color(value: f64) -> Color {
    if value.abs() < BALANCED_TOLERANCE {
        Color::Green
    } else if value.abs() < 0.1 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn ratio_cell(ratio: Option<f64>) -> Cell {
    match ratio {
        Some(r) => Cell::new(format!("{:.4}", r)),
        None => Cell::new("undefined").fg(Color::DarkGrey),
    }
}

impl<'a> FairnessSummary<'a> {
    pub fn new(report: &'a AuditReport) -> Self {
        Self { report }
    }

    /// Group metrics before and after reweighing
    pub fn metrics_table(&self) -> Table {
        let before = &self.report.train_before;
        let after = &self.report.train_after;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Original").add_attribute(Attribute::Bold),
            Cell::new("Reweighed").add_attribute(Attribute::Bold),
        ]);

        let rate_row = |name: &str, pick: fn(&GroupSummary) -> f64| {
            vec![
                Cell::new(name),
                Cell::new(format!("{:.4}", pick(before))),
                Cell::new(format!("{:.4}", pick(after))),
            ]
        };

        table.add_row(rate_row("Privileged favorable rate", |s| s.privileged.base_rate));
        table.add_row(rate_row("Unprivileged favorable rate", |s| s.unprivileged.base_rate));
        table.add_row(rate_row("Privileged weight", |s| s.privileged.weight));
        table.add_row(rate_row("Unprivileged weight", |s| s.unprivileged.weight));
        table.add_row(rate_row("Total weight", |s| s.total_weight));

        table.add_row(vec![
            Cell::new("Disparate impact"),
            ratio_cell(before.disparate_impact),
            ratio_cell(after.disparate_impact),
        ]);

        table.add_row(vec![
            Cell::new("Mean difference").add_attribute(Attribute::Bold),
            Cell::new(format!("{:.6}", before.mean_difference))
                .fg(difference_color(before.mean_difference))
                .add_attribute(Attribute::Bold),
            Cell::new(format!("{:.6}", after.mean_difference))
                .fg(difference_color(after.mean_difference))
                .add_attribute(Attribute::Bold),
        ]);

        table
    }

    /// Observed mass and fitted factor of each group/label cell
    pub fn factors_table(&self) -> Table {
        let fitted = &self.report.reweighing;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Group").add_attribute(Attribute::Bold),
            Cell::new("Label").add_attribute(Attribute::Bold),
            Cell::new("Observed weight").add_attribute(Attribute::Bold),
            Cell::new("Factor").add_attribute(Attribute::Bold),
        ]);

        for membership in [Membership::Privileged, Membership::Unprivileged] {
            for label in [Label::Favorable, Label::Unfavorable] {
                let factor = fitted.factor(membership, label);
                table.add_row(vec![
                    Cell::new(membership),
                    Cell::new(label),
                    Cell::new(format!("{:.2}", fitted.masses().get(membership, label))),
                    Cell::new(format!("{:.4}", factor)).fg(if factor > 1.0 {
                        Color::Green
                    } else if factor < 1.0 {
                        Color::Red
                    } else {
                        Color::White
                    }),
                ]);
            }
        }

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("FAIRNESS SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!(
            "      Instances: {} total, {} train, {} test",
            self.report.total_instances,
            style(self.report.train_instances).cyan(),
            self.report.test_instances
        );
        match &self.report.test {
            Some(test) => println!(
                "      Test mean difference (unweighted): {}",
                style(format!("{:.6}", test.mean_difference)).yellow()
            ),
            None => println!(
                "      {}",
                style("Test partition lacks one of the groups; no summary").dim()
            ),
        }
        println!();

        for line in self.metrics_table().to_string().lines() {
            println!("    {}", line);
        }

        println!();
        println!(
            "    {} {}",
            style("⚖️").cyan(),
            style("REWEIGHING FACTORS").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.factors_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}
