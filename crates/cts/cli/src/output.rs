//! Terminal output

use colored::*;
use cts_harness::{ProfileCatalog, WorkbenchDescriptor};
use cts_types::{LabResults, SupportLevel};
use std::fmt::Write;

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

fn level_icon(level: SupportLevel) -> ColoredString {
    match level {
        SupportLevel::FullSupport | SupportLevel::PartialSupport => "✓".green(),
        SupportLevel::NotConformant => "✗".red(),
        SupportLevel::NoSupport => "–".dimmed(),
        SupportLevel::Undetermined => "?".yellow(),
    }
}

/// Run summary: one line per workbench and profile, then totals and verdict.
pub fn format_summary(results: &LabResults) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        "Conformance run against".bold(),
        results.server.to_string().cyan()
    );
    let _ = writeln!(out, "{}", "=".repeat(70));

    for workbench in &results.workbenches {
        let (icon, state) = if workbench.conformant {
            ("✓".green(), "conformant".green())
        } else {
            ("✗".red(), "not conformant".red())
        };
        let _ = writeln!(
            out,
            "{} {} v{}: {}",
            icon,
            workbench.name.bold(),
            workbench.version,
            state
        );
        for profile in &workbench.profiles {
            let label = if profile.mandatory {
                format!("{} [mandatory]", profile.name)
            } else {
                profile.name.clone()
            };
            let _ = writeln!(
                out,
                "    {} {:<44} {}",
                level_icon(profile.level),
                label,
                profile.level
            );
        }
    }

    let totals = &results.totals;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total: {}  Passed: {}  Failed: {}  Skipped: {}  Not supported: {}  Unknown: {}",
        totals.total,
        totals.passed.to_string().green(),
        totals.failed.to_string().red(),
        totals.skipped.to_string().yellow(),
        totals.not_supported,
        totals.unknown
    );
    let verdict = if results.verdict {
        "CONFORMANT".green().bold()
    } else {
        "NON-CONFORMANT".red().bold()
    };
    let _ = writeln!(out, "Verdict: {}", verdict);
    out
}

pub fn print_summary(results: &LabResults) {
    print!("{}", format_summary(results));
}

/// Catalog listing for one workbench.
pub fn format_catalog(descriptor: &WorkbenchDescriptor, catalog: &ProfileCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} v{} ({})",
        descriptor.name.bold().cyan(),
        descriptor.version,
        descriptor.id
    );
    if !descriptor.documentation_url.is_empty() {
        let _ = writeln!(out, "  {}", descriptor.documentation_url.dimmed());
    }
    for profile in catalog.profiles() {
        let _ = writeln!(
            out,
            "  {} {}",
            profile.name.bold(),
            kind(profile.mandatory)
        );
        for requirement in &profile.requirements {
            let _ = writeln!(
                out,
                "    {} {} {}",
                requirement.id.yellow(),
                kind(requirement.mandatory),
                requirement.description
            );
            let _ = writeln!(out, "      tests: {}", requirement.test_cases.join(", "));
            if !requirement.depends_on.is_empty() {
                let _ = writeln!(
                    out,
                    "      after: {}",
                    requirement.depends_on.join(", ")
                );
            }
        }
    }
    out
}

fn kind(mandatory: bool) -> ColoredString {
    if mandatory {
        "[mandatory]".normal()
    } else {
        "[optional]".dimmed()
    }
}
