//! Human-readable renderings of a result record.

use cts_types::{LabResults, Status, WorkbenchResults};
use std::fmt::Write;

fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Failed => "✗",
        Status::Skipped => "○",
        Status::NotSupported => "–",
        Status::Unknown => "?",
    }
}

const RULE_TOP: &str = "╔════════════════════════════════════════════════════════════════════╗\n";
const RULE_MID: &str = "╠════════════════════════════════════════════════════════════════════╣\n";
const RULE_THIN: &str = "╟────────────────────────────────────────────────────────────────────╢\n";
const RULE_BOTTOM: &str = "╚════════════════════════════════════════════════════════════════════╝\n";

/// Boxed plain-text report.
pub fn render_text(results: &LabResults) -> String {
    let mut out = String::new();

    out.push_str(RULE_TOP);
    out.push_str("║  Repository Conformance Report\n");
    out.push_str(RULE_MID);
    let _ = writeln!(out, "║  Server:    {}", results.server);
    let _ = writeln!(out, "║  Run:       {}", results.run_id);
    let _ = writeln!(
        out,
        "║  Completed: {}",
        results.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "║  Harness:   {}", results.harness_version);

    for workbench in &results.workbenches {
        out.push_str(RULE_MID);
        write_workbench_text(&mut out, workbench);
    }

    out.push_str(RULE_MID);
    out.push_str("║  Summary:\n");
    let totals = &results.totals;
    let _ = writeln!(
        out,
        "║    Total: {:<5} Passed: {:<5} Failed: {:<5} Skipped: {:<5} Not supported: {}",
        totals.total, totals.passed, totals.failed, totals.skipped, totals.not_supported
    );
    if totals.unknown > 0 {
        let _ = writeln!(out, "║    Unknown: {}", totals.unknown);
    }
    out.push_str("║\n");
    if results.verdict {
        out.push_str("║  Result: ✓ CONFORMANT\n");
    } else {
        out.push_str("║  Result: ✗ NON-CONFORMANT\n");
    }
    out.push_str(RULE_BOTTOM);
    out
}

fn write_workbench_text(out: &mut String, workbench: &WorkbenchResults) {
    let _ = writeln!(
        out,
        "║  {} {} v{} ({})",
        if workbench.conformant { "✓" } else { "✗" },
        workbench.name,
        workbench.version,
        workbench.workbench_id
    );
    if !workbench.documentation_url.is_empty() {
        let _ = writeln!(out, "║    {}", workbench.documentation_url);
    }

    out.push_str(RULE_THIN);
    for profile in &workbench.profiles {
        let _ = writeln!(
            out,
            "║  {} {:<40} {:<10} {}",
            if profile.supported { "✓" } else { "✗" },
            profile.name,
            if profile.mandatory { "mandatory" } else { "optional" },
            profile.level
        );
        for requirement in &profile.requirements {
            let _ = writeln!(
                out,
                "║      {} {:<36} {}",
                status_icon(requirement.status),
                requirement.id,
                requirement.status
            );
        }
    }

    out.push_str(RULE_THIN);
    for test_case in &workbench.test_cases {
        let _ = writeln!(
            out,
            "║  {} {:<48} {:>8}ms",
            status_icon(test_case.status),
            test_case.code,
            test_case.duration_ms
        );
        for message in &test_case.messages {
            let _ = writeln!(out, "║      {}", message);
        }
    }
}

/// Markdown report suitable for attaching to a pull request or wiki page.
pub fn render_markdown(results: &LabResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Conformance report: {}\n", results.server.name);
    let _ = writeln!(out, "- Server URL: `{}`", results.server.root_url);
    let _ = writeln!(out, "- Run id: `{}`", results.run_id);
    let _ = writeln!(
        out,
        "- Completed: {}",
        results.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "- Verdict: **{}**\n",
        if results.verdict { "CONFORMANT" } else { "NON-CONFORMANT" }
    );

    let totals = &results.totals;
    out.push_str("| Total | Passed | Failed | Skipped | Not supported | Unknown |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} | {} |",
        totals.total,
        totals.passed,
        totals.failed,
        totals.skipped,
        totals.not_supported,
        totals.unknown
    );

    for workbench in &results.workbenches {
        let _ = writeln!(
            out,
            "\n## {} ({} v{})\n",
            workbench.name, workbench.workbench_id, workbench.version
        );
        let _ = writeln!(
            out,
            "Conformant: **{}**\n",
            if workbench.conformant { "yes" } else { "no" }
        );

        out.push_str("| Profile | Mandatory | Support |\n|---|---|---|\n");
        for profile in &workbench.profiles {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                profile.name,
                if profile.mandatory { "yes" } else { "no" },
                profile.level
            );
        }

        out.push_str("\n| Test case | Status | Messages |\n|---|---|---|\n");
        for test_case in &workbench.test_cases {
            let _ = writeln!(
                out,
                "| `{}` | {} | {} |",
                test_case.code,
                test_case.status,
                test_case.messages.join("; ").replace('|', "\\|")
            );
        }
    }
    out
}
