// Markdown report generation.
//
// Writes the ranking, the proposed committee and any rejected records to a
// markdown file the student can attach to the committee request.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use super::format_section_score;
use crate::committee::Committee;
use crate::pipeline::RankingOutcome;
use crate::profile::{Query, Section};

/// Render the report as a markdown string.
pub fn render_report(
    query: &Query,
    outcome: &RankingOutcome,
    committee: Option<&Committee>,
    top_k: usize,
) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Committee recommendation\n");
    let _ = writeln!(md, "Generated: {}\n", Local::now().format("%Y-%m-%d %H:%M"));
    let _ = writeln!(md, "Scoring: {}\n", outcome.mode.as_str());
    let _ = writeln!(md, "## Theme\n\n{}\n", query.theme);
    if query.has_summary() {
        let _ = writeln!(md, "## Summary\n\n{}\n", query.summary.trim());
    }

    if let Some(c) = committee {
        let _ = writeln!(md, "## Proposed committee\n");
        if let Some(advisor) = &c.advisor {
            let _ = writeln!(md, "- Advisor: {} ({})", advisor.profile.name, advisor.profile.id);
        }
        for (seat, member) in ["Titular", "Titular", "Substitute"].iter().zip(c.members()) {
            let _ = writeln!(
                md,
                "- {}: {} ({}), score {:.4}",
                seat, member.profile.name, member.profile.id, member.score
            );
        }
        let _ = writeln!(md);
    }

    let _ = writeln!(md, "## Top {} candidates\n", top_k.min(outcome.ranking.len()));
    let header: Vec<&str> = Section::ALL.iter().map(|s| s.label()).collect();
    let _ = writeln!(md, "| # | Name | Id | Score | {} |", header.join(" | "));
    let _ = writeln!(md, "|---|------|----|-------|{}", "------|".repeat(Section::ALL.len()));
    for (i, scored) in outcome.top_k(top_k).iter().enumerate() {
        let sections: Vec<String> = Section::ALL
            .iter()
            .map(|&s| format_section_score(scored.sections.get(s)))
            .collect();
        let _ = writeln!(
            md,
            "| {} | {} | {} | {:.4} | {} |",
            i + 1,
            scored.profile.name,
            scored.profile.id,
            scored.score,
            sections.join(" | ")
        );
    }
    let _ = writeln!(md);

    if !outcome.rejected.is_empty() {
        let _ = writeln!(md, "## Rejected records\n");
        for r in &outcome.rejected {
            let _ = writeln!(md, "- #{} {}: {}", r.index, r.name, r.error);
        }
        let _ = writeln!(md);
    }

    md
}

/// Write the report to `path`, creating parent directories. Returns the path
/// written.
pub fn generate_report(
    query: &Query,
    outcome: &RankingOutcome,
    committee: Option<&Committee>,
    top_k: usize,
    path: &str,
) -> Result<String> {
    let md = render_report(query, outcome, committee, top_k);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, md).with_context(|| format!("Failed to write report to {path}"))?;

    Ok(path.to_string())
}
