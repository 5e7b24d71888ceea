// Colored terminal output for rankings and committee proposals.
//
// This module handles all terminal-specific formatting. main.rs builds the
// ranking and delegates display here.

use colored::Colorize;

use super::{format_section_score, truncate_chars};
use crate::committee::Committee;
use crate::error::{DegradedSection, RejectedProfile};
use crate::pipeline::RankingOutcome;
use crate::profile::Section;
use crate::scoring::ranker::ScoredProfile;

/// Display the ranked candidate list, highlighting the top `top_k`.
pub fn display_ranking(outcome: &RankingOutcome, top_k: usize) {
    if outcome.ranking.is_empty() {
        println!("No valid profiles to rank.");
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Ranking ({} profiles, {}) ===",
            outcome.ranking.len(),
            outcome.mode.as_str()
        )
        .bold()
    );
    println!();

    print!(
        "  {:>4}  {:<36} {:>6}",
        "Rank".dimmed(),
        "Name".dimmed(),
        "Score".dimmed()
    );
    for section in Section::ALL {
        print!("  {:>8}", section.label().dimmed());
    }
    println!();
    println!("  {}", "-".repeat(90).dimmed());

    for (i, scored) in outcome.ranking.iter().enumerate() {
        let name = truncate_chars(&scored.profile.name, 33);
        let line = format!("  {:>4}. {:<36} {:>6.4}", i + 1, name, scored.score);
        if i < top_k {
            print!("{}", line.bold());
        } else {
            print!("{line}");
        }
        for section in Section::ALL {
            print!("  {:>8}", format_section_score(scored.sections.get(section)));
        }
        if !scored.has_signal() {
            print!("  {}", "(no data)".dimmed());
        }
        println!();
    }
    println!();
}

/// Report records that were rejected before scoring.
pub fn display_rejected(rejected: &[RejectedProfile]) {
    if rejected.is_empty() {
        return;
    }

    println!(
        "{}",
        format!("=== Rejected records ({}) ===", rejected.len()).bold()
    );
    for r in rejected {
        let name = if r.name.trim().is_empty() {
            "<unnamed>".to_string()
        } else {
            r.name.clone()
        };
        println!("  {} #{} {}: {}", "!".yellow(), r.index, name, r.error);
    }
    println!();
}

/// Report sections that were scored as absent because embedding failed.
pub fn display_degraded(degraded: &[DegradedSection]) {
    if degraded.is_empty() {
        return;
    }

    println!(
        "{}",
        format!("=== Degraded sections ({}) ===", degraded.len()).bold()
    );
    for d in degraded {
        println!(
            "  {} {} / {}: {}",
            "~".yellow(),
            d.profile_id,
            d.section,
            truncate_chars(&d.reason, 100).dimmed()
        );
    }
    println!();
}

/// Display a committee proposal.
pub fn display_committee(committee: &Committee) {
    println!("{}", "=== Proposed committee ===".bold());
    println!("  Theme: {}", truncate_chars(&committee.title, 80));
    if let Some(advisor) = &committee.advisor {
        println!("  Advisor:    {}", member_line(advisor));
    }
    println!("  Titular:    {}", member_line(&committee.titular1));
    println!("  Titular:    {}", member_line(&committee.titular2));
    println!("  Substitute: {}", member_line(&committee.substitute));
    println!();
}

fn member_line(member: &ScoredProfile) -> String {
    let strongest = member
        .sections
        .strongest()
        .map(|(section, score)| format!(" (best: {} {:.2})", section.label(), score))
        .unwrap_or_default();
    format!(
        "{} [{}] {}{}",
        member.profile.name,
        member.profile.id.dimmed(),
        colorize_score(member.score),
        strongest.dimmed()
    )
}

/// Colorize a similarity score by strength.
fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("{score:.4}");
    match score {
        s if s >= 0.5 => text.green().bold(),
        s if s >= 0.2 => text.yellow(),
        _ => text.dimmed(),
    }
}
