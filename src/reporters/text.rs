//! Text (terminal) reporter with colors and formatting

use super::RenderOptions;
use crate::models::{CheckDetail, CheckResult, DetailKind, RepoReport, INCONCLUSIVE_RESULT_SCORE};
use anyhow::Result;
use console::{style, StyledObject};
use std::fmt::Write;

fn styled_score(score: i32) -> StyledObject<String> {
    match score {
        INCONCLUSIVE_RESULT_SCORE => style("?".to_string()).dim(),
        8..=10 => style(score.to_string()).green().bold(),
        5..=7 => style(score.to_string()).yellow().bold(),
        _ => style(score.to_string()).red().bold(),
    }
}

fn styled_kind(kind: DetailKind) -> StyledObject<String> {
    match kind {
        DetailKind::Warn => style(kind.to_string()).red(),
        DetailKind::Info => style(kind.to_string()).cyan(),
        DetailKind::Debug => style(kind.to_string()).dim(),
    }
}

fn write_detail(out: &mut String, detail: &CheckDetail) -> std::fmt::Result {
    write!(out, "      {}: {}", styled_kind(detail.kind), detail.msg.text)?;
    if let Some(loc) = &detail.msg.location {
        if loc.offset > 0 {
            write!(out, " {}", style(format!("({}:{})", loc.path, loc.offset)).dim())?;
        } else {
            write!(out, " {}", style(format!("({})", loc.path)).dim())?;
        }
    }
    writeln!(out)?;
    if let Some(remediation) = &detail.msg.remediation {
        writeln!(out, "        {} {}", style("fix:").dim(), remediation)?;
    }
    Ok(())
}

fn write_check(out: &mut String, check: &CheckResult, width: usize, options: RenderOptions) -> std::fmt::Result {
    let score = styled_score(check.score);
    let padding = " ".repeat(2usize.saturating_sub(check.score.max(0).to_string().len()));
    writeln!(
        out,
        "  {padding}{score} / 10  {:<width$}  {}",
        style(&check.name).bold(),
        check.reason,
    )?;
    if options.show_details {
        for detail in &check.details {
            write_detail(out, detail)?;
        }
    }
    Ok(())
}

pub fn render(report: &RepoReport, options: RenderOptions) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "\n{}", style("trustcheck").bold())?;
    writeln!(out, "{}", style("──────────────────────────────────────").dim())?;
    writeln!(out, "Repository: {}", report.repo)?;
    writeln!(out, "Date:       {}", report.date.format("%Y-%m-%d %H:%M:%S UTC"))?;
    if report.overall_score < 0.0 {
        writeln!(out, "Aggregate score: {}\n", style("? / 10").dim())?;
    } else {
        writeln!(
            out,
            "Aggregate score: {} / 10\n",
            style(format!("{:.1}", report.overall_score)).bold()
        )?;
    }

    writeln!(out, "{}", style("CHECKS").bold())?;
    let width = report.checks.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for check in &report.checks {
        write_check(&mut out, check, width, options)?;
    }

    let inconclusive = report.checks.len() - report.conclusive_count();
    if inconclusive > 0 {
        writeln!(
            out,
            "\n{}",
            style(format!("{inconclusive} check(s) were inconclusive (?)")).dim()
        )?;
    }
    if !options.show_details && report.checks.iter().any(|c| !c.details.is_empty()) {
        writeln!(out, "{}", style("Run with --show-details for explanations").dim())?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_text_render_lists_checks() {
        console::set_colors_enabled(false);
        let out = render(&test_report(), RenderOptions::default()).expect("render text");
        assert!(out.contains("github.com/acme/widget"));
        assert!(out.contains("Aggregate score: 5.0 / 10"));
        assert!(out.contains("10 / 10  Binary-Artifacts"));
        assert!(out.contains(" ? / 10  Packaging"));
        assert!(!out.contains("untrusted code checkout"));
        assert!(out.contains("--show-details"));
    }

    #[test]
    fn test_text_render_details() {
        console::set_colors_enabled(false);
        let options = RenderOptions { show_details: true };
        let out = render(&test_report(), options).expect("render text");
        assert!(out.contains("Warn: untrusted code checkout"));
        assert!(out.contains("(.github/workflows/pr.yml:14)"));
    }
}
