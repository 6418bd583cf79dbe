use std::io::Write;

use citecheck_core::{CitationDatabase, ClassificationResult, DatabaseConfig, Report, Status};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

#[derive(Serialize)]
struct SourceReport<'a> {
    source: &'a str,
    #[serde(flatten)]
    report: &'a Report,
}

/// Write reports as pretty JSON. A single report is written bare; several
/// are written as an array tagged with their source.
pub fn write_json(w: &mut dyn Write, reports: &[(String, Report)]) -> std::io::Result<()> {
    if let [(_, report)] = reports {
        serde_json::to_writer_pretty(&mut *w, report)?;
    } else {
        let tagged: Vec<SourceReport<'_>> = reports
            .iter()
            .map(|(source, report)| SourceReport { source, report })
            .collect();
        serde_json::to_writer_pretty(&mut *w, &tagged)?;
    }
    writeln!(w)
}

/// Print the human-readable verification report.
pub fn print_report(
    w: &mut dyn Write,
    source: Option<&str>,
    report: &Report,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(60);
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "CITATION VERIFICATION REPORT".bold())?;
    } else {
        writeln!(w, "CITATION VERIFICATION REPORT")?;
    }
    if let Some(source) = source {
        writeln!(w, "Source: {}", source)?;
    }
    writeln!(w, "{}", sep)?;
    writeln!(w, "Citations found: {}", report.citations_found)?;
    if color.enabled() {
        writeln!(w, "{} {}", "Verified:".green(), report.verified)?;
        writeln!(w, "{} {}", "Unverified:".yellow(), report.unverified)?;
        writeln!(w, "{} {}", "Suspicious:".red(), report.suspicious)?;
    } else {
        writeln!(w, "Verified: {}", report.verified)?;
        writeln!(w, "Unverified: {}", report.unverified)?;
        writeln!(w, "Suspicious: {}", report.suspicious)?;
    }
    writeln!(w)?;

    if report.results.is_empty() {
        writeln!(w, "No citations detected.")?;
    } else {
        writeln!(w, "DETAILS:")?;
        writeln!(w, "{}", "-".repeat(60))?;
        for (i, result) in report.results.iter().enumerate() {
            print_result(w, i + 1, result, color)?;
        }
    }

    writeln!(w)?;
    writeln!(w, "{}", sep)?;
    if !report.all_clear {
        if color.enabled() {
            writeln!(
                w,
                "{}",
                "WARNING: Unverified or suspicious citations detected!"
                    .bold()
                    .red()
            )?;
        } else {
            writeln!(w, "WARNING: Unverified or suspicious citations detected!")?;
        }
        writeln!(w, "These may be hallucinated. Please verify manually.")?;
    }
    Ok(())
}

fn print_result(
    w: &mut dyn Write,
    n: usize,
    result: &ClassificationResult,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if result.occurrences > 1 {
        writeln!(
            w,
            "{}. {} (mentioned {} times)",
            n, result.original_text, result.occurrences
        )?;
    } else {
        writeln!(w, "{}. {}", n, result.original_text)?;
    }

    let label = if result.is_flagged() {
        "VERIFIED BUT FLAGGED"
    } else {
        result.status.label()
    };
    if color.enabled() {
        let styled = match result.status {
            _ if result.is_flagged() => label.yellow().to_string(),
            Status::Verified => label.green().to_string(),
            Status::Unverified => label.yellow().to_string(),
            Status::Suspicious => label.red().to_string(),
        };
        writeln!(w, "   Status: {}", styled)?;
    } else {
        writeln!(w, "   Status: {}", label)?;
    }

    if let Some(ref reason) = result.suspicious_reason {
        writeln!(w, "   Reason: {}", reason)?;
    }
    if result.status == Status::Unverified {
        writeln!(
            w,
            "   Not found in verified database - possible hallucination"
        )?;
    }
    Ok(())
}

/// Print which documents were read and how many keys each category holds.
pub fn print_database_summary(
    w: &mut dyn Write,
    config: &DatabaseConfig,
    database: &CitationDatabase,
    list: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    let policy = database.policy();
    writeln!(w, "Verified documents:")?;
    for path in &config.verified {
        print_document_line(w, path, color)?;
    }
    writeln!(w, "Suspicious documents:")?;
    for path in &config.suspicious {
        print_document_line(w, path, color)?;
    }
    writeln!(w)?;
    writeln!(w, "Verified citations: {}", database.verified_len())?;
    writeln!(w, "Suspicious citations: {}", database.suspicious_len())?;
    writeln!(
        w,
        "Matching: {}, {} wins when listed in both",
        if policy.case_sensitive {
            "case-sensitive"
        } else {
            "case-insensitive"
        },
        match policy.precedence {
            citecheck_core::Precedence::VerifiedWins => "verified",
            citecheck_core::Precedence::SuspiciousWins => "suspicious",
        }
    )?;

    if list {
        writeln!(w)?;
        writeln!(w, "VERIFIED:")?;
        for key in database.verified_keys() {
            writeln!(w, "  {}", key)?;
        }
        writeln!(w, "SUSPICIOUS:")?;
        for (key, reason) in database.suspicious_entries() {
            writeln!(w, "  {} - {}", key, reason)?;
        }
    }
    Ok(())
}

fn print_document_line(
    w: &mut dyn Write,
    path: &std::path::Path,
    color: ColorMode,
) -> std::io::Result<()> {
    let exists = path.is_file();
    match (exists, color.enabled()) {
        (true, _) => writeln!(w, "  {}", path.display()),
        (false, true) => writeln!(
            w,
            "  {} {}",
            path.display(),
            "(missing, treated as empty)".dimmed()
        ),
        (false, false) => writeln!(w, "  {} (missing, treated as empty)", path.display()),
    }
}
