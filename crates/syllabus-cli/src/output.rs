use std::io::Write;

use owo_colors::OwoColorize;
use syllabus_core::{Classification, ExtractionResult};
use syllabus_parsing::{PotentialSource, ScoredAssignment, StructuredReport};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Collapse whitespace and cut to `max` characters.
fn shorten(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

fn verdict(c: &Classification, color: ColorMode) -> String {
    let label = if c.is_real { "REAL" } else { "UNLIKELY" };
    let text = format!("{} {:.1}%", label, c.confidence_percentage());
    match (color.enabled(), c.is_real) {
        (false, _) => text,
        (true, true) => text.green().to_string(),
        (true, false) => text.yellow().to_string(),
    }
}

fn heading(w: &mut dyn Write, title: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", title.bold())
    } else {
        writeln!(w, "{}", title)
    }
}

/// Print the header line shown before any listing.
pub fn print_file_header(
    w: &mut dyn Write,
    file_name: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}\n", "Scanning".bold().cyan(), file_name.bold())
    } else {
        writeln!(w, "Scanning {}\n", file_name)
    }
}

/// Print the three match lists of an extraction.
pub fn print_extraction(
    w: &mut dyn Write,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    heading(w, &format!("Assignments ({})", result.assignments.len()), color)?;
    for m in &result.assignments {
        writeln!(w, "  [p{}] {}", m.page_number, m.text)?;
    }
    writeln!(w)?;

    heading(w, &format!("Dates ({})", result.dates.len()), color)?;
    for m in &result.dates {
        writeln!(w, "  [p{}] {}", m.page_number, m.text)?;
    }
    writeln!(w)?;

    heading(w, &format!("Linked ({})", result.combined.len()), color)?;
    for m in &result.combined {
        if color.enabled() {
            writeln!(w, "  [p{}] {}", m.page_number, m.text.cyan())?;
        } else {
            writeln!(w, "  [p{}] {}", m.page_number, m.text)?;
        }
        let context = shorten(&m.context, 100);
        if color.enabled() {
            writeln!(w, "        {}", context.dimmed())?;
        } else {
            writeln!(w, "        {}", context)?;
        }
    }
    Ok(())
}

/// Print one line per scored assignment, plus a real/total footer.
pub fn print_scores(
    w: &mut dyn Write,
    scored: &[ScoredAssignment],
    color: ColorMode,
) -> std::io::Result<()> {
    for s in scored {
        writeln!(
            w,
            "[p{}] {:<12} {}",
            s.page,
            s.text,
            verdict(&s.classification, color)
        )?;
        let context = shorten(&s.context, 100);
        if color.enabled() {
            writeln!(w, "     {}", context.dimmed())?;
        } else {
            writeln!(w, "     {}", context)?;
        }
    }
    let real = scored.iter().filter(|s| s.classification.is_real).count();
    writeln!(w)?;
    writeln!(w, "{} of {} assignment mentions look real", real, scored.len())?;
    Ok(())
}

/// Print the per-page summary and the potential assignments.
pub fn print_report(
    w: &mut dyn Write,
    report: &StructuredReport,
    color: ColorMode,
) -> std::io::Result<()> {
    for (page, matches) in &report.by_page {
        heading(w, &format!("Page {}", page), color)?;
        writeln!(
            w,
            "  {} assignments, {} dates, {} linked",
            matches.assignments.len(),
            matches.dates.len(),
            matches.combined.len()
        )?;
    }
    writeln!(w)?;

    heading(
        w,
        &format!("Potential assignments ({})", report.potential_assignments.len()),
        color,
    )?;
    for p in &report.potential_assignments {
        let what = match p.source {
            PotentialSource::Linked => p.full_text.clone().unwrap_or_default(),
            PotentialSource::Overlapping => format!(
                "{} ~ {}",
                p.assignment_text.as_deref().unwrap_or_default(),
                p.nearby_dates.join(", ")
            ),
        };
        let score = p
            .classification
            .map(|c| verdict(&c, color))
            .unwrap_or_else(|| "unscored".to_string());
        writeln!(w, "  [p{}] {} ({})", p.page, what, score)?;
    }
    Ok(())
}
