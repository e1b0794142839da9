//! Pairs assignment mentions with dates that appear close by on the same page.

use syllabus_core::{BoundingBox, Match, MatchType};

use crate::finder::{Occurrence, char_offset, context_window};

/// Separator between the assignment and date halves of a combined match's text.
pub const COMBINED_SEPARATOR: &str = " | ";

/// Link assignments to dates on one page.
///
/// For each assignment (in text order) the first date, in text order, whose
/// start lies fewer than `max_distance` characters away is taken; remaining
/// dates are not considered for that assignment. This is first-found, not
/// closest-found.
///
/// TODO: add a closest-date policy alongside first-found if schedules with
/// dense date columns keep pairing with the wrong row.
pub fn link_page(
    text: &str,
    page_number: usize,
    assignments: &[Occurrence],
    dates: &[Occurrence],
    max_distance: usize,
    context_radius: usize,
) -> Vec<Match> {
    let date_starts: Vec<usize> = dates
        .iter()
        .map(|d| char_offset(text, d.span.start))
        .collect();

    let mut combined = Vec::new();
    for assignment in assignments {
        let start = char_offset(text, assignment.span.start);
        let Some((date, _)) = dates
            .iter()
            .zip(&date_starts)
            .find(|(_, date_start)| start.abs_diff(**date_start) < max_distance)
        else {
            continue;
        };

        let lo = assignment.span.start.min(date.span.start);
        let hi = assignment.span.end.max(date.span.end);
        combined.push(Match {
            text: format!(
                "{}{}{}",
                assignment.record.text, COMBINED_SEPARATOR, date.record.text
            ),
            page_number,
            context: context_window(text, lo, hi, context_radius),
            match_type: MatchType::Combined,
            position: BoundingBox::SENTINEL,
        });
    }
    combined
}

/// The assignment half of a combined match's text.
pub fn assignment_part(combined_text: &str) -> &str {
    combined_text
        .split_once(COMBINED_SEPARATOR)
        .map_or(combined_text, |(assignment, _)| assignment)
}
