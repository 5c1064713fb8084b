//! Turns a room's weekly period grid into dated class blocks.

use chrono::{Datelike, NaiveDate};

use crate::model::*;

/// Marker prefixed to undergraduate course titles in the timetable export.
const UNDERGRAD_MARKER: &str = "(학부)";

/// Wall-clock span of a teaching period: period `n` runs `(8+n):00` to `(8+n):50`.
pub fn period_span(period: u8) -> Option<Span> {
    if !(1..=9).contains(&period) {
        return None;
    }
    let start = (8 + period as Minute) * 60;
    Some(Span::new(start, start + 50))
}

/// 1 = Monday … 7 = Sunday, matching [`TimetableEntry::weekday`].
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Display label for a raw timetable cell.
///
/// ```text
/// (학부) 자동차진동제어및실습
/// 379052 / 01분반
/// 장일도 / 19명
/// ```
/// becomes `자동차진동제어및실습 (01분반)`.
pub fn class_label(raw_text: &str) -> String {
    let mut lines = raw_text.lines().map(str::trim).filter(|l| !l.is_empty());
    let Some(first) = lines.next() else {
        return String::new();
    };
    let title = first.replace(UNDERGRAD_MARKER, "").trim().to_string();

    let section = lines
        .next()
        .and_then(|l| l.split('/').nth(1))
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match section {
        Some(section) => format!("{title} ({section})"),
        None => title,
    }
}

/// Class blocks for one weekday. Consecutive periods carrying the same text are
/// one class and merge across the break between them.
pub fn class_blocks(entries: &[TimetableEntry], weekday: u8) -> Vec<ClassBlock> {
    let mut day: Vec<(u8, Span, &str)> = entries
        .iter()
        .filter(|e| e.weekday == weekday && !e.raw_text.trim().is_empty())
        .filter_map(|e| period_span(e.period).map(|span| (e.period, span, e.raw_text.as_str())))
        .collect();
    day.sort_by_key(|(period, _, _)| *period);

    let mut runs: Vec<(u8, Span, &str)> = Vec::new();
    for (period, span, text) in day {
        if let Some(last) = runs.last_mut() {
            if period == last.0 + 1 && text == last.2 {
                last.0 = period;
                last.1.end = span.end;
                continue;
            }
        }
        runs.push((period, span, text));
    }

    runs.into_iter()
        .map(|(_, span, text)| ClassBlock {
            span,
            label: class_label(text),
        })
        .collect()
}
