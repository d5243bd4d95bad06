use crate::html;
use crate::state::WorshipTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(?:오전|오후|새벽|저녁)\s*)?\d{1,2}:\d{2}\s*(?:am|pm)?|(?:(?:오전|오후|새벽|저녁)\s*)?\d{1,2}\s*시(?:\s*\d{1,2}\s*분|\s*반)?",
    )
    .expect("valid regex")
});

static DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)주일|(?:일|월|화|수|목|금|토)요일?|매일|sunday|monday|tuesday|wednesday|thursday|friday|saturday")
        .expect("valid regex")
});

const SCHEDULE_CONTAINERS: &str = "[class*='worship'], [id*='worship'], [class*='schedule'], \
     [id*='schedule'], [class*='service'], [class*='time'], [id*='time'], table";

const SCHEDULE_KEYWORDS: [&str; 4] = ["예배", "미사", "worship", "service"];

const MAX_NAME_CHARS: usize = 40;

/// Separators between a schedule name and its time
const SEPARATORS: [char; 6] = [':', '-', '–', '|', '·', '/'];

/// Extracts recurring schedule entries such as weekly services
///
/// Table rows map column 1 to the name, column 2 to the time text and
/// column 3 to the location. List items and paragraphs are split at the
/// time token. Entries are deduplicated by (name, day).
pub fn extract_worship_times(document: &Html) -> Vec<WorshipTime> {
    let Some(containers) = html::selector(SCHEDULE_CONTAINERS) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut times = Vec::new();

    for container in document.select(&containers) {
        let text = html::element_text(container).to_lowercase();
        if !SCHEDULE_KEYWORDS.iter().any(|k| text.contains(k)) {
            continue;
        }

        for entry in from_table_rows(container).into_iter().chain(from_lines(container)) {
            if seen.insert((entry.name.clone(), entry.day.clone())) {
                times.push(entry);
            }
        }
    }

    times
}

fn from_table_rows(container: ElementRef<'_>) -> Vec<WorshipTime> {
    let Some(rows) = html::selector("tr") else {
        return Vec::new();
    };

    container
        .select(&rows)
        .filter_map(|row| {
            let cells: Vec<String> = html::child_elements(row)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(html::element_text)
                .collect();
            if cells.len() < 2 {
                return None;
            }

            let time_text = &cells[1];
            let time = TIME
                .find(time_text)
                .map(|m| m.as_str().trim().to_string())
                .or_else(|| time_text.chars().any(|c| c.is_ascii_digit()).then(|| time_text.clone()))?;

            let name = cells[0].clone();
            if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
                return None;
            }

            Some(WorshipTime {
                day: day_of(&name).or_else(|| day_of(time_text)),
                name,
                time,
                location: cells.get(2).filter(|c| !c.is_empty()).cloned(),
            })
        })
        .collect()
}

fn from_lines(container: ElementRef<'_>) -> Vec<WorshipTime> {
    let Some(lines) = html::selector("li, p, dd") else {
        return Vec::new();
    };

    container
        .select(&lines)
        .filter(|line| !html::has_ancestor_named(*line, &["table"]))
        .filter_map(|line| parse_line(&html::element_text(line)))
        .collect()
}

/// Splits "주일 1부 예배 - 오전 9:00" style lines at the time token
fn parse_line(text: &str) -> Option<WorshipTime> {
    let found = TIME.find(text)?;
    let name = text[..found.start()]
        .trim()
        .trim_end_matches(|c: char| SEPARATORS.contains(&c) || c.is_whitespace())
        .trim();

    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return None;
    }

    let rest = text[found.end()..]
        .trim()
        .trim_start_matches(|c: char| SEPARATORS.contains(&c) || c.is_whitespace() || c == '(')
        .trim_end_matches(')')
        .trim();

    Some(WorshipTime {
        name: name.to_string(),
        day: day_of(name),
        time: found.as_str().trim().to_string(),
        location: (!rest.is_empty() && rest.chars().count() <= MAX_NAME_CHARS).then(|| rest.to_string()),
    })
}

fn day_of(text: &str) -> Option<String> {
    DAY.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(html: &str) -> Vec<WorshipTime> {
        extract_worship_times(&Html::parse_document(html))
    }

    #[test]
    fn test_table_rows() {
        let found = times(
            r#"<div class="worship-info"><table>
                <tr><th>예배</th><th>시간</th><th>장소</th></tr>
                <tr><td>주일 1부 예배</td><td>오전 9:00</td><td>본당</td></tr>
                <tr><td>수요예배</td><td>오후 7시 30분</td><td>비전홀</td></tr>
            </table></div>"#,
        );

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "주일 1부 예배");
        assert_eq!(found[0].time, "오전 9:00");
        assert_eq!(found[0].day.as_deref(), Some("주일"));
        assert_eq!(found[0].location.as_deref(), Some("본당"));
        assert_eq!(found[1].time, "오후 7시 30분");
        assert_eq!(found[1].day.as_deref(), Some("수요"));
    }

    #[test]
    fn test_list_items() {
        let found = times(
            r#"<ul class="schedule">
                <li>주일 2부 예배 - 오전 11:00 (본당)</li>
                <li>새벽기도회 : 새벽 5:30</li>
                <li>주일 2부 예배 - 오전 11:00 (본당)</li>
            </ul>"#,
        );

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "주일 2부 예배");
        assert_eq!(found[0].location.as_deref(), Some("본당"));
        assert_eq!(found[1].name, "새벽기도회");
        assert_eq!(found[1].time, "새벽 5:30");
    }

    #[test]
    fn test_unrelated_tables_ignored() {
        let found = times(r#"<table><tr><td>가격</td><td>10:00</td></tr></table>"#);
        assert!(found.is_empty());
    }

    #[test]
    fn test_parse_line_requires_name() {
        assert!(parse_line("11:00").is_none());
        assert!(parse_line("no time here").is_none());
    }
}
