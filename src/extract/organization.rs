//! Organization units and people
//!
//! Two passes over a page's visible text:
//!
//! - curated terms (ministry categories, small-group words, programs, places)
//!   plus a generic suffix regex for unlisted department/team/committee/district names
//! - a name + title regex pair for person records
//!
//! Every hit gets a best-effort subcategory by keyword containment.

use crate::state::{DictionaryEntry, EntryCategory};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Curated terms matched by containment
const CURATED_TERMS: &[(&str, EntryCategory)] = &[
    ("주일학교", EntryCategory::Department),
    ("찬양대", EntryCategory::Department),
    ("성가대", EntryCategory::Department),
    ("여전도회", EntryCategory::Department),
    ("남선교회", EntryCategory::Department),
    ("청년부", EntryCategory::Department),
    ("대학부", EntryCategory::Department),
    ("다락방", EntryCategory::Organization),
    ("속회", EntryCategory::Organization),
    ("새가족부", EntryCategory::Department),
    ("제자훈련", EntryCategory::Program),
    ("성경공부", EntryCategory::Program),
    ("알파코스", EntryCategory::Program),
    ("새가족반", EntryCategory::Program),
    ("수련회", EntryCategory::Event),
    ("부흥회", EntryCategory::Event),
    ("바자회", EntryCategory::Event),
    ("예배당", EntryCategory::Place),
    ("교육관", EntryCategory::Place),
    ("비전센터", EntryCategory::Place),
];

/// Unlisted unit names: a Hangul stem followed by a unit suffix and an optional particle
static UNIT_TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([가-힣]{2,10}?(?:위원회|선교회|전도회|교구|구역|목장|부|팀))(?:은|는|이|가|을|를|의|에|와|과|도|에서|으로|로)?\b",
    )
    .expect("valid regex")
});

/// Stems too generic to name a unit
const EXCLUDED_TERMS: &[&str] = &[
    "행정부", "사법부", "입법부", "관리부", "전체부", "담당부", "해당부", "소속부", "다음부",
    "이번부", "저희팀", "우리팀", "전체팀", "해당팀", "담당팀", "홈페이지팀",
];

static NAME_THEN_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b([가-힣]{{2,4}})\s?({})(?:님)?\b", PERSON_TITLES.join("|"))).expect("valid regex")
});

static TITLE_THEN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b({})\s+([가-힣]{{2,4}})\b", PERSON_TITLES.join("|"))).expect("valid regex")
});

/// Longest first so that alternation prefers "담임목사" over "목사"
const PERSON_TITLES: &[&str] = &[
    "담임목사", "원로목사", "협동목사", "교육목사", "부목사", "목사", "전도사", "강도사", "선교사",
    "장로", "권사", "집사", "사모",
];

/// Words that precede a title but are not names
const NOT_NAMES: &[&str] = &[
    "우리", "교회", "담임", "원로", "협동", "은퇴", "시무", "명예", "안수", "교육", "청빙",
    "소개", "섬기는", "모든", "각", "초대", "우리교회", "본교회",
];

/// Extracts organization units (departments, districts, small groups, programs, places)
pub fn extract_organizations(text: &str, source_url: &str) -> Vec<DictionaryEntry> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for (term, category) in CURATED_TERMS {
        if text.contains(term) && seen.insert((*term).to_string()) {
            entries.push(unit_entry(term, *category, source_url));
        }
    }

    let mut generic: Vec<String> = Vec::new();
    for caps in UNIT_TERM.captures_iter(text) {
        let term = caps[1].to_string();
        if EXCLUDED_TERMS.contains(&term.as_str()) || seen.contains(&term) || generic.contains(&term) {
            continue;
        }
        generic.push(term);
    }

    // "선교부" is a fragment when "국제선교부" was also found
    let kept: Vec<&String> = generic
        .iter()
        .filter(|term| !generic.iter().any(|other| other != *term && other.ends_with(term.as_str())))
        .collect();

    for term in kept {
        seen.insert(term.clone());
        entries.push(unit_entry(term, category_for_unit(term), source_url));
    }

    entries
}

/// Extracts person records from name + title pairs
pub fn extract_people(text: &str, source_url: &str) -> Vec<DictionaryEntry> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    let pairs = NAME_THEN_TITLE
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .chain(
            TITLE_THEN_NAME
                .captures_iter(text)
                .map(|caps| (caps[2].to_string(), caps[1].to_string())),
        );

    for (name, title) in pairs {
        if NOT_NAMES.contains(&name.as_str())
            || name.ends_with("교회")
            || PERSON_TITLES.iter().any(|t| name.ends_with(t))
            || !seen.insert(name.clone())
        {
            continue;
        }

        let mut entry = DictionaryEntry::new(&name, EntryCategory::Person)
            .with_subcategory(person_subcategory(&title))
            .with_source(source_url);
        entry.definition = Some(format!("{} {}", name, title));
        entry
            .metadata
            .insert("title".to_string(), serde_json::Value::String(title));
        entries.push(entry);
    }

    entries
}

fn unit_entry(term: &str, category: EntryCategory, source_url: &str) -> DictionaryEntry {
    let entry = DictionaryEntry::new(term, category).with_source(source_url);
    match unit_subcategory(term) {
        Some(subcategory) => entry.with_subcategory(subcategory),
        None => entry,
    }
}

/// Districts, cells and small groups are organization units; the rest are departments
fn category_for_unit(term: &str) -> EntryCategory {
    if ["교구", "구역", "목장"].iter().any(|suffix| term.ends_with(suffix)) {
        EntryCategory::Organization
    } else {
        EntryCategory::Department
    }
}

/// Best-effort subcategory by keyword containment, checked in order
fn unit_subcategory(term: &str) -> Option<&'static str> {
    const RULES: &[(&[&str], &str)] = &[
        (&["여전도", "남선교", "장년", "여성", "남성", "노년", "실버"], "fellowship"),
        (&["선교"], "mission"),
        (&["교구", "구역"], "district"),
        (&["목장", "다락방", "속회", "셀"], "small_group"),
        (&["찬양", "성가", "음악"], "praise"),
        (&["주일학교", "교육", "영아", "유아", "유치", "유년", "초등", "소년", "중등", "고등", "아동"], "education"),
        (&["청년", "대학", "청소년"], "youth"),
        (&["봉사", "구제", "사회", "복지"], "service"),
        (&["새가족", "제자", "성경", "알파", "훈련"], "discipleship"),
        (&["수련회", "부흥회", "바자회"], "event"),
        (&["예배당", "교육관", "센터"], "facility"),
        (&["위원회"], "committee"),
    ];

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| term.contains(k)))
        .map(|(_, subcategory)| *subcategory)
}

fn person_subcategory(title: &str) -> &'static str {
    match title {
        t if t.ends_with("목사") => "pastor",
        "전도사" | "강도사" => "evangelist",
        "선교사" => "missionary",
        "장로" => "elder",
        "권사" | "집사" => "deacon",
        _ => "staff",
    }
}
