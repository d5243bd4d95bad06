use crate::html::{self, LINK_SELECTOR};
use crate::state::ContactInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// Area-code numbers, representative numbers (1588-xxxx) and +82 numbers
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\+82[-.\s]?\d{1,2}|\(?0\d{1,2}\)?)[-.\s)]\s?\d{3,4}[-.\s]\d{4}|\b1[5-9]\d{2}[-.\s]\d{4}\b",
    )
    .expect("valid regex")
});

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex"));

static POSTAL_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:우편번호|우\)|\(우\)|\[|\()\s*[:.]?\s*(\d{5}|\d{3}-\d{3})\b").expect("valid regex")
});

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:서울|부산|대구|인천|광주|대전|울산|세종|경기|강원|충북|충남|충청|전북|전남|전라|경북|경남|경상|제주)[가-힣]*(?:\s+[가-힣0-9\-]+?){0,4}?\s+[가-힣0-9\-]+(?:로|길|동|리)\s*\d+(?:-\d+)?(?:\s*\([^)]{1,30}\))?",
    )
    .expect("valid regex")
});

const FAX_MARKERS: [&str; 2] = ["fax", "팩스"];

/// Characters that turn a lone `f` into a fax abbreviation (`F. `, `F) `, `F: `)
const FAX_ABBREVIATION_MARKS: [char; 3] = ['.', ')', ':'];

/// Distance (in characters) within which a fax marker reclassifies a phone number
const FAX_WINDOW: usize = 10;

const CONTACT_REGIONS: &str = "footer, #footer, .footer, #ft, .ft, address, #contact, .contact, \
     .copyright, [class*='footer'], [class*='contact'], [class*='addr'], [class*='info']";

/// Extracts phone, fax, email, address and postal code
///
/// `tel:` and `mailto:` anchors win over text matches. Text is searched in
/// footer and contact regions first, then in the whole body.
pub fn extract_contacts(document: &Html) -> Option<ContactInfo> {
    let mut info = ContactInfo::default();

    for anchor in document.select(&LINK_SELECTOR) {
        let href = anchor.value().attr("href").unwrap_or("").trim();
        let lowered = href.to_ascii_lowercase();
        if let Some(number) = lowered.strip_prefix("tel:") {
            if !number.trim().is_empty() {
                info.phone.get_or_insert_with(|| normalize_phone(number));
            }
        } else if let Some(address) = lowered.strip_prefix("mailto:") {
            let address = address.split('?').next().unwrap_or("").trim();
            if EMAIL.is_match(address) {
                info.email.get_or_insert_with(|| address.to_string());
            }
        }
    }

    let region_text = html::selector(CONTACT_REGIONS)
        .map(|regions| {
            document
                .select(&regions)
                .map(html::element_text)
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .unwrap_or_default();
    fill_from_text(&mut info, &region_text);
    fill_from_text(&mut info, &html::element_text(html::body(document)));

    (!info.is_empty()).then_some(info)
}

/// Fills the fields still missing from `info` with matches found in `text`
fn fill_from_text(info: &mut ContactInfo, text: &str) {
    for found in PHONE.find_iter(text) {
        let number = normalize_phone(found.as_str());
        if is_fax(&text[..found.start()]) {
            info.fax.get_or_insert(number);
        } else if info.phone.is_none() {
            info.phone = Some(number);
        }
    }

    if info.email.is_none() {
        info.email = EMAIL.find(text).map(|m| m.as_str().to_string());
    }

    if info.postal_code.is_none() {
        info.postal_code = POSTAL_CODE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
    }

    if info.address.is_none() {
        info.address = ADDRESS.find(text).map(|m| html::clean_text(m.as_str()));
    }
}

/// Returns true if a fax marker ends within the window before a number
///
/// The `F.` abbreviation only counts as a word of its own, so "ref." and
/// "of." do not turn a phone number into a fax number.
fn is_fax(preceding: &str) -> bool {
    let mut tail: Vec<char> = preceding
        .chars()
        .rev()
        .take(FAX_WINDOW + 1)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    tail.reverse();

    let start = tail.len().saturating_sub(FAX_WINDOW);
    let window: String = tail[start..].iter().collect();
    if FAX_MARKERS.iter().any(|marker| window.contains(marker)) {
        return true;
    }

    (start..tail.len()).any(|i| {
        tail[i] == 'f'
            && tail.get(i + 1).is_some_and(|c| FAX_ABBREVIATION_MARKS.contains(c))
            && (i == 0 || !tail[i - 1].is_alphanumeric())
    })
}

fn normalize_phone(raw: &str) -> String {
    let mut number = String::new();
    for c in raw.trim().chars() {
        match c {
            '0'..='9' | '+' => number.push(c),
            '-' | '.' | ' ' | ')' if !number.ends_with('-') && !number.is_empty() && !number.ends_with('+') => {
                number.push('-')
            }
            _ => {}
        }
    }
    number.trim_end_matches('-').to_string()
}
