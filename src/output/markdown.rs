//! Markdown report generation
//!
//! This module renders a crawl result as a human-readable markdown report,
//! including the navigation outline, popups, the dictionary grouped by
//! category, and recorded errors.

use crate::output::OutputResult;
use crate::state::{CrawlResult, EntryCategory, PageInfo};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Errors listed in the report before the rest are summarized
const MAX_REPORTED_ERRORS: usize = 50;

/// Writes the markdown report for a crawl result
///
/// # Arguments
///
/// * `result` - The crawl result to render
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_crawl_report(result: &CrawlResult, output_path: &Path) -> OutputResult<()> {
    let markdown = format_crawl_report(result);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl result as markdown
pub fn format_crawl_report(result: &CrawlResult) -> String {
    let structure = &result.structure;
    let organization = &structure.organization;
    let mut md = String::new();

    md.push_str(&format!("# Steeple Crawl Report: {}\n\n", organization.name));

    // Run information
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Organization**: {} ({})\n", organization.name, organization.code));
    md.push_str(&format!("- **Homepage**: {}\n", organization.homepage));
    md.push_str(&format!(
        "- **Status**: {}\n",
        if result.success { "success" } else { "failed" }
    ));
    md.push_str(&format!(
        "- **Elapsed**: {} ms ({:.1} seconds)\n",
        result.elapsed_ms,
        result.elapsed_ms as f64 / 1000.0
    ));
    md.push_str(&format!("- **Pages Crawled**: {}\n\n", result.progress.crawled_pages));

    // Overview
    let mut navigation_nodes = 0;
    for page in &structure.navigation {
        page.walk(&mut |_| navigation_nodes += 1);
    }
    let metadata = &structure.metadata;

    md.push_str("## Overview\n\n");
    md.push_str("| Item | Count |\n");
    md.push_str("|------|-------|\n");
    md.push_str(&format!("| Top-level menus | {} |\n", structure.navigation.len()));
    md.push_str(&format!("| Navigation nodes | {} |\n", navigation_nodes));
    md.push_str(&format!("| Boards | {} |\n", structure.boards.len()));
    md.push_str(&format!("| Special pages | {} |\n", structure.special_pages.len()));
    md.push_str(&format!("| Popups | {} |\n", result.popups.len()));
    md.push_str(&format!("| Dictionary entries | {} |\n", result.dictionary.len()));
    md.push_str(&format!("| Errors | {} |\n\n", result.errors.len()));

    md.push_str("## Site Metadata\n\n");
    md.push_str(&format!("- **Total Pages**: {}\n", metadata.total_pages));
    md.push_str(&format!("- **Max Depth**: {}\n", metadata.max_depth));
    md.push_str(&format!("- **Login**: {}\n", yes_no(metadata.has_login)));
    md.push_str(&format!("- **Mobile Version**: {}\n", yes_no(metadata.has_mobile_version)));
    if !metadata.technologies.is_empty() {
        md.push_str(&format!("- **Technologies**: {}\n", metadata.technologies.join(", ")));
    }
    md.push('\n');

    // Extended information
    let extended = &result.extended;
    md.push_str("## Extended Information\n\n");
    md.push_str(&format!("- **Contacts**: {}\n", yes_no(extended.has_contacts)));
    md.push_str(&format!("- **Social Links**: {}\n", extended.social_links));
    md.push_str(&format!("- **Logo**: {}\n", yes_no(extended.has_logo)));
    md.push_str(&format!("- **Banners**: {}\n", extended.banners));
    md.push_str(&format!("- **Gallery Images**: {}\n", extended.gallery_images));
    md.push_str(&format!("- **Videos**: {}\n", extended.videos));
    md.push_str(&format!("- **Documents**: {}\n", extended.documents));
    md.push_str(&format!("- **Worship Times**: {}\n\n", extended.worship_times));

    if let Some(times) = &structure.worship_times {
        md.push_str("### Worship Times\n\n");
        for time in times {
            let day = time.day.as_deref().map(|d| format!("{} ", d)).unwrap_or_default();
            md.push_str(&format!("- {}: {}{}\n", time.name, day, time.time));
        }
        md.push('\n');
    }

    // Navigation outline
    if !structure.navigation.is_empty() {
        md.push_str("## Navigation\n\n");
        for page in &structure.navigation {
            push_outline(&mut md, page, 0);
        }
        md.push('\n');
    }

    if !structure.boards.is_empty() {
        md.push_str("## Boards\n\n");
        for board in &structure.boards {
            push_outline(&mut md, board, 0);
        }
        md.push('\n');
    }

    // Popups
    if !result.popups.is_empty() {
        md.push_str("## Popups\n\n");
        md.push_str("| Title | URL | Trigger |\n");
        md.push_str("|-------|-----|---------|\n");
        for popup in &result.popups {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&popup.title),
                escape_cell(&popup.url),
                popup.trigger_type
            ));
        }
        md.push('\n');
    }

    // Dictionary by category
    if !result.dictionary.is_empty() {
        md.push_str("## Dictionary\n\n");
        for category in EntryCategory::all() {
            let entries: Vec<_> = result
                .dictionary
                .iter()
                .filter(|entry| entry.category == category)
                .collect();
            if entries.is_empty() {
                continue;
            }

            md.push_str(&format!("### {} ({})\n\n", category, entries.len()));
            for entry in entries {
                match &entry.subcategory {
                    Some(subcategory) => md.push_str(&format!("- {} ({})\n", entry.term, subcategory)),
                    None => md.push_str(&format!("- {}\n", entry.term)),
                }
            }
            md.push('\n');
        }
    }

    // Errors
    if !result.errors.is_empty() {
        md.push_str("## Errors\n\n");
        md.push_str("| URL | Kind | Message |\n");
        md.push_str("|-----|------|---------|\n");
        for error in result.errors.iter().take(MAX_REPORTED_ERRORS) {
            md.push_str(&format!(
                "| {} | {:?} | {} |\n",
                escape_cell(&error.url),
                error.kind,
                escape_cell(&error.message)
            ));
        }
        if result.errors.len() > MAX_REPORTED_ERRORS {
            md.push_str(&format!(
                "\n... and {} more\n",
                result.errors.len() - MAX_REPORTED_ERRORS
            ));
        }
        md.push('\n');
    }

    md
}

fn push_outline(md: &mut String, page: &PageInfo, indent: usize) {
    let padding = "  ".repeat(indent);
    let status = match (&page.crawl_error, page.crawled) {
        (Some(error), _) => format!(" (error: {})", error),
        (None, true) => String::new(),
        (None, false) => " (not crawled)".to_string(),
    };

    if page.has_url() {
        md.push_str(&format!(
            "{}- [{}]({}) `{}`{}\n",
            padding, page.title, page.url, page.content_type, status
        ));
    } else {
        md.push_str(&format!("{}- {}\n", padding, page.title));
    }

    for child in &page.children {
        push_outline(md, child, indent + 1);
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        CrawlError, CrawlErrorKind, DictionaryEntry, Organization, PageType, PopupInfo, TriggerType,
    };

    fn create_test_result() -> CrawlResult {
        let mut about = PageInfo::new("https://church.example/about", "교회소개", PageType::Menu, 1);
        about.crawled = true;
        let mut greeting = PageInfo::new("https://church.example/greeting", "인사말", PageType::Submenu, 2);
        greeting.crawled = true;
        about.children.push(greeting);

        let mut result = CrawlResult {
            success: true,
            elapsed_ms: 1500,
            ..CrawlResult::default()
        };
        result.structure.organization = Organization {
            name: "Test Church".to_string(),
            code: "test".to_string(),
            homepage: "https://church.example/".to_string(),
        };
        result.structure.navigation.push(about);
        result.popups.push(PopupInfo {
            url: "https://church.example/popup/notice".to_string(),
            title: "공지".to_string(),
            trigger_type: TriggerType::WindowOpen,
            trigger_element: "a".to_string(),
        });
        result.dictionary = vec![
            DictionaryEntry::new("청년부", EntryCategory::Department).with_subcategory("youth"),
            DictionaryEntry::new("김목사", EntryCategory::Person),
        ];
        result
    }

    #[test]
    fn test_format_crawl_report() {
        let markdown = format_crawl_report(&create_test_result());

        assert!(markdown.contains("# Steeple Crawl Report: Test Church"));
        assert!(markdown.contains("- **Status**: success"));
        assert!(markdown.contains("| Navigation nodes | 2 |"));
        assert!(markdown.contains("| Popups | 1 |"));
    }

    #[test]
    fn test_navigation_outline_is_indented() {
        let markdown = format_crawl_report(&create_test_result());

        assert!(markdown.contains("- [교회소개](https://church.example/about) `static`\n"));
        assert!(markdown.contains("  - [인사말](https://church.example/greeting) `static`\n"));
    }

    #[test]
    fn test_dictionary_grouped_by_category() {
        let markdown = format_crawl_report(&create_test_result());

        let person = markdown.find("### person (1)").unwrap();
        let department = markdown.find("### department (1)").unwrap();
        assert!(person < department);
        assert!(markdown.contains("- 청년부 (youth)"));
        assert!(markdown.contains("| 공지 | https://church.example/popup/notice | window-open |"));
    }

    #[test]
    fn test_errors_section() {
        let mut result = create_test_result();
        result.success = false;
        result.errors.push(CrawlError::new(
            "https://church.example/",
            CrawlErrorKind::HomepageUnreachable,
            "HTTP 500",
        ));

        let markdown = format_crawl_report(&result);
        assert!(markdown.contains("- **Status**: failed"));
        assert!(markdown.contains("| https://church.example/ | HomepageUnreachable | HTTP 500 |"));
    }

    #[test]
    fn test_write_crawl_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        write_crawl_report(&create_test_result(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Steeple Crawl Report"));
    }
}
