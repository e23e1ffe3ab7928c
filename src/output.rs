//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! Settlements (1) → kinds/settlement.html
//! Districts (1) → kinds/district.html
//! Characters (2) → kinds/character.html
//! Other (1) → kinds/_other.html
//!
//! Generated 13 entity pages, 9 index pages → output/
//! 1 reference could not be resolved
//! ```
//!
//! Write failures are listed after the totals:
//!
//! ```text
//! Failed to write 1 file
//!     cannot write output/1.html: Permission denied (os error 13)
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::{BuildSummary, KindCount};
use crate::site::KINDS_DIR;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// One line per index group.
fn kind_line(kind: &KindCount, with_links: bool) -> String {
    if with_links {
        format!(
            "{} ({}) → {}/{}.html",
            kind.heading, kind.count, KINDS_DIR, kind.slug
        )
    } else {
        format!("{} ({})", kind.heading, kind.count)
    }
}

pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();
    // Kind pages exist when more than the home page was written.
    let with_links = summary.site.index_pages > 1;

    for kind in &summary.kinds {
        lines.push(kind_line(kind, with_links));
    }
    if !summary.kinds.is_empty() {
        lines.push(String::new());
    }

    lines.push(format!(
        "Generated {}, {} → {}",
        plural(summary.site.entity_pages, "entity page", "entity pages"),
        plural(summary.site.index_pages, "index page", "index pages"),
        summary.output.display()
    ));

    if !summary.warnings.is_empty() {
        let count = summary.warnings.len();
        lines.push(if count == 1 {
            "1 reference could not be resolved".to_string()
        } else {
            format!("{count} references could not be resolved")
        });
    }

    if !summary.site.failures.is_empty() {
        lines.push(format!(
            "Failed to write {}",
            plural(summary.site.failures.len(), "file", "files")
        ));
        for failure in &summary.site.failures {
            lines.push(format!("{}{}", indent(1), failure));
        }
    }

    lines
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolutionWarning;
    use crate::site::{SiteReport, WriteError};
    use crate::store::EntityId;
    use std::path::PathBuf;

    fn summary(entity_pages: usize, index_pages: usize) -> BuildSummary {
        BuildSummary {
            output: PathBuf::from("output"),
            entities: entity_pages,
            kinds: vec![
                KindCount {
                    heading: "Settlements".to_string(),
                    slug: "settlement".to_string(),
                    count: 1,
                },
                KindCount {
                    heading: "Characters".to_string(),
                    slug: "character".to_string(),
                    count: 2,
                },
            ],
            warnings: Vec::new(),
            site: SiteReport {
                entity_pages,
                index_pages,
                ..SiteReport::default()
            },
        }
    }

    #[test]
    fn summary_lists_kinds_and_totals() {
        let lines = format_build_summary(&summary(3, 3));
        assert_eq!(
            lines,
            vec![
                "Settlements (1) → kinds/settlement.html",
                "Characters (2) → kinds/character.html",
                "",
                "Generated 3 entity pages, 3 index pages → output",
            ]
        );
    }

    #[test]
    fn summary_without_kind_pages_omits_links() {
        let lines = format_build_summary(&summary(3, 1));
        assert_eq!(lines[0], "Settlements (1)");
        assert!(lines.last().unwrap().contains("1 index page →"));
    }

    #[test]
    fn summary_singular_forms() {
        let mut s = summary(1, 1);
        s.kinds.clear();
        let lines = format_build_summary(&s);
        assert_eq!(lines, vec!["Generated 1 entity page, 1 index page → output"]);
    }

    #[test]
    fn summary_counts_warnings() {
        let mut s = summary(3, 3);
        s.warnings.push(ResolutionWarning::Dangling {
            entity: EntityId::from("1"),
            field: "Likes.target".to_string(),
            target: EntityId::from("99"),
        });
        let lines = format_build_summary(&s);
        assert_eq!(lines.last().unwrap(), "1 reference could not be resolved");
    }

    #[test]
    fn summary_lists_write_failures_indented() {
        let mut s = summary(2, 3);
        s.site.failures.push(WriteError {
            path: PathBuf::from("output/1.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        let lines = format_build_summary(&s);
        let n = lines.len();
        assert_eq!(lines[n - 2], "Failed to write 1 file");
        assert_eq!(lines[n - 1], "    cannot write output/1.html: denied");
    }
}
