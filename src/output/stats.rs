//! Terminal rendering of crawl results

use crate::output::CrawlSummary;
use std::fmt::Write;

/// Renders a summary as plain text
pub fn format_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Crawl Summary ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(
        out,
        "  Pages retrieved: {} / {} ({:.1}% of limit)",
        summary.pages_retrieved,
        summary.page_limit,
        summary.budget_used()
    );
    let _ = writeln!(out, "  Total words: {}", summary.total_words);
    let _ = writeln!(out, "  Total links: {}", summary.total_links);
    let _ = writeln!(out, "  Avg words/page: {:.2}", summary.avg_words_per_page);
    let _ = writeln!(out, "  Avg links/page: {:.2}", summary.avg_links_per_page);
    let _ = writeln!(
        out,
        "  Parse time: {:.2} ms total, {:.2} ms/page",
        summary.total_parse_time_ms, summary.avg_parse_time_ms
    );
    let _ = writeln!(out, "  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    let _ = writeln!(out);

    if !summary.keywords.is_empty() {
        let _ = writeln!(out, "Keywords:");
        for (keyword, stats) in &summary.keywords {
            let _ = writeln!(
                out,
                "  {}: {} hits ({:.2}/page)",
                keyword, stats.total_hits, stats.avg_hits
            );
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Outcomes:");
    let _ = writeln!(out, "  Fetch failures: {}", summary.fetch_failures);
    let _ = writeln!(out, "  Parse failures: {}", summary.parse_failures);
    let _ = writeln!(out, "  robots.txt requests: {}", summary.robots_requests);
    if summary.dropped_reports > 0 {
        let _ = writeln!(
            out,
            "  Reports dropped past limit: {}",
            summary.dropped_reports
        );
    }

    out
}

/// Prints a summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    print!("{}", format_summary(summary));
}
