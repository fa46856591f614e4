//! Pattern matching of robots.txt rules against URLs
//!
//! Patterns are tested against the full URL string, not just its path:
//!
//! | Pattern | Matches when |
//! |---------|--------------|
//! | empty | never |
//! | `*` or `/*` | always |
//! | `*rest` | the URL ends with `rest` (a trailing `$` is dropped first) |
//! | `prefix*` | the URL contains the pattern minus its last two characters |
//! | anything else | the URL contains the pattern |

use crate::robots::{RobotInstruction, RobotRule};

/// Returns true if `pattern` matches `url`
pub fn rule_matches(url: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    if pattern == "*" || pattern == "/*" {
        return true;
    }

    if let Some(rest) = pattern.strip_prefix('*') {
        let suffix = rest.strip_suffix('$').unwrap_or(rest);
        return url.ends_with(suffix);
    }

    if pattern.ends_with('*') {
        let mut chars = pattern.chars();
        chars.next_back();
        chars.next_back();
        return url.contains(chars.as_str());
    }

    url.contains(pattern)
}

/// Decides whether `url` may be crawled under `rule`
///
/// Allow patterns are evaluated first, in order; the first match permits the
/// URL. Otherwise the first matching disallow pattern forbids it. A URL that
/// matches nothing is allowed.
pub fn build_instruction(url: &str, rule: &RobotRule) -> RobotInstruction {
    let allowed = rule.allowed.iter().any(|p| rule_matches(url, p));
    let can_crawl = allowed || !rule.disallowed.iter().any(|p| rule_matches(url, p));

    RobotInstruction {
        can_crawl,
        delay: rule.crawl_delay,
    }
}
