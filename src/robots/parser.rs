//! Robots.txt parser implementation
//!
//! Only the `*` user-agent group is honored. Directive keys are matched
//! exactly and case-sensitively; each line contributes at most one value,
//! its second whitespace-separated token.

/// Rules for one host, built from its robots.txt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotRule {
    /// Seconds to wait between requests to the host
    pub crawl_delay: u64,

    /// Allow patterns, in declaration order
    pub allowed: Vec<String>,

    /// Disallow patterns, in declaration order
    pub disallowed: Vec<String>,
}

impl RobotRule {
    /// Parses robots.txt content
    ///
    /// A rule is always produced. When no allow or disallow line applies to
    /// the `*` agent, the rule holds a single empty allow pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyword_crawler::robots::RobotRule;
    ///
    /// let rule = RobotRule::parse("User-agent: *\nDisallow: /private\nCrawl-delay: 2");
    /// assert_eq!(rule.disallowed, vec!["/private"]);
    /// assert_eq!(rule.crawl_delay, 2);
    /// ```
    pub fn parse(content: &str) -> Self {
        let mut rule = RobotRule::default();
        let mut active = false;

        for line in content.trim().lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 || tokens[0].starts_with('#') {
                continue;
            }

            let value = tokens[1];
            match tokens[0] {
                "User-agent:" => active = value == "*",
                "Allow:" if active => rule.allowed.push(value.to_string()),
                "Disallow:" if active => rule.disallowed.push(value.to_string()),
                "Crawl-delay:" if active => {
                    if let Ok(delay) = value.parse::<u64>() {
                        rule.crawl_delay = delay;
                    }
                }
                _ => {}
            }
        }

        if rule.allowed.is_empty() && rule.disallowed.is_empty() {
            rule.allowed.push(String::new());
        }

        rule
    }
}
