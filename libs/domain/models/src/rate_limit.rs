// [libs/domain/models/src/rate_limit.rs]
/*!
 * MODULE: RATE LIMIT RULE
 * LAYER: DOMAIN MODEL (L2)
 * RESPONSIBILITY: RULE SHAPE, GLOB MATCHING, SPECIFICITY RESOLUTION
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethodPattern {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    All,
}

impl HttpMethodPattern {
    pub fn matches(&self, method: &str) -> bool {
        if *self == HttpMethodPattern::All {
            return true;
        }
        self.as_str().eq_ignore_ascii_case(method)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethodPattern::Get => "GET",
            HttpMethodPattern::Post => "POST",
            HttpMethodPattern::Put => "PUT",
            HttpMethodPattern::Delete => "DELETE",
            HttpMethodPattern::Patch => "PATCH",
            HttpMethodPattern::All => "ALL",
        }
    }
}

impl std::str::FromStr for HttpMethodPattern {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethodPattern::Get),
            "POST" => Ok(HttpMethodPattern::Post),
            "PUT" => Ok(HttpMethodPattern::Put),
            "DELETE" => Ok(HttpMethodPattern::Delete),
            "PATCH" => Ok(HttpMethodPattern::Patch),
            "ALL" => Ok(HttpMethodPattern::All),
            other => Err(format!("unknown http method pattern: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitRule {
    pub id: String,
    pub endpoint_pattern: String,
    pub method: HttpMethodPattern,
    pub limit_count: u32,
    pub window_seconds: u32,
    pub enabled: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl RateLimitRule {
    /// `*` matches exactly one path segment.
    pub fn matches_path(&self, path: &str) -> bool {
        let pattern_segments: Vec<&str> = self.endpoint_pattern.split('/').collect();
        let path_segments: Vec<&str> = path.split('/').collect();

        if pattern_segments.len() != path_segments.len() {
            return false;
        }

        pattern_segments
            .iter()
            .zip(path_segments.iter())
            .all(|(pattern_segment, path_segment)| {
                *pattern_segment == "*" || pattern_segment == path_segment
            })
    }

    /// Number of `*` wildcards in the endpoint pattern — fewer is more specific.
    pub fn wildcard_count(&self) -> usize {
        self.endpoint_pattern
            .split('/')
            .filter(|segment| *segment == "*")
            .count()
    }

    pub fn is_method_specific(&self) -> bool {
        self.method != HttpMethodPattern::All
    }
}

/// Picks the most specific matching rule: exact path wins over glob,
/// narrower glob wins over wider, method-specific wins over `ALL`.
pub fn select_most_specific<'a>(
    rules: &'a [RateLimitRule],
    path: &str,
    method: &str,
) -> Option<&'a RateLimitRule> {
    rules
        .iter()
        .filter(|rule| rule.enabled)
        .filter(|rule| rule.matches_path(path))
        .filter(|rule| rule.method.matches(method))
        .min_by_key(|rule| {
            let exact_path = rule.wildcard_count() == 0;
            (
                !exact_path as u8,
                rule.wildcard_count(),
                !rule.is_method_specific() as u8,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, method: HttpMethodPattern) -> RateLimitRule {
        RateLimitRule {
            id: uuid::Uuid::new_v4().to_string(),
            endpoint_pattern: pattern.to_string(),
            method,
            limit_count: 10,
            window_seconds: 60,
            enabled: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn wildcard_matches_single_segment() {
        let r = rule("/api/v4/quran/*", HttpMethodPattern::Get);
        assert!(r.matches_path("/api/v4/quran/chapters"));
        assert!(!r.matches_path("/api/v4/quran/chapters/1"));
    }

    #[test]
    fn exact_path_wins_over_glob() {
        let rules = vec![
            rule("/api/v4/quran/*", HttpMethodPattern::Get),
            rule("/api/v4/quran/chapters", HttpMethodPattern::Get),
        ];
        let picked = select_most_specific(&rules, "/api/v4/quran/chapters", "GET").unwrap();
        assert_eq!(picked.endpoint_pattern, "/api/v4/quran/chapters");
    }

    #[test]
    fn method_specific_wins_over_all() {
        let rules = vec![
            rule("/api/v4/quran/chapters", HttpMethodPattern::All),
            rule("/api/v4/quran/chapters", HttpMethodPattern::Get),
        ];
        let picked = select_most_specific(&rules, "/api/v4/quran/chapters", "GET").unwrap();
        assert!(picked.is_method_specific());
    }

    #[test]
    fn narrower_glob_wins_over_wider() {
        let rules = vec![
            rule("/api/*/*", HttpMethodPattern::Get),
            rule("/api/v4/*", HttpMethodPattern::Get),
        ];
        let picked = select_most_specific(&rules, "/api/v4/quran", "GET").unwrap();
        assert_eq!(picked.endpoint_pattern, "/api/v4/*");
    }

    #[test]
    fn no_match_returns_none() {
        let rules = vec![rule("/api/v4/hadith/*", HttpMethodPattern::Get)];
        assert!(select_most_specific(&rules, "/api/v4/quran/chapters", "GET").is_none());
    }
}
