use regex::Regex;

/// Prefixes that are always guarded, including everything below them.
pub const GUARDED_PREFIXES: [&str; 4] = ["/dashboard", "/history", "/billing", "/auth"];

/// Paths the catch-all skips: credential endpoints, framework assets and static files.
/// Running the guard there would cause redirect loops.
const CATCH_ALL_EXCLUSIONS: &str = r"^/(?:api/auth|_next|fonts|(?:favicon\.ico|sitemap\.xml)$)";

/// Decides whether the guard runs for a path at all.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    prefixes: Vec<String>,
    exclusions: Regex,
}

impl RouteMatcher {
    /// # Errors
    /// Returns an error if the exclusion pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            prefixes: GUARDED_PREFIXES.iter().map(ToString::to_string).collect(),
            exclusions: Regex::new(CATCH_ALL_EXCLUSIONS)?,
        })
    }

    #[must_use]
    pub fn applies(&self, path: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| under_prefix(path, prefix))
            || self.catch_all(path)
    }

    fn catch_all(&self, path: &str) -> bool {
        path.starts_with('/') && !self.exclusions.is_match(path)
    }
}

/// `/dashboard` matches `/dashboard` and `/dashboard/...` but not `/dashboards`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
