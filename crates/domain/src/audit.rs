use serde::Serialize;

/// Outcome of a bounded enablement audit.
///
/// `flagged` may contain false positives when `truncated` is set: a marker
/// beyond the marker scan budget was never observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditResult {
    /// Candidate projects without an observed marker, in candidate order.
    pub flagged: Vec<String>,
    /// Number of distinct candidate projects examined.
    pub scanned_count: usize,
    /// True when either scan stopped on its budget.
    pub truncated: bool,
    /// Number of distinct projects referenced by markers.
    pub marker_count: usize,
    /// Pages fetched by the candidate scan.
    pub candidate_pages: u32,
    /// Pages fetched by the marker scan.
    pub marker_pages: u32,
}

impl AuditResult {
    /// Human readable caveat describing how much was examined.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        if self.scanned_count == 0 {
            return Some("No active projects found in scope.".to_owned());
        }

        self.truncated.then(|| {
            format!(
                "Scanned first {} projects against {} enabled markers; results may be incomplete. \
                 Re-run with a larger budget.",
                self.scanned_count, self.marker_count
            )
        })
    }
}
