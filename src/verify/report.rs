use crate::http::method::HttpMethod;

/// Outcome of a single verification performed within a session.
#[derive(Debug, Clone)]
pub struct CheckRecord {
    pub endpoint: String,
    pub method: HttpMethod,
    pub passed: bool,
    pub duration_ms: u128,
}

/// In-memory summary of one session's verifications. Never persisted;
/// intended for inspection by the owning test case.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u128,
    pub records: Vec<CheckRecord>,
}

impl RunReport {
    pub fn from_records(records: Vec<CheckRecord>) -> Self {
        let total = records.len();
        let passed = records.iter().filter(|r| r.passed).count();
        let duration_ms = records.iter().map(|r| r.duration_ms).sum();
        Self {
            total,
            passed,
            failed: total - passed,
            duration_ms,
            records,
        }
    }
}
