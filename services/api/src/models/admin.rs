//! Admin reporting models

use serde::Serialize;

/// Number of requests posted for one aid type
#[derive(Debug, Clone, Serialize)]
pub struct AidTypeCount {
    pub aid_type: String,
    pub request_count: i64,
}
