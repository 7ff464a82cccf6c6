//! Wire types for the Meridian HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Request payload for `/web/api/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    #[serde(rename = "loginName")]
    pub login_name: String,
    pub password: String,
}

/// Response payload shared by login and relogin.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub success: bool,

    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,

    #[serde(default, rename = "refreshToken")]
    pub refresh_token: Option<String>,

    /// Human-readable explanation, set on failure
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request payload for `/web/api/relogin`.
#[derive(Debug, Clone, Serialize)]
pub struct ReloginRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Request payload for `/web/api/statement`.
#[derive(Debug, Clone, Serialize)]
pub struct StatementRequest {
    pub statement: String,
}

/// One column of a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: String,
}

/// Result of one executed statement: column metadata, row tuples, and the
/// engine's trailing status message (e.g. "3 rows selected.").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Vec<JsonValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Engine-level error explanation, set on failure responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl QueryOutcome {
    /// Column names in result order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
