//! System monitor endpoints

use serde::Serialize;

use super::common::FortiResponse;
use super::error::ApiError;

const SYSTEM_STATUS_PATH: &str = "/api/v2/monitor/system/status";

/// Identity of the target appliance
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SystemStatus {
    /// Firmware version without the leading `v`, e.g. `7.2.0`
    pub version: String,
    pub build: Option<u64>,
    pub serial: Option<String>,
    pub hostname: Option<String>,
    pub model: Option<String>,
}

impl SystemStatus {
    fn from_response(response: FortiResponse) -> Result<Self, ApiError> {
        let version = response
            .version
            .as_deref()
            .map(normalize_version)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::ParseError("system status has no version".to_string()))?;

        let field = |name: &str| {
            response
                .first_result()
                .and_then(|r| r.get(name))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Ok(Self {
            hostname: field("hostname"),
            model: field("model_name"),
            serial: response.serial.clone(),
            build: response.build,
            version,
        })
    }
}

/// `v7.2.0` -> `7.2.0`
pub fn normalize_version(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['v', 'V'])
        .to_string()
}

impl super::Client {
    pub async fn get_system_status(&self) -> Result<SystemStatus, ApiError> {
        let response = self.get(SYSTEM_STATUS_PATH).await?;
        SystemStatus::from_response(response)
    }
}
