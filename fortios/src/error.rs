use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum FortiosError {
    #[error("{}", describe_mismatch(.field.as_deref(), .version, .required))]
    VersionMismatch {
        field: Option<String>,
        version: String,
        required: String,
    },

    #[error("Invalid FortiOS version: {0:?}")]
    InvalidVersion(String),

    #[error("Malformed netmask: {0:?}")]
    MalformedNetmask(String),

    #[error("Error reading {field}: {source}")]
    FieldWriteRejected {
        field: String,
        #[source]
        source: tfdata::TfdataError,
    },

    #[error("Error {operation} {resource} resource: {source}")]
    Api {
        resource: String,
        operation: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("{0} is required")]
    MissingAttribute(String),

    #[error("Provider configuration error: {0}")]
    Config(String),

    #[error("Provider not configured")]
    NotConfigured,

    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

pub type Result<T> = std::result::Result<T, FortiosError>;

impl FortiosError {
    pub(crate) fn api(resource: &str, operation: &'static str) -> impl FnOnce(ApiError) -> Self {
        let resource = resource.to_string();
        move |source| FortiosError::Api {
            resource,
            operation,
            source,
        }
    }
}

fn describe_mismatch(field: Option<&str>, version: &str, required: &str) -> String {
    match field {
        Some(field) => format!(
            "Argument '{}' is not supported by FortiOS version {}, requires version {}",
            field, version, required
        ),
        None => format!(
            "FortiOS version {} does not satisfy version constraint {}",
            version, required
        ),
    }
}
