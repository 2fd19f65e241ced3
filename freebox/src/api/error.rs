use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer, or an envelope with `success: false`
    #[error("{}", status_message(.status, .message, .error_code))]
    Status {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP 404, or an envelope with `error_code: noent`
    #[error("{}", status_message(.status, .message, .error_code))]
    NotFound {
        status: u16,
        message: String,
        error_code: Option<String>,
    },
}

impl ApiError {
    /// Freebox `error_code` carried by the failure, if any
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ApiError::Status { error_code, .. } | ApiError::NotFound { error_code, .. } => {
                error_code.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

fn status_message(status: &u16, message: &str, error_code: &Option<String>) -> String {
    match error_code.as_deref() {
        Some(code) if !code.is_empty() => match describe_error_code(code) {
            Some(description) => format!(
                "status {}: {} (error_code={}: {})",
                status, message, code, description
            ),
            None => format!("status {}: {} (error_code={})", status, message, code),
        },
        _ => format!("status {}: {}", status, message),
    }
}

/// Human readable meaning of the error codes documented by the Freebox OS API
pub fn describe_error_code(code: &str) -> Option<&'static str> {
    let description = match code {
        "inval" => "invalid argument",
        "inval_netmask" => "invalid netmask",
        "inval_ip_range" => "invalid IP range",
        "inval_ip_range_net" => "IP range & netmask mismatch",
        "inval_gw_net" => "gateway & netmask mismatch",
        "exist" => "already exists",
        "nodev" => "no such device",
        "noent" => "no such entry",
        "netdown" => "network is down",
        "busy" => "device or resource busy",
        "auth_required" => "auth required",
        "invalid_token" => "invalid app token",
        "pending_token" => "app token not yet validated",
        "insufficient_rights" => "insufficient rights",
        "denied_from_external_ip" => "denied from external ip",
        "invalid_request" => "invalid request",
        "ratelimited" => "too many auth errors",
        "new_apps_denied" => "new application requests denied",
        "apps_denied" => "API access from apps disabled",
        "internal_error" => "internal error",
        _ => return None,
    };
    Some(description)
}
