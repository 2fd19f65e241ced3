//! The `{success, result, msg, error_code}` wrapper around every Freebox answer

use super::ApiError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps `result`; a successful envelope without one is a parse error.
    pub fn into_result(self, status: u16) -> Result<T, ApiError> {
        if !self.success {
            return Err(self.into_error(status));
        }

        self.result
            .ok_or_else(|| ApiError::Parse("response has no result".to_string()))
    }

    /// Success check for endpoints whose result is ignored
    pub fn into_empty(self, status: u16) -> Result<(), ApiError> {
        if !self.success {
            return Err(self.into_error(status));
        }
        Ok(())
    }

    pub fn into_error(self, status: u16) -> ApiError {
        let message = self.msg.unwrap_or_default();
        let error_code = self.error_code.filter(|code| !code.is_empty());
        if status == 404 || error_code.as_deref() == Some("noent") {
            return ApiError::NotFound {
                status,
                message,
                error_code,
            };
        }
        ApiError::Status {
            status,
            message,
            error_code,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// List endpoints omit `result` when there is nothing to list.
    pub fn into_list(self, status: u16) -> Result<Vec<T>, ApiError> {
        if !self.success {
            return Err(self.into_error(status));
        }
        Ok(self.result.unwrap_or_default())
    }
}
