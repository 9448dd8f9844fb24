use serde::Serialize;
use std::fmt::Display;

/// Uniform result handed to UI callers: `{success, data?, error?}`.
#[derive(Debug, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Outcome {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Outcome {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(self.error.unwrap_or_else(|| "missing data".to_owned())),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for Outcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(e) => Outcome::err(e.to_string()),
        }
    }
}
