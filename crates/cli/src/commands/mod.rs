pub mod catalog;
pub mod config;
pub mod simulate;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(output: String) -> Self {
        Self { exit_code: 0, output }
    }

    pub fn failure(message: impl Into<String>, exit_code: u8) -> Self {
        Self { exit_code, output: message.into() }
    }
}

pub(crate) fn serialize_payload<T: serde::Serialize>(payload: &T) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|error| {
        format!("{{\"status\":\"error\",\"message\":\"serialization failed: {error}\"}}")
    })
}
