use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::errors::{ErrorResponse, RpcError};

/// Request envelope read from the command topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub cmd: String,

    #[serde(default)]
    pub payload: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommandReply {
    Success {
        correlation_id: Option<String>,
        data: Value,
    },
    Error {
        correlation_id: Option<String>,
        error: ErrorResponse,
    },
}

impl CommandReply {
    pub fn from_result(correlation_id: Option<String>, result: Result<Value, RpcError>) -> Self {
        match result {
            Ok(data) => CommandReply::Success {
                correlation_id,
                data,
            },
            Err(err) => CommandReply::Error {
                correlation_id,
                error: err.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandReply::Success { .. })
    }
}
