use serde::{Deserialize, Serialize};

pub const HEALTH_MESSAGE: &str = "Echoes of Community API is running";

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub message: &'static str,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok", message: HEALTH_MESSAGE }
    }
}

/// `{"message": "..."}`, the body shape of every acknowledgement and error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
