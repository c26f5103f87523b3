use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body of `{"status": ...}` style replies (set acknowledgement, credential check).
#[derive(Serialize, Debug, PartialEq)]
pub struct StatusReply<T> {
    pub status: T,
}

/// Body of every JSON error reply.
#[derive(Serialize, Debug, PartialEq)]
pub struct ErrorReply {
    pub error: String,
}

impl ErrorReply {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
