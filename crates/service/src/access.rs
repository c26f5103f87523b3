use std::{fmt, sync::Arc};

/// Gate for mutating operations: one process-wide admin credential,
/// fixed at startup.
#[derive(Clone)]
pub struct AccessController {
    admin_password: Arc<str>,
}

impl AccessController {
    pub fn new(admin_password: impl Into<String>) -> Self {
        Self { admin_password: Arc::from(admin_password.into()) }
    }

    /// Exact, case-sensitive match against the admin credential.
    /// An empty candidate never matches.
    pub fn authorize(&self, supplied: &str) -> bool {
        !supplied.is_empty() && supplied == &*self.admin_password
    }
}

impl fmt::Debug for AccessController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessController").field("admin_password", &"<redacted>").finish()
    }
}
