/// Per-connection lifecycle state.
///
/// ```text
/// NEW -> AUTHENTICATING -> AUTHENTICATED -> PROVISIONING -> ATTACHING -> RUNNING -> TEARDOWN -> GONE
///                        \-> REJECTED -> GONE
///                                         (any state can move to TEARDOWN on a fatal error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    Authenticating,
    Authenticated,
    Rejected,
    Provisioning,
    Attaching,
    Running,
    Teardown,
    Gone,
}

impl SessionState {
    /// Resize requests are only meaningful while the pump is live.
    pub fn accepts_resize(self) -> bool {
        matches!(self, SessionState::Running)
    }

    /// Whether this state still owns resources that `teardown` must release.
    pub fn needs_teardown(self) -> bool {
        !matches!(self, SessionState::New | SessionState::Rejected | SessionState::Teardown | SessionState::Gone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_only_accepted_while_running() {
        assert!(!SessionState::New.accepts_resize());
        assert!(!SessionState::Attaching.accepts_resize());
        assert!(SessionState::Running.accepts_resize());
        assert!(!SessionState::Teardown.accepts_resize());
    }

    #[test]
    fn teardown_only_needed_past_authentication() {
        assert!(!SessionState::New.needs_teardown());
        assert!(!SessionState::Rejected.needs_teardown());
        assert!(SessionState::Authenticated.needs_teardown());
        assert!(SessionState::Provisioning.needs_teardown());
        assert!(SessionState::Running.needs_teardown());
        assert!(!SessionState::Gone.needs_teardown());
    }
}
