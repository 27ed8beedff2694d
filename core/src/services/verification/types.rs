//! Result types for the code service

use std::time::Duration;

/// Outcome of a successful send; the code itself only leaves through the
/// SMS channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCodeResult {
    /// How long the issued code stays valid
    pub expires_in: Duration,
    /// How long until another send to the same recipient is accepted
    pub resend_after: Duration,
}
