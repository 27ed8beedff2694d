//! Code store capability

use async_trait::async_trait;

use crate::context::Context;
use crate::errors::CodeError;

/// Atomic store holding at most one live code per scope and phone number.
///
/// Implementations must perform each operation as one indivisible
/// check-and-mutate step with respect to other callers on the same key.
#[async_trait]
pub trait CodeCacheTrait: Send + Sync {
    /// Store `code` for `phone` in `scope` with a fresh attempt budget.
    ///
    /// Fails with `SendTooFrequent` while the previous code for the key was
    /// issued less than the resend interval ago.
    async fn set(&self, ctx: &Context, scope: &str, phone: &str, code: &str)
        -> Result<(), CodeError>;

    /// Spend one attempt comparing `input` with the stored code.
    ///
    /// `NotFound` when no live code exists, `VerifyTooMany` once the budget
    /// is spent. A match does not remove the code.
    async fn verify(
        &self,
        ctx: &Context,
        scope: &str,
        phone: &str,
        input: &str,
    ) -> Result<bool, CodeError>;
}
