//! Credential supply for upstream calls.

pub mod pool;

use async_trait::async_trait;

use crate::error::CredentialError;

pub use pool::KeyPool;

/// Yields one credential per upstream call.
///
/// Implementations own their rotation and contention policy. The router
/// reports call outcomes back so a pool can retire failing keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialSupplier: Send + Sync {
    /// Next usable credential.
    async fn next_credential(&self) -> Result<String, CredentialError>;

    /// The call made with `credential` succeeded.
    async fn report_success(&self, _credential: &str) {}

    /// The call made with `credential` failed with an upstream status.
    async fn report_failure(&self, _credential: &str, _status_code: u16) {}
}
