//! Single retry for transient storage failures.

use std::future::Future;

use tracing::warn;

use vaultshare_core::error::ErrorKind;
use vaultshare_core::result::AppResult;

/// Run `op`, retrying up to `retries` more times when it fails with a
/// [`ErrorKind::Storage`] error. Missing objects and every other kind are
/// returned immediately.
pub async fn with_retry<T, F, Fut>(retries: u32, op_name: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if e.is(ErrorKind::Storage) && attempt < retries => {
                attempt += 1;
                warn!(op = op_name, attempt, error = %e, "Retrying storage operation");
            }
            result => return result,
        }
    }
}
