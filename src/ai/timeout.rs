//! Timeout wrapper for the model call
//!
//! The HTTP client carries its own timeout; this wrapper bounds the whole
//! invocation (connect, send, body decode) with one deadline and maps expiry
//! onto `UnifyError::Timeout`.

use std::future::Future;
use std::time::Duration;

use crate::types::{Result, UnifyError};

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
///
/// ```ignore
/// let response = with_timeout(
///     Duration::from_secs(300),
///     provider.invoke(&request),
///     "model invocation"
/// ).await?;
/// ```
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(UnifyError::timeout(operation_name, timeout)),
    }
}
