//! Bounded waits for remote calls.
//!
//! Remote providers do not guarantee bounded latency. Every port call made
//! by the domain services goes through [`within`], which turns an elapsed
//! limit into [`ErrorCode::NetworkError`](crate::domain::ErrorCode).

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::Error;

/// Default limit applied to remote calls.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Await `call` for at most `limit`, mapping port errors with `map_error`.
pub async fn within<T, E, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
    map_error: impl FnOnce(E) -> Error,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(map_error),
        Err(_) => {
            warn!(operation, limit_ms = limit.as_millis(), "remote call timed out");
            Err(Error::network(format!(
                "{operation} did not complete within {} ms",
                limit.as_millis()
            )))
        }
    }
}
