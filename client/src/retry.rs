//! Single fallback retry after a timeout.
//!
//! A request that times out on its first attempt is re-issued exactly once.
//! The retry is marked with `retry_count = 1`, so a second timeout is
//! returned to the caller instead of starting another round.
//!
//! Only timeouts qualify. Network errors and error statuses are returned
//! as they are.

use crate::descriptor::RequestDescriptor;
use crate::error::ApiError;
use std::future::Future;

/// Run `attempt`, and once more on the fallback path if it timed out.
///
/// `prepare_retry` receives the descriptor with `retry_count` already set
/// to 1 and may rewrite it (fresh credentials). If it fails, the retry is
/// not sent and its error is returned.
///
/// Returns the descriptor of the last attempt alongside its outcome.
pub async fn retry_once_on_timeout<T, F, Fut, P>(
    request: RequestDescriptor,
    mut attempt: F,
    prepare_retry: P,
) -> (RequestDescriptor, Result<T, ApiError>)
where
    F: FnMut(RequestDescriptor) -> Fut,
    Fut: Future<Output = (RequestDescriptor, Result<T, ApiError>)>,
    P: FnOnce(RequestDescriptor) -> Result<RequestDescriptor, ApiError>,
{
    let (request, outcome) = attempt(request).await;

    match outcome {
        Err(error) if error.is_timeout() && request.retry_count == 0 => {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                %error,
                "Request timed out, retrying once on fallback transport"
            );
            metrics::counter!("questionnaire_client_retries_total").increment(1);

            let mut retry = request.clone();
            retry.retry_count = 1;
            match prepare_retry(retry) {
                Ok(retry) => {
                    let (retry, outcome) = attempt(retry).await;
                    if outcome.is_ok() {
                        tracing::info!(path = %retry.path, "Request succeeded after retry");
                    }
                    (retry, outcome)
                }
                Err(prepare_error) => (request, Err(prepare_error)),
            }
        }
        outcome => (request, outcome),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn request() -> RequestDescriptor {
        RequestDescriptor::new(Method::GET, "http://h/api", "/questionnaire/list")
    }

    fn timeout() -> ApiError {
        ApiError::timeout(Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_success_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let (last, outcome) = retry_once_on_timeout(
            request(),
            move |req| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { (req, Ok::<_, ApiError>(1)) }
            },
            Ok,
        )
        .await;

        assert_eq!(outcome.unwrap(), 1);
        assert_eq!(last.retry_count, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_then_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let (last, outcome) = retry_once_on_timeout(
            request(),
            move |req| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        (req, Err(timeout()))
                    } else {
                        (req, Ok("retried"))
                    }
                }
            },
            Ok,
        )
        .await;

        assert_eq!(outcome.unwrap(), "retried");
        assert_eq!(last.retry_count, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_timeout_is_returned() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let (_, outcome) = retry_once_on_timeout(
            request(),
            move |req| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { (req, Err::<(), _>(timeout())) }
            },
            Ok,
        )
        .await;

        assert!(outcome.unwrap_err().is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_already_retried_request_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut already_retried = request();
        already_retried.retry_count = 1;

        let (_, outcome) = retry_once_on_timeout(
            already_retried,
            move |req| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { (req, Err::<(), _>(timeout())) }
            },
            Ok,
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_network_error_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let (_, outcome) = retry_once_on_timeout(
            request(),
            move |req| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    (
                        req,
                        Err::<(), _>(ApiError::Network {
                            detail: "refused".to_string(),
                        }),
                    )
                }
            },
            Ok,
        )
        .await;

        assert!(matches!(outcome, Err(ApiError::Network { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_preparation_skips_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let (_, outcome) = retry_once_on_timeout(
            request(),
            move |req| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { (req, Err::<(), _>(timeout())) }
            },
            |_| Err(ApiError::Client("bad token".to_string())),
        )
        .await;

        assert_eq!(outcome.unwrap_err(), ApiError::Client("bad token".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
