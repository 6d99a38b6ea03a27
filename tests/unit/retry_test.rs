//! Unit tests for the retry controller

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use imagegen_studio::provider::RetryController;
use imagegen_studio::AppError;

fn controller() -> RetryController {
    RetryController::new(3, Duration::from_millis(1))
}

#[tokio::test]
async fn test_success_on_third_attempt() {
    let calls = AtomicU32::new(0);
    let result = controller()
        .run(|attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(AppError::Api {
                        status: 502,
                        message: "bad gateway".into(),
                    })
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

    assert_eq!(assert_ok!(result), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried() {
    let calls = AtomicU32::new(0);
    let result: Result<(), AppError> = controller()
        .run(|_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(AppError::Api {
                    status: 400,
                    message: "bad prompt".into(),
                })
            }
        })
        .await;

    assert!(matches!(assert_err!(result), AppError::Api { status: 400, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_timeout_text_is_transient() {
    let calls = AtomicU32::new(0);
    let result: Result<(), AppError> = controller()
        .run(|_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Internal("upstream Timeout while reading".into())) }
        })
        .await;

    match assert_err!(result) {
        AppError::RetriesExhausted { attempts, message } => {
            assert_eq!(attempts, 3);
            assert!(message.contains("upstream Timeout"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_backoff_is_linear() {
    let retry = RetryController::new(5, Duration::from_millis(2000));
    assert_eq!(retry.backoff(1), Duration::from_millis(2000));
    assert_eq!(retry.backoff(2), Duration::from_millis(4000));
    assert_eq!(retry.backoff(4), Duration::from_millis(8000));
}

#[test]
fn test_single_attempt_minimum() {
    assert_eq!(RetryController::new(0, Duration::from_millis(1)).max_attempts(), 1);
}
