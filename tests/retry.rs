#[cfg(test)]
mod tests {

    use std::sync::Arc;
    use std::io;
    use filehash::{storage::retry::{with_retry, with_retry_if, RetryConfig}, RegistryError, Result};
    use tokio::sync::Mutex;
    use std::time::Instant;
    use tokio::time::Duration;
    struct MockOperation {
        attempts: Arc<Mutex<u32>>,
        success_after: u32,
        error_message: String,
    }

    impl MockOperation {
        fn new(success_after: u32, error_message: &str) -> Self {
            Self {
                attempts: Arc::new(Mutex::new(0)),
                success_after,
                error_message: error_message.to_string(),
            }
        }

        async fn execute<T: ToString>(&self, success_value: T) -> Result<String> {
            let mut attempts = self.attempts.lock().await;
            *attempts += 1;

            if *attempts > self.success_after {
                Ok(success_value.to_string())
            } else {
                Err(RegistryError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} (Attempt {})", self.error_message, *attempts)
                )))
            }
        }

        async fn get_attempts(&self) -> u32 {
            *self.attempts.lock().await
        }
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let config = RetryConfig::new(3, Duration::from_millis(10));
        let operation = MockOperation::new(0, "Should not see this error");

        let result = with_retry(&config, || {
            let op = &operation;
            async move { op.execute("Success!").await }
        })
        .await;

        assert_eq!(result.unwrap(), "Success!");
        assert_eq!(operation.get_attempts().await, 1);
    }

    #[tokio::test]
    async fn test_success_after_retries() {
        let config = RetryConfig::new(3, Duration::from_millis(20));
        let operation = MockOperation::new(2, "Temporary error");

        let result = with_retry(&config, || {
            let op = &operation;
            async move { op.execute("Success after retry!").await }
        })
        .await;

        assert_eq!(result.unwrap(), "Success after retry!");
        assert_eq!(operation.get_attempts().await, 3);
    }

    #[tokio::test]
    async fn test_permanent_failure() {
        let config = RetryConfig::new(2, Duration::from_millis(20));
        let operation = MockOperation::new(u32::MAX, "Permanent failure");

        let result = with_retry(&config, || {
            let op = &operation;
            async move { op.execute("Should not succeed").await }
        })
        .await;

        let error = result.unwrap_err();
        assert!(error.to_string().contains("Permanent failure"));
        assert_eq!(operation.get_attempts().await, 2);
    }

    #[tokio::test]
    async fn test_exponential_backoff_timing() {
        let config = RetryConfig::new(3, Duration::from_millis(100));
        let operation = MockOperation::new(3, "Testing backoff");

        let start_time = Instant::now();
        let result = with_retry(&config, || {
            let op = &operation;
            async move { op.execute("Should not succeed").await }
        })
        .await;

        let elapsed = start_time.elapsed();
        assert!(result.is_err());

        // 100ms + 200ms between the three attempts
        assert!(elapsed.as_millis() >= 300,
            "Expected at least 300ms delay, got {}ms",
            elapsed.as_millis()
        );
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let config = RetryConfig::new(5, Duration::from_millis(10));
        let attempt_counter = Arc::new(Mutex::new(0));

        let result: Result<()> = with_retry_if(&config, || {
            let counter = Arc::clone(&attempt_counter);
            async move {
                *counter.lock().await += 1;
                Err(RegistryError::InvalidName("../x".to_string()))
            }
        }, |e| matches!(e, RegistryError::Io(_)))
        .await;

        assert!(matches!(result, Err(RegistryError::InvalidName(_))));
        assert_eq!(*attempt_counter.lock().await, 1);
    }

    #[tokio::test]
    async fn test_retry_with_different_error_types() {
        let config = RetryConfig::new(3, Duration::from_millis(10));
        let attempt_counter = Arc::new(Mutex::new(0));

        let result = with_retry(&config, || {
            let counter = Arc::clone(&attempt_counter);
            async move {
                let mut attempts = counter.lock().await;
                *attempts += 1;
                match *attempts {
                    1 => Err(RegistryError::Io(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "Timeout error"
                    ))),
                    2 => Err(RegistryError::Io(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "Connection reset"
                    ))),
                    _ => Ok("Success!")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "Success!");
        assert_eq!(*attempt_counter.lock().await, 3);
    }

    #[test]
    fn test_delay_doubles() {
        let config = RetryConfig::new(5, Duration::from_millis(25));
        assert_eq!(config.delay_for(1), Duration::from_millis(25));
        assert_eq!(config.delay_for(2), Duration::from_millis(50));
        assert_eq!(config.delay_for(4), Duration::from_millis(200));
        assert_eq!(RetryConfig::new(0, Duration::ZERO).max_retries(), 1);
    }
}
