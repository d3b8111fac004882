//! Runs blocking storage work with a deadline so a slow database cannot hang a
//! request.

use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use crate::Error;

thread_local! {
    static DEADLINE: Cell<Option<Instant>> = const { Cell::new(None) };
}

/// Sets the deadline for the operation running on the current blocking thread
/// and clears it on drop, including when the operation panics.
struct DeadlineGuard;

impl DeadlineGuard {
    fn set(deadline: Instant) -> Self {
        DEADLINE.with(|current| current.set(Some(deadline)));
        Self
    }
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        DEADLINE.with(|current| current.set(None));
    }
}

/// Whether the deadline of the operation running on this thread has passed.
///
/// Always `false` outside of [with_deadline].
pub(crate) fn deadline_passed() -> bool {
    DEADLINE.with(|current| {
        current
            .get()
            .is_some_and(|deadline| Instant::now() >= deadline)
    })
}

/// Run `operation` on the blocking thread pool and wait at most `timeout` for
/// it to finish.
///
/// The deadline also travels with the operation: once it has passed,
/// [lock_connection](crate::db::lock_connection) refuses to hand out the
/// connection. An operation that was still queued behind the database lock
/// when the caller gave up therefore never writes anything.
///
/// # Errors
///
/// Returns:
/// - the operation's own error if it fails,
/// - [Error::Timeout] if `timeout` elapses first,
/// - [Error::Internal] if the operation panicked.
pub async fn with_deadline<T, F>(timeout: Duration, operation: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    let deadline = Instant::now() + timeout;
    let task = tokio::task::spawn_blocking(move || {
        let _guard = DeadlineGuard::set(deadline);
        operation()
    });

    match tokio::time::timeout_at(deadline.into(), task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            tracing::error!("blocking task failed: {join_error}");
            Err(Error::Internal(join_error.to_string()))
        }
        Err(_) => {
            tracing::warn!("operation did not finish within {timeout:?}");
            Err(Error::Timeout)
        }
    }
}

#[cfg(test)]
mod deadline_tests {
    use std::{
        sync::{Arc, Mutex, mpsc},
        thread,
        time::Duration,
    };

    use rusqlite::Connection;

    use crate::{
        DomainError, Error,
        db::lock_connection,
        domain_error::{ErrorContext, ResourceKind, classify},
    };

    use super::{deadline_passed, with_deadline};

    #[tokio::test]
    async fn returns_result_of_fast_operation() {
        let got = with_deadline(Duration::from_secs(1), || Ok(42)).await;

        assert_eq!(got, Ok(42));
    }

    #[tokio::test]
    async fn passes_operation_error_through() {
        let got: Result<(), Error> = with_deadline(Duration::from_secs(1), || {
            Err(DomainError::validation("bad input").into())
        })
        .await;

        assert_eq!(got, Err(DomainError::validation("bad input").into()));
    }

    #[tokio::test]
    async fn slow_operation_times_out() {
        let got = with_deadline(Duration::from_millis(10), || {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        })
        .await;

        assert_eq!(got, Err(Error::Timeout));
    }

    #[tokio::test]
    async fn panicking_operation_is_internal_error() {
        let got: Result<(), Error> =
            with_deadline(Duration::from_secs(1), || panic!("storage exploded")).await;

        assert!(matches!(got, Err(Error::Internal(_))));
    }

    #[tokio::test]
    async fn operation_sees_its_own_deadline() {
        let expired = with_deadline(Duration::from_millis(10), || {
            thread::sleep(Duration::from_millis(50));
            Ok(deadline_passed())
        })
        .await;
        thread::sleep(Duration::from_millis(100));

        let fresh = with_deadline(Duration::from_secs(1), || Ok(deadline_passed())).await;

        assert_eq!(expired, Err(Error::Timeout));
        assert_eq!(fresh, Ok(false));
        assert!(!deadline_passed());
    }

    #[tokio::test]
    async fn write_waiting_on_lock_past_deadline_is_dropped() {
        let connection = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        connection
            .lock()
            .unwrap()
            .execute("CREATE TABLE note (text TEXT NOT NULL)", ())
            .unwrap();
        let (locked_tx, locked_rx) = mpsc::channel();
        let holder = {
            let connection = connection.clone();
            thread::spawn(move || {
                let _connection = connection.lock().unwrap();
                locked_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(300));
            })
        };
        locked_rx.recv().unwrap();

        let writer = connection.clone();
        let got = with_deadline(Duration::from_millis(50), move || {
            let context = ErrorContext::new(ResourceKind::Category);
            let connection = lock_connection(&writer).map_err(|error| classify(error, &context))?;
            connection
                .execute("INSERT INTO note (text) VALUES ('too late')", ())
                .map_err(|error| classify(error.into(), &context))?;
            Ok(())
        })
        .await;
        holder.join().unwrap();
        // Give the abandoned operation time to acquire the lock and return.
        thread::sleep(Duration::from_millis(100));

        assert_eq!(got, Err(Error::Timeout));
        let count: i64 = connection
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM note", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
