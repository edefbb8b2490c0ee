use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StorageError;

/// The row behind the problem of the day. Exactly one is expected to exist.
#[async_trait]
pub trait ProblemStore: Send + Sync {
    fn problem_id(&self) -> Uuid;

    async fn current_number(&self) -> Result<i64, StorageError>;

    /// Overwrite the stored number. Any value is accepted, zero and negatives included.
    async fn set_current_number(&self, number: i64) -> Result<(), StorageError>;

    /// Add `delta` to the stored number in a single step and return the new value.
    async fn shift_current_number(&self, delta: i64) -> Result<i64, StorageError>;
}

/// Keeps the counter in memory; used for local runs without a database and in tests.
#[derive(Debug)]
pub struct MemoryProblemStore {
    id: Uuid,
    number: Mutex<Option<i64>>,
}

impl MemoryProblemStore {
    pub fn new(id: Uuid, number: i64) -> Self {
        Self {
            id,
            number: Mutex::new(Some(number)),
        }
    }

    /// A store whose singleton row was never seeded.
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            number: Mutex::new(None),
        }
    }

    fn missing(&self) -> StorageError {
        StorageError::NotFound(format!("project_euler row {}", self.id))
    }
}

#[async_trait]
impl ProblemStore for MemoryProblemStore {
    fn problem_id(&self) -> Uuid {
        self.id
    }

    async fn current_number(&self) -> Result<i64, StorageError> {
        let current = *self.number.lock().await;
        current.ok_or_else(|| self.missing())
    }

    async fn set_current_number(&self, number: i64) -> Result<(), StorageError> {
        let mut current = self.number.lock().await;
        match current.as_mut() {
            Some(n) => {
                *n = number;
                Ok(())
            }
            None => Err(self.missing()),
        }
    }

    async fn shift_current_number(&self, delta: i64) -> Result<i64, StorageError> {
        let mut current = self.number.lock().await;
        let n = current.as_mut().ok_or_else(|| self.missing())?;
        let shifted = n.checked_add(delta).ok_or_else(|| {
            StorageError::InvalidData(format!("project_euler number {n} cannot move by {delta}"))
        })?;
        *n = shifted;
        Ok(shifted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_read_should_return_written_number() {
        let store = MemoryProblemStore::new(Uuid::new_v4(), 1);
        store.set_current_number(17).await.unwrap();
        assert_eq!(store.current_number().await.unwrap(), 17);
    }

    #[tokio::test]
    async fn unseeded_store_should_report_missing_row() {
        let store = MemoryProblemStore::empty(Uuid::new_v4());
        assert!(matches!(
            store.current_number().await,
            Err(StorageError::NotFound(_))
        ));
        assert!(store.set_current_number(3).await.is_err());
        assert!(store.shift_current_number(1).await.is_err());
    }

    #[tokio::test]
    async fn shift_past_i64_bounds_should_fail_and_keep_number() {
        let store = MemoryProblemStore::new(Uuid::new_v4(), i64::MAX);
        assert!(matches!(
            store.shift_current_number(1).await,
            Err(StorageError::InvalidData(_))
        ));
        assert_eq!(store.current_number().await.unwrap(), i64::MAX);

        store.set_current_number(i64::MIN).await.unwrap();
        assert!(store.shift_current_number(-1).await.is_err());
        assert_eq!(store.current_number().await.unwrap(), i64::MIN);
    }
}
