use std::future::Future;

use tokio::sync::RwLock;

/// Read cache for one table.
///
/// Filled by the first full read, emptied wholesale by [`TableCache::invalidate`]
/// after any write to the table.
pub struct TableCache<T> {
    rows: RwLock<Option<Vec<T>>>,
}

impl<T> Default for TableCache<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(None),
        }
    }
}

impl<T: Clone> TableCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rows, loading them with `load` on a miss.
    ///
    /// A failed load leaves the cache empty.
    pub async fn get_or_load<E, F, Fut>(&self, load: F) -> Result<Vec<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if let Some(rows) = self.rows.read().await.as_ref() {
            return Ok(rows.clone());
        }

        let mut guard = self.rows.write().await;
        if let Some(rows) = guard.as_ref() {
            return Ok(rows.clone());
        }
        let rows = load().await?;
        *guard = Some(rows.clone());
        Ok(rows)
    }

    pub async fn invalidate(&self) {
        *self.rows.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn loads_once_until_invalidated() {
        let cache = TableCache::<u32>::new();
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(vec![1, 2, 3])
        };

        assert_eq!(cache.get_or_load(load).await.unwrap(), [1, 2, 3]);
        assert_eq!(cache.get_or_load(load).await.unwrap(), [1, 2, 3]);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        cache.invalidate().await;
        cache.get_or_load(load).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let cache = TableCache::<u32>::new();
        assert!(cache.get_or_load(|| async { Err("down") }).await.is_err());
        let rows = cache.get_or_load(|| async { Ok::<_, &str>(vec![7]) }).await;
        assert_eq!(rows, Ok(vec![7]));
    }
}
