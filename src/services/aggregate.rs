//! Named concurrent sub-queries joined into one result set
//!
//! Every sub-query runs as its own task. [`Aggregate::run`] waits for all of
//! them to finish, then yields either every result keyed by name or the first
//! error in completion order. Results of the other sub-queries are dropped on
//! failure and never reach the caller.

use std::{any::Any, collections::HashMap, future::Future};

use tokio::task::JoinSet;

use crate::error::{AppError, AppResult};

type Erased = Box<dyn Any + Send>;

#[derive(Default)]
pub struct Aggregate {
    tasks: JoinSet<(&'static str, AppResult<Erased>)>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a sub-query under `name`
    pub fn query<T, F>(mut self, name: &'static str, query: F) -> Self
    where
        T: Send + 'static,
        F: Future<Output = AppResult<T>> + Send + 'static,
    {
        self.tasks.spawn(async move {
            let result = query.await.map(|value| Box::new(value) as Erased);
            (name, result)
        });
        self
    }

    /// Wait for every sub-query and join their results
    pub async fn run(mut self) -> AppResult<Joined> {
        let mut results = HashMap::new();
        let mut first_error = None;

        while let Some(joined) = self.tasks.join_next().await {
            let error = match joined {
                Ok((name, Ok(value))) => {
                    results.insert(name, value);
                    continue;
                }
                Ok((name, Err(e))) => {
                    tracing::debug!(query = name, "Sub-query failed: {}", e);
                    e
                }
                Err(e) => AppError::Internal(format!("Sub-query task failed: {}", e)),
            };
            if first_error.is_none() {
                first_error = Some(error);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(Joined { results }),
        }
    }
}

/// Results of a successful aggregation, keyed by sub-query name
pub struct Joined {
    results: HashMap<&'static str, Erased>,
}

impl Joined {
    /// Take the result of sub-query `name`
    pub fn take<T: 'static>(&mut self, name: &str) -> AppResult<T> {
        let value = self
            .results
            .remove(name)
            .ok_or_else(|| AppError::Internal(format!("No sub-query named {}", name)))?;
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| AppError::Internal(format!("Sub-query {} has another result type", name)))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.results.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::Duration,
    };

    #[tokio::test]
    async fn test_results_keyed_by_name() {
        let mut joined = Aggregate::new()
            .query("count", async { Ok(5_i64) })
            .query("names", async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(vec!["Dune".to_string()])
            })
            .run()
            .await
            .unwrap();

        assert_eq!(joined.len(), 2);
        assert_eq!(joined.take::<i64>("count").unwrap(), 5);
        assert_eq!(joined.take::<Vec<String>>("names").unwrap(), vec!["Dune".to_string()]);
        assert!(joined.is_empty());
    }

    #[tokio::test]
    async fn test_first_error_wins_and_siblings_complete() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let result = Aggregate::new()
            .query("slow", async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(1_i64)
            })
            .query("first", async {
                Err::<i64, _>(AppError::NotFound("Book 1 not found".into()))
            })
            .query("second", async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<i64, _>(AppError::Internal("later".into()))
            })
            .run()
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_query_is_internal_error() {
        let result = Aggregate::new()
            .query("boom", async {
                if true {
                    panic!("sub-query panicked");
                }
                Ok(0_i64)
            })
            .run()
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_take_checks_name_and_type() {
        let mut joined = Aggregate::new().query("count", async { Ok(1_i64) }).run().await.unwrap();
        assert!(matches!(joined.take::<String>("count"), Err(AppError::Internal(_))));
        assert!(matches!(joined.take::<i64>("missing"), Err(AppError::Internal(_))));
    }
}
