//! Task group
//!
//! Tasks of one session share a cancellation token. The first task to fail
//! cancels it; `wait` joins every task and reports the first failure.

use log::{error, info};
use std::future::Future;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, RunError};

pub struct TaskGroup {
    tasks: JoinSet<(String, Result<()>)>,
    cancel: CancellationToken,
}

impl TaskGroup {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            tasks: JoinSet::new(),
            cancel,
        }
    }

    /// Token the tasks observe at their blocking points
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn spawn<F>(&mut self, name: &str, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let name = name.to_string();
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            let result = task.await;
            if let Err(e) = &result {
                error!("[{}] {}", name, e);
                cancel.cancel();
            }
            (name, result)
        });
    }

    /// Join all tasks; the first error wins
    pub async fn wait(mut self) -> Result<()> {
        let mut first_error = None;
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((name, Ok(()))) => info!("[{}] Finished", name),
                Ok((_, Err(e))) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    self.cancel.cancel();
                    first_error.get_or_insert(RunError::Task {
                        name: "unknown".into(),
                        message: e.to_string(),
                    });
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
