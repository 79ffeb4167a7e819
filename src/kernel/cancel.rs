use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owned handle to a long-lived background task (poll timer, event subscription).
///
/// The task receives a `CancellationToken` and is expected to exit once it fires.
/// Dropping the handle cancels the task, so a handle can never leak a timer.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Spawns `body` on the current tokio runtime.
    pub fn spawn<F, Fut>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task = tokio::spawn(body(token.clone()));
        tracing::debug!(task = name, "background task started");
        Self {
            name,
            token,
            task: Some(task),
        }
    }

    /// Requests cancellation without waiting for the task to observe it.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(task = self.name, "background task stop requested");
            self.token.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels and waits until the task has actually exited.
    pub async fn shutdown(self) {
        self.stop();
        self.wait().await;
    }

    /// Waits for the task to finish on its own (e.g. its stream closed).
    pub async fn wait(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::warn!(task = self.name, "background task panicked: {}", e);
                }
            }
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
