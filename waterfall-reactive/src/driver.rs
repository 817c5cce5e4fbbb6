use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Something the driver can feed events to and wake up when its reflow timer
/// fires.
pub trait ReflowTarget: Send + 'static {
    type Event: Send + 'static;

    fn handle_event(&mut self, event: Self::Event);

    /// Run a pass if one is due.
    fn poll_reflow(&mut self);

    /// When the next pass is due, `None` if nothing is armed.
    fn next_deadline(&self) -> Option<Instant>;

    /// Release timers and observers before the driver stops.
    fn teardown(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    Running,
    ShuttingDown,
    Stopped,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("reflow driver already shut down")]
    AlreadyShutDown,
    #[error("reflow driver task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Runs a [`ReflowTarget`] on a tokio task.
///
/// Events are delivered in order on a single task, and the target's reflow
/// deadline is awaited with `tokio::time::sleep_until`, so passes never
/// overlap. Dropping the driver signals the task to tear the target down.
pub struct ReflowDriver<T: ReflowTarget> {
    events: mpsc::UnboundedSender<T::Event>,
    shutdown: Option<oneshot::Sender<()>>,
    phase: watch::Receiver<DriverPhase>,
    task: Option<JoinHandle<T>>,
}

impl<T: ReflowTarget> ReflowDriver<T> {
    /// Must be called from inside a tokio runtime.
    pub fn spawn(target: T) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (phase_tx, phase_rx) = watch::channel(DriverPhase::Running);

        let task = tokio::spawn(run_target(target, events_rx, shutdown_rx, phase_tx));

        Self {
            events: events_tx,
            shutdown: Some(shutdown_tx),
            phase: phase_rx,
            task: Some(task),
        }
    }

    pub fn send(&self, event: T::Event) -> Result<(), DriverError> {
        self.events.send(event).map_err(|_| DriverError::AlreadyShutDown)
    }

    pub fn phase(&self) -> DriverPhase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<DriverPhase> {
        self.phase.clone()
    }

    /// Stop the task and hand the target back.
    pub async fn shutdown(mut self) -> Result<T, DriverError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let task = self.task.take().ok_or(DriverError::AlreadyShutDown)?;
        Ok(task.await?)
    }
}

impl<T: ReflowTarget> Drop for ReflowDriver<T> {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn run_target<T: ReflowTarget>(
    mut target: T,
    mut events: mpsc::UnboundedReceiver<T::Event>,
    mut shutdown: oneshot::Receiver<()>,
    phase: watch::Sender<DriverPhase>,
) -> T {
    tracing::debug!("reflow driver started");

    loop {
        let deadline = target.next_deadline();
        tokio::select! {
            _ = &mut shutdown => break,
            event = events.recv() => match event {
                Some(event) => target.handle_event(event),
                None => break,
            },
            _ = sleep_until_deadline(deadline) => target.poll_reflow(),
        }
    }

    phase.send_replace(DriverPhase::ShuttingDown);
    target.teardown();
    phase.send_replace(DriverPhase::Stopped);
    tracing::debug!("reflow driver stopped");
    target
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
