//! Timer-coalesced write queue.
//!
//! Each sink owns one tokio task. Values scheduled within the quiet period
//! replace each other and only the latest one is written. Writes of a sink
//! never overlap: a value scheduled while a write is running starts a new
//! quiet period once that write returns.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

enum SinkCommand<T> {
    Write(T),
    Cancel,
}

pub struct DebouncedSink<T> {
    name: &'static str,
    tx: mpsc::UnboundedSender<SinkCommand<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> DebouncedSink<T> {
    /// Spawn the sink task on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn<F, Fut>(name: &'static str, delay: Duration, write: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_sink(name, delay, rx, write));
        Self { name, tx, task }
    }

    /// (Re)arm the quiet-period timer with `value` as the pending write.
    pub fn schedule(&self, value: T) {
        if self.tx.send(SinkCommand::Write(value)).is_err() {
            tracing::debug!(sink = self.name, "debounced sink closed, write dropped");
        }
    }

    /// Drop the pending write, if any. A write already running is not interrupted.
    pub fn cancel(&self) {
        if self.tx.send(SinkCommand::Cancel).is_err() {
            tracing::debug!(sink = self.name, "debounced sink closed, nothing to cancel");
        }
    }
}

impl<T> Drop for DebouncedSink<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_sink<T, F, Fut>(
    name: &'static str,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<SinkCommand<T>>,
    write: F,
) where
    F: Fn(T) -> Fut,
    Fut: Future<Output = ()>,
{
    while let Some(command) = rx.recv().await {
        let SinkCommand::Write(mut latest) = command else {
            continue;
        };

        let quiet = sleep(delay);
        tokio::pin!(quiet);
        let mut coalesced = 0_u32;

        let fire = loop {
            tokio::select! {
                () = &mut quiet => break true,
                next = rx.recv() => match next {
                    Some(SinkCommand::Write(value)) => {
                        latest = value;
                        coalesced = coalesced.saturating_add(1);
                        quiet.as_mut().reset(Instant::now() + delay);
                    }
                    Some(SinkCommand::Cancel) => break false,
                    None => return,
                },
            }
        };

        if fire {
            tracing::trace!(sink = name, coalesced, "debounced write firing");
            write(latest).await;
        } else {
            tracing::trace!(sink = name, "pending debounced write cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording_sink(delay_ms: u64) -> (DebouncedSink<u32>, Arc<Mutex<Vec<(u32, Instant)>>>) {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let sink_writes = Arc::clone(&writes);
        let sink = DebouncedSink::spawn("test", Duration::from_millis(delay_ms), move |v| {
            let writes = Arc::clone(&sink_writes);
            async move {
                writes.lock().push((v, Instant::now()));
            }
        });
        (sink, writes)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_values_coalesce_into_latest() {
        let (sink, writes) = recording_sink(250);
        let start = Instant::now();

        sink.schedule(1);
        sleep(Duration::from_millis(100)).await;
        sink.schedule(2);
        sleep(Duration::from_millis(100)).await;
        sink.schedule(3);
        sleep(Duration::from_millis(1_000)).await;

        let writes = writes.lock().clone();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, 3);
        // Quiet period restarts on every value
        assert!(writes[0].1 - start >= Duration::from_millis(450));
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_after_quiet_period_write_separately() {
        let (sink, writes) = recording_sink(250);

        sink.schedule(1);
        sleep(Duration::from_millis(300)).await;
        sink.schedule(2);
        sleep(Duration::from_millis(300)).await;

        let values: Vec<u32> = writes.lock().iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_write() {
        let (sink, writes) = recording_sink(250);

        sink.schedule(1);
        sleep(Duration::from_millis(100)).await;
        sink.cancel();
        sleep(Duration::from_millis(1_000)).await;

        assert!(writes.lock().is_empty());

        sink.schedule(2);
        sleep(Duration::from_millis(300)).await;
        let values: Vec<u32> = writes.lock().iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_write() {
        let (sink, writes) = recording_sink(250);

        sink.schedule(1);
        drop(sink);
        sleep(Duration::from_millis(1_000)).await;

        assert!(writes.lock().is_empty());
    }
}
