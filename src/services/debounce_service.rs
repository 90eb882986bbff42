//! Trailing-edge debounce for input change notifications.
//!
//! A background task owns the pending flag and the settling timer. Each
//! notification pushes the deadline back by the full settling interval;
//! once the interval elapses without a notification the callback fires once.

use async_std::channel::{self, Receiver, Sender, TryRecvError};
use async_std::future;
use async_std::task::{self, JoinHandle};
use log::{debug, trace};
use std::sync::Arc;
use std::time::Duration;

/// Handle to a running debounce task. Dropping it stops the task.
pub struct DebounceService {
    notify: Sender<()>,
    _task: JoinHandle<()>,
}

/// What the loop does once the settling timer ran out.
#[derive(Debug, PartialEq, Eq)]
enum Expiry {
    /// A notification slipped in as the timer fired; wait another interval.
    Rearm,
    Fire,
    Stop,
}

/// Checks for a notification that raced the timeout. The change wins.
fn on_expiry(changes: &Receiver<()>) -> Expiry {
    match changes.try_recv() {
        Ok(()) => Expiry::Rearm,
        Err(TryRecvError::Empty) => Expiry::Fire,
        Err(TryRecvError::Closed) => Expiry::Stop,
    }
}

/// Runs the pending/idle state machine until the channel closes.
async fn run_debounce_loop<F>(settle: Duration, changes: Receiver<()>, on_settled: Arc<F>)
where
    F: Fn() + Send + Sync + 'static,
{
    let mut pending = false;
    let mut coalesced = 0usize;

    loop {
        if !pending {
            match changes.recv().await {
                Ok(()) => {
                    pending = true;
                    coalesced = 1;
                }
                Err(_) => break,
            }
            continue;
        }

        match future::timeout(settle, changes.recv()).await {
            Ok(Ok(())) => {
                coalesced += 1;
                trace!("Input changed, settling timer restarted");
            }
            Ok(Err(_)) => break,
            Err(_) => match on_expiry(&changes) {
                Expiry::Rearm => coalesced += 1,
                Expiry::Stop => break,
                Expiry::Fire => {
                    debug!("Input settled after {} change(s)", coalesced);
                    pending = false;
                    coalesced = 0;
                    on_settled();
                }
            },
        }
    }

    debug!("Debounce task stopped");
}

impl DebounceService {
    /// Spawns the debounce task.
    ///
    /// `on_settled` runs on the background task; it must only hand the
    /// signal over to the UI thread.
    pub fn start<F>(settle: Duration, on_settled: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (notify, changes) = channel::unbounded();
        let task = task::spawn(run_debounce_loop(settle, changes, Arc::new(on_settled)));
        Self {
            notify,
            _task: task,
        }
    }

    /// Signals that the input changed.
    pub fn notify(&self) {
        if self.notify.try_send(()).is_err() {
            debug!("Debounce task is gone, change notification dropped");
        }
    }
}

impl Drop for DebounceService {
    fn drop(&mut self) {
        self.notify.close();
    }
}
