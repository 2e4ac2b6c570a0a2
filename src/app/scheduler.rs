//! Cancellable timers delivered back to the App actor as events

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app::notifications::NotificationId;

/// Every delayed action the controller can schedule
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Display interval elapsed, start the exit phase
    NotificationExpire(NotificationId),
    /// Exit phase elapsed, drop the notification
    NotificationRemove(NotificationId),
    /// Client-side ceiling for the `/generate` request with this sequence
    GenerateDeadline(u64),
    /// Follow a server-supplied location
    Redirect(String),
}

/// A timer that went off, tagged with the schedule call that armed it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired {
    pub generation: u64,
    pub timer: Timer,
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Spawns one sleeping task per timer. A firing that was already in the
/// channel when its timer got cancelled or rescheduled is reported stale by
/// [`Scheduler::fired`].
pub struct Scheduler {
    timer_tx: mpsc::UnboundedSender<Fired>,
    pending: HashMap<Timer, Pending>,
    generation: u64,
}

impl Scheduler {
    pub fn new(timer_tx: mpsc::UnboundedSender<Fired>) -> Self {
        Scheduler {
            timer_tx,
            pending: HashMap::new(),
            generation: 0,
        }
    }

    /// Fire `timer` after `after`, replacing an identical pending timer
    pub fn schedule(&mut self, timer: Timer, after: Duration) {
        if let Some(previous) = self.pending.remove(&timer) {
            previous.handle.abort();
        }

        self.generation += 1;
        let generation = self.generation;
        let tx = self.timer_tx.clone();
        let fired = Fired {
            generation,
            timer: timer.clone(),
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(fired);
        });
        self.pending.insert(timer, Pending { generation, handle });
    }

    pub fn cancel(&mut self, timer: &Timer) -> bool {
        match self.pending.remove(timer) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Retire a delivered timer. False when the firing belongs to a schedule
    /// that has since been cancelled or replaced; the caller must ignore it.
    pub fn fired(&mut self, fired: &Fired) -> bool {
        match self.pending.get(&fired.timer) {
            Some(pending) if pending.generation == fired.generation => {
                self.pending.remove(&fired.timer);
                true
            }
            _ => {
                tracing::debug!(timer = ?fired.timer, generation = fired.generation, "Ignoring stale timer");
                false
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn cancel_all(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.handle.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
