use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const NOTICE_TTL: Duration = Duration::from_secs(3);

pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Host capability for running a task after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: ScheduledTask);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

#[derive(Debug, Default)]
struct NoticeSlot {
    message: Option<String>,
    posted: u64,
}

/// Holds the single transient message shown to the player.
///
/// A newer notice replaces the current one, and only the clear scheduled for
/// the newest notice takes effect.
#[derive(Clone)]
pub struct NoticeBoard {
    slot: Arc<Mutex<NoticeSlot>>,
    scheduler: Arc<dyn Scheduler>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(scheduler: Arc<dyn Scheduler>, ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(NoticeSlot::default())),
            scheduler,
            ttl,
        }
    }

    pub fn post(&self, message: impl Into<String>) {
        let posted = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.posted += 1;
            slot.message = Some(message.into());
            slot.posted
        };

        let slot = Arc::clone(&self.slot);
        self.scheduler.schedule(
            self.ttl,
            Box::new(move || {
                let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
                if slot.posted == posted {
                    slot.message = None;
                }
            }),
        );
    }

    pub fn current(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .message
            .clone()
    }
}
