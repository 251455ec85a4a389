//! Network reachability monitor.
//!
//! # Responsibility
//! - Observe the network path on a background thread.
//! - Publish the latest online flag to any number of subscribers.
//!
//! # Invariants
//! - Only transitions are published; repeated identical updates are dropped.
//! - A subscriber always starts with the current value.

use log::{debug, error, info};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::watch;

/// Path state reported by the platform observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    Satisfied,
    Unsatisfied,
    RequiresConnection,
}

impl PathStatus {
    pub fn is_online(self) -> bool {
        self == Self::Satisfied
    }
}

/// Platform path-observation mechanism.
pub trait PathObserver: Send + 'static {
    /// Blocks until the next path update. `None` ends observation.
    fn next_update(&mut self) -> Option<PathStatus>;
}

/// Publishes online/offline transitions from a background observer.
pub struct ReachabilityMonitor {
    sender: Arc<watch::Sender<bool>>,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReachabilityMonitor {
    /// Monitor without an observer; starts online and is fed via `publish`.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(true);
        Self {
            sender: Arc::new(sender),
            stopped: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Starts observing `observer` on a dedicated thread.
    pub fn start(observer: impl PathObserver) -> std::io::Result<Self> {
        let mut monitor = Self::new();
        let sender = Arc::clone(&monitor.sender);
        let stopped = Arc::clone(&monitor.stopped);

        let worker = std::thread::Builder::new()
            .name("reachability-monitor".to_string())
            .spawn(move || observe(observer, &sender, &stopped))?;
        monitor.worker = Some(worker);
        info!("event=reachability_start module=sync status=ok");
        Ok(monitor)
    }

    /// Publishes a path update. Safe from any thread.
    pub fn publish(&self, online: bool) {
        publish(&self.sender, online);
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> ReachabilitySubscription {
        ReachabilitySubscription {
            receiver: self.sender.subscribe(),
            primed: false,
        }
    }

    /// Stops publishing observer updates.
    ///
    /// A finished observer thread is joined and a panic in it is logged.
    /// An observer still blocked in `next_update` is left to exit after its
    /// next update.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        let Some(worker) = self.worker.take() else {
            return;
        };
        if !worker.is_finished() {
            debug!("event=reachability_stop module=sync status=skip reason=observer_blocked");
            return;
        }
        if let Err(payload) = worker.join() {
            error!(
                "event=reachability_stop module=sync status=error panic={}",
                panic_message(&*payload)
            );
        }
    }
}

impl Default for ReachabilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReachabilityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn observe(mut observer: impl PathObserver, sender: &watch::Sender<bool>, stopped: &AtomicBool) {
    while !stopped.load(Ordering::SeqCst) {
        let Some(status) = observer.next_update() else {
            break;
        };
        if stopped.load(Ordering::SeqCst) {
            break;
        }
        publish(sender, status.is_online());
    }
    debug!("event=reachability_stop module=sync status=ok");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn publish(sender: &watch::Sender<bool>, online: bool) {
    let changed = sender.send_if_modified(|current| {
        if *current == online {
            return false;
        }
        *current = online;
        true
    });
    if changed {
        info!("event=reachability_change module=sync status=ok online={online}");
    }
}

/// Receiver side of the monitor.
pub struct ReachabilitySubscription {
    receiver: watch::Receiver<bool>,
    primed: bool,
}

impl ReachabilitySubscription {
    /// Non-blocking poll for the main context.
    ///
    /// The first call always yields the current value; later calls yield
    /// only values not yet seen.
    pub fn poll(&mut self) -> Option<bool> {
        if !self.primed {
            self.primed = true;
            return Some(*self.receiver.borrow_and_update());
        }
        match self.receiver.has_changed() {
            Ok(true) => Some(*self.receiver.borrow_and_update()),
            _ => None,
        }
    }

    /// Waits for the next value. Returns `None` once the monitor is gone.
    pub async fn next(&mut self) -> Option<bool> {
        if !self.primed {
            self.primed = true;
            return Some(*self.receiver.borrow_and_update());
        }
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }
}
