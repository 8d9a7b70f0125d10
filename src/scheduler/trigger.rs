/*!
 * Tick Triggers
 *
 * The scheduler never drives itself: something outside calls `tick()`
 * repeatedly. After every tick (on all exit paths) the scheduler re-arms its
 * trigger, which is the trigger's cue that another tick is wanted.
 *
 * - `ManualTrigger`: an armed flag, pumped by hand (tests, embedding hosts)
 * - `FrameDriver`: tokio task ticking once per frame interval while armed
 */

use super::Scheduler;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Periodic trigger contract
pub trait Trigger: Send + Sync {
    /// Request one more tick
    fn arm(&self);
}

/// Trigger that records arm requests for a host loop to consume
#[derive(Debug, Default)]
pub struct ManualTrigger {
    armed: AtomicBool,
    arm_count: AtomicU64,
}

impl ManualTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a pending arm request
    #[inline]
    pub fn take_armed(&self) -> bool {
        self.armed.swap(false, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Total number of arm requests seen
    #[inline]
    pub fn arm_count(&self) -> u64 {
        self.arm_count.load(Ordering::Relaxed)
    }
}

impl Trigger for ManualTrigger {
    fn arm(&self) {
        self.arm_count.fetch_add(1, Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }
}

/// Control messages for the frame driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCommand {
    /// Stop ticking; arm requests keep accumulating
    Pause,
    /// Resume ticking
    Resume,
    /// Stop the driver task
    Shutdown,
}

/// Handle to a tokio task that ticks a scheduler at a fixed frame rate.
///
/// Must be spawned from within a tokio runtime.
pub struct FrameDriver {
    command_tx: mpsc::UnboundedSender<FrameCommand>,
    trigger: Arc<ManualTrigger>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl FrameDriver {
    /// Attach a new trigger to `scheduler` and start ticking it every `interval`
    pub fn spawn(scheduler: Scheduler, interval: Duration) -> Self {
        let trigger = Arc::new(ManualTrigger::new());
        scheduler.set_trigger(trigger.clone());

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let loop_trigger = trigger.clone();
        let handle = tokio::spawn(async move {
            run_frame_loop(scheduler, loop_trigger, interval, command_rx).await;
        });

        info!(interval_ms = interval.as_millis() as u64, "Frame driver spawned");

        Self {
            command_tx,
            trigger,
            handle: Some(handle),
        }
    }

    /// The trigger the scheduler re-arms after each tick
    pub fn trigger(&self) -> &Arc<ManualTrigger> {
        &self.trigger
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(FrameCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.command_tx.send(FrameCommand::Resume);
    }

    /// Stop the driver and wait for its task to finish
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(FrameCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Frame driver shutdown error");
            } else {
                info!("Frame driver shutdown complete");
            }
        }
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_frame_loop(
    scheduler: Scheduler,
    trigger: Arc<ManualTrigger>,
    frame: Duration,
    mut command_rx: mpsc::UnboundedReceiver<FrameCommand>,
) {
    let mut active = true;
    let mut interval = tokio::time::interval(frame);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if active && trigger.take_armed() {
                    scheduler.tick();
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(FrameCommand::Pause) => {
                        debug!("Frame driver paused");
                        active = false;
                    }
                    Some(FrameCommand::Resume) => {
                        debug!("Frame driver resumed");
                        active = true;
                    }
                    Some(FrameCommand::Shutdown) | None => {
                        debug!("Frame driver stopping");
                        break;
                    }
                }
            }
        }
    }
}
