/*!
 * Channel
 * Unbounded FIFO value exchange with asynchronous put and callback-based take
 */

use crate::core::Value;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Callback invoked with the value a pending take resolves to
pub type Taker = Box<dyn FnOnce(Value) + Send>;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

struct ChannelState {
    buffer: VecDeque<Value>,
    takers: VecDeque<Taker>,
}

/// FIFO channel shared by reference between processes and host drivers.
///
/// There is no capacity bound and no backpressure: values nobody takes stay
/// buffered indefinitely.
///
/// When a value becomes deliverable it resolves *every* taker queued at that
/// moment, consuming exactly one buffered value. With one active taker per
/// channel this is plain FIFO hand-off.
#[derive(Clone)]
pub struct Channel {
    id: u64,
    state: Arc<Mutex<ChannelState>>,
}

impl Channel {
    pub fn new() -> Self {
        Self {
            id: NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed),
            state: Arc::new(Mutex::new(ChannelState {
                buffer: VecDeque::new(),
                takers: VecDeque::new(),
            })),
        }
    }

    /// Identifier for logs; unique per process lifetime
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Buffer a value, then try to deliver
    pub fn put(&self, value: impl Into<Value>) {
        self.state.lock().buffer.push_back(value.into());
        self.release();
    }

    /// Queue a taker, then try to deliver
    pub fn take<F>(&self, on_value: F)
    where
        F: FnOnce(Value) + Send + 'static,
    {
        self.state.lock().takers.push_back(Box::new(on_value));
        self.release();
    }

    /// Number of buffered, undelivered values
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    /// Number of takers waiting for a value
    pub fn pending_takers(&self) -> usize {
        self.state.lock().takers.len()
    }

    /// Whether two handles refer to the same channel
    #[inline]
    pub fn ptr_eq(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    // Takers run with the lock released so they may put or take on any
    // channel, including this one.
    fn release(&self) {
        loop {
            let message = {
                let mut state = self.state.lock();
                if state.takers.is_empty() {
                    return;
                }
                match state.buffer.pop_front() {
                    Some(message) => message,
                    None => return,
                }
            };

            let mut delivered = 0usize;
            loop {
                let taker = self.state.lock().takers.pop_front();
                let Some(taker) = taker else {
                    break;
                };
                taker(message.clone());
                delivered += 1;
            }

            trace!(
                channel = self.id,
                kind = message.kind(),
                delivered,
                "channel value delivered"
            );
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("buffered", &state.buffer.len())
            .field("takers", &state.takers.len())
            .finish()
    }
}
