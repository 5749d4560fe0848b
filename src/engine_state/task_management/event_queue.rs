use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use log::trace;

use super::task::Event;

struct QueuedEvent<E> {
    priority: usize,
    sequence: u64,
    event: E,
}

impl<E> PartialEq for QueuedEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<E> Eq for QueuedEvent<E> {}

impl<E> PartialOrd for QueuedEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for QueuedEvent<E> {
    // `BinaryHeap` pops the greatest element, so both keys are reversed.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct QueueState<E> {
    heap: BinaryHeap<QueuedEvent<E>>,
    next_sequence: u64,
    in_flight: usize,
}

impl<E> QueueState<E> {
    fn is_idle(&self) -> bool {
        self.heap.is_empty() && self.in_flight == 0
    }
}

/// A blocking priority queue of events shared between producers and one worker.
///
/// Events with a lower [`Event::priority`] are popped first; events of equal priority pop
/// in the order they were pushed. Once [`EventQueue::stop`] has been called, waiting
/// consumers wake up and no further event is handed out.
///
/// The queue also tracks work in flight: a consumer calls [`EventQueue::complete`] after
/// handling each popped event, and [`EventQueue::wait_idle`] blocks until nothing is
/// queued or being handled.
pub struct EventQueue<E: Event> {
    state: Mutex<QueueState<E>>,
    available: Condvar,
    idle: Condvar,
    stopped: AtomicBool,
}

impl<E: Event> EventQueue<E> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                next_sequence: 0,
                in_flight: 0,
            }),
            available: Condvar::new(),
            idle: Condvar::new(),
            stopped: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<E>> {
        self.state.lock().expect("event queue lock poisoned")
    }

    /// Enqueues `event`. Returns `false`, dropping the event, if the queue was stopped.
    pub fn push(&self, event: E) -> bool {
        if self.is_stopped() {
            trace!("Dropped event pushed after stop");
            return false;
        }

        let mut state = self.lock();
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.heap.push(QueuedEvent {
            priority: event.priority(),
            sequence,
            event,
        });
        drop(state);

        self.available.notify_one();
        true
    }

    /// Blocks until an event is available and pops it, or returns `None` once stopped.
    pub fn next_event(&self) -> Option<E> {
        let mut state = self.lock();
        loop {
            if self.is_stopped() {
                return None;
            }
            if let Some(queued) = state.heap.pop() {
                state.in_flight += 1;
                return Some(queued.event);
            }
            state = self
                .available
                .wait(state)
                .expect("event queue lock poisoned");
        }
    }

    /// Pops the most urgent event without blocking.
    pub fn try_next_event(&self) -> Option<E> {
        if self.is_stopped() {
            return None;
        }

        let mut state = self.lock();
        let queued = state.heap.pop()?;
        state.in_flight += 1;
        Some(queued.event)
    }

    /// Marks one popped event as handled.
    pub fn complete(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.is_idle() {
            self.idle.notify_all();
        }
    }

    /// Blocks until no event is queued or in flight, or until `timeout` elapses.
    ///
    /// Returns `true` if the queue became idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .idle
            .wait_timeout_while(state, timeout, |state| !state.is_idle())
            .expect("event queue lock poisoned");
        state.is_idle()
    }

    /// Stops the queue and wakes every waiting consumer. Queued events are never handed out.
    pub fn stop(&self) {
        self.stopped.store(true, AtomicOrdering::SeqCst);

        // Taking the lock orders the store before any consumer's next check.
        let _state = self.lock();
        self.available.notify_all();
        self.idle.notify_all();
    }

    /// Whether [`EventQueue::stop`] was called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(AtomicOrdering::SeqCst)
    }

    /// Number of queued events, not counting those in flight.
    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    /// Whether no event is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }
}

impl<E: Event> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
