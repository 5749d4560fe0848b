//! # Task Management System
//!
//! This module provides the background worker that keeps slow work (terrain generation)
//! off the render thread.
//!
//! ## Architecture Overview
//!
//! - `EventQueue`: a blocking priority queue shared by producers and the worker
//! - `Event` / `EventHandler`: the unit of work and the state machine that consumes it
//! - `EventThread`: owns one named OS thread running a handler against a queue
//!
//! ## Event Lifecycle
//! 1. Any thread pushes an event through `EventThread::post` or the shared queue
//! 2. The worker pops the most urgent event and hands it to the handler
//! 3. The handler may push continuation events, which are ordered like any other
//! 4. After `stop`, the worker finishes the event it is handling and exits; queued
//!    events are discarded
//!
//! ## Shutdown
//! Dropping an `EventThread` stops the queue and joins the worker, so no worker
//! outlives its owner. A worker panic is logged when it is observed on join.

mod event_queue;
pub mod task;

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};

pub use event_queue::EventQueue;
pub use task::{Event, EventHandler};

/// A single worker thread running an [`EventHandler`] over an [`EventQueue`].
pub struct EventThread<E: Event> {
    name: String,
    queue: Arc<EventQueue<E>>,
    worker: Option<JoinHandle<()>>,
}

impl<E: Event> EventThread<E> {
    /// Spawns a named worker running `handler`.
    ///
    /// # Arguments
    /// * `name` - The OS thread name, also used in log lines
    /// * `handler` - The state machine to run on the worker
    ///
    /// # Returns
    /// The running thread, or the I/O error reported by the OS when spawning failed.
    pub fn spawn<H: EventHandler<E>>(name: &str, handler: H) -> io::Result<Self> {
        let queue = Arc::new(EventQueue::new());
        let worker_queue = queue.clone();
        let thread_name = name.to_owned();

        let worker = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || run_handler(&thread_name, handler, &worker_queue))?;

        Ok(Self {
            name: name.to_owned(),
            queue,
            worker: Some(worker),
        })
    }

    /// The queue the worker consumes.
    pub fn queue(&self) -> &Arc<EventQueue<E>> {
        &self.queue
    }

    /// Enqueues an event for the worker. Returns `false` if the worker was stopped.
    pub fn post(&self, event: E) -> bool {
        self.queue.push(event)
    }

    /// Blocks until the worker has nothing queued or in flight, or `timeout` elapses.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.queue.wait_idle(timeout)
    }

    /// Asks the worker to exit after the event it is currently handling.
    pub fn stop(&self) {
        self.queue.stop();
    }

    /// Stops the worker and waits for it to exit.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.queue.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Worker thread '{}' panicked", self.name);
            }
        }
    }
}

impl<E: Event> Drop for EventThread<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_handler<E: Event, H: EventHandler<E>>(name: &str, mut handler: H, queue: &EventQueue<E>) {
    info!("Worker thread '{}' started", name);
    handler.on_start(queue);

    while let Some(event) = queue.next_event() {
        handler.handle_event(event, queue);
        queue.complete();
    }

    handler.on_finish();
    info!("Worker thread '{}' stopped", name);
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Countdown(usize);

    impl Event for Countdown {
        fn priority(&self) -> usize {
            1
        }
    }

    struct Recorder {
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl EventHandler<Countdown> for Recorder {
        fn handle_event(&mut self, event: Countdown, queue: &EventQueue<Countdown>) {
            self.seen.lock().unwrap().push(event.0);
            if event.0 > 0 {
                queue.push(Countdown(event.0 - 1));
            }
        }
    }

    #[test]
    fn handler_runs_continuations_until_idle() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let thread = EventThread::spawn(
            "countdown",
            Recorder {
                seen: seen.clone(),
            },
        )
        .unwrap();

        assert!(thread.post(Countdown(3)));
        assert!(thread.wait_idle(Duration::from_secs(5)));

        assert_eq!(*seen.lock().unwrap(), vec![3, 2, 1, 0]);
        thread.join();
    }

    #[test]
    fn drop_stops_and_joins_the_worker() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let thread = EventThread::spawn(
            "dropped",
            Recorder {
                seen: seen.clone(),
            },
        )
        .unwrap();
        let queue = thread.queue().clone();

        drop(thread);

        assert!(queue.is_stopped());
        assert!(!queue.push(Countdown(1)));
    }
}
