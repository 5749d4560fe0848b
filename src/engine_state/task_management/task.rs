//! # Event System Core Traits
//!
//! This module defines the building blocks of the background event loop.
//!
//! ## Core Components
//! - `Event`: A unit of work with a scheduling priority
//! - `EventHandler`: The state machine that consumes events on the worker thread
//!
//! ## Event Lifecycle
//! 1. An `Event` is pushed onto an [`EventQueue`] from any thread
//! 2. The worker pops the most urgent event (lowest priority value, oldest first)
//! 3. `EventHandler::handle_event` runs on the worker and may push follow-up events
//! 4. The queue is told the event is complete, which drives idle tracking
//!
//! ## Thread Safety
//! - Events must be `Send` to cross from producers to the worker
//! - Handlers are moved onto the worker thread and never shared

use super::EventQueue;

/// A unit of work for an [`EventHandler`].
pub trait Event: Send + 'static {
    /// Scheduling priority. Lower values are served first; equal values are served in
    /// insertion order.
    fn priority(&self) -> usize;
}

/// Consumes events on a worker thread.
///
/// # Implementation Guidelines
/// - Keep each `handle_event` call short; long work should be split into follow-up
///   events so that more urgent events can overtake it
/// - Never block on anything the event's producer might be holding
pub trait EventHandler<E: Event>: Send + 'static {
    /// Called once on the worker before the first event.
    fn on_start(&mut self, _queue: &EventQueue<E>) {}

    /// Handles one event.
    ///
    /// # Arguments
    /// * `event` - The event to handle
    /// * `queue` - The queue the event came from, for pushing continuation events
    fn handle_event(&mut self, event: E, queue: &EventQueue<E>);

    /// Called once on the worker after the queue was stopped.
    fn on_finish(&mut self) {}
}
