//! # Observable Property
//!
//! A value paired with a list of change listeners. Listeners are plain closures that are
//! called synchronously from [`Property::set`] whenever the stored value actually changes.
//! Registration returns a [`ListenerId`]; the listener stays attached until it is passed
//! back to [`Property::unsubscribe`] or the property is dropped.

/// Identifies one registered listener of a [`Property`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// A value that notifies registered listeners when it changes.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use voxel_world::core::Property;
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let mut property = Property::new(0);
///
/// let sink = seen.clone();
/// let id = property.subscribe(move |value: &i32| sink.lock().unwrap().push(*value));
///
/// property.set(1);
/// property.set(1); // unchanged, no notification
/// property.unsubscribe(id);
/// property.set(2);
///
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// ```
pub struct Property<T> {
    value: T,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_listener_id: u64,
}

impl<T: PartialEq> Property<T> {
    /// Creates a property holding `value` with no listeners.
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Stores `value` and notifies every listener, unless it equals the current value.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }

        self.value = value;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.value);
        }
        true
    }

    /// Registers a listener called with the new value after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&T) + Send + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
