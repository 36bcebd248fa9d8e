//! Minimal observable value container.
//!
//! A [`Store`] owns exactly one value and a list of listeners.  Every write
//! commits the new value first and then synchronously calls each listener, in
//! subscription order, before returning.  There is no merge form here: callers
//! either replace the value wholesale ([`Store::set_state`]) or compute the next
//! value from the previous one ([`Store::update_state`]).  Shallow merging of
//! partial updates lives one level up, in the
//! [`LogicLayer`](crate::logic::LogicLayer).
//!
//! # Re-entrant writes
//!
//! A listener that writes to the store it is being notified by does not recurse.
//! The write is queued and applied after the current notification pass has
//! reached every listener, followed by its own full pass.  Queued writes are
//! applied in the order they were issued, so no listener ever sees a stale value
//! after a fresh one.
//!
//! # Example
//!
//! ```
//! use husk_core::store::Store;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let store = Store::new(1);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let sub = store.subscribe(move |v| sink.borrow_mut().push(*v));
//!
//! store.set_state(2);
//! store.update_state(|prev| prev * 10);
//! sub.unsubscribe();
//! store.set_state(0);
//!
//! assert_eq!(*seen.borrow(), vec![2, 20]);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

struct Entry<T> {
    id: u64,
    active: Cell<bool>,
    listener: Box<dyn Fn(&T)>,
}

enum PendingWrite<T> {
    Replace(T),
    Update(Box<dyn FnOnce(&T) -> T>),
}

struct Inner<T> {
    value: RefCell<T>,
    entries: RefCell<Vec<Rc<Entry<T>>>>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    pending: RefCell<VecDeque<PendingWrite<T>>>,
}

/// A single-threaded observable value.
///
/// `Store` is a cheap handle: cloning it yields another handle to the same
/// value and listener list.  It is deliberately `!Send`; a component and every
/// renderer attached to it live on one thread.
pub struct Store<T: 'static> {
    inner: Rc<Inner<T>>,
}

impl<T: 'static> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Store<T> {
    /// Create a store holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(initial),
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                notifying: Cell::new(false),
                pending: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Return a copy of the most recently committed value.
    pub fn get_state(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    ///
    /// The closure must not write to this store; doing so panics on the
    /// internal borrow.
    pub fn with_state<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value and notify every listener.
    pub fn set_state(&self, value: T) {
        self.write(PendingWrite::Replace(value));
    }

    /// Compute the next value from the current one and notify every listener.
    ///
    /// A panicking updater propagates to the caller; the value is left
    /// unchanged in that case.
    pub fn update_state(&self, updater: impl FnOnce(&T) -> T + 'static) {
        self.write(PendingWrite::Update(Box::new(updater)));
    }

    /// Register a listener, called with the new value after every write.
    ///
    /// Registering the same closure twice yields two independent entries.  The
    /// returned handle removes exactly this entry; dropping it without calling
    /// [`Unsubscribe::unsubscribe`] leaves the listener registered.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Unsubscribe {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.entries.borrow_mut().push(Rc::new(Entry {
            id,
            active: Cell::new(true),
            listener: Box::new(listener),
        }));

        let store: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Unsubscribe::new(move || {
            if let Some(inner) = store.upgrade() {
                let mut entries = inner.entries.borrow_mut();
                if let Some(entry) = entries.iter().find(|e| e.id == id) {
                    entry.active.set(false);
                }
                entries.retain(|e| e.id != id);
            }
        })
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Whether two handles point at the same store.
    pub fn ptr_eq(&self, other: &Store<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a new store that mirrors `selector(state)` of this one.
    ///
    /// The derived store is independent: writes to it never reach the source,
    /// and the next source write overwrites them.  The source only holds a weak
    /// reference, so once every handle to the derived store is dropped the
    /// bridge unsubscribes itself on the following source write.
    pub fn derive<U: 'static>(&self, selector: impl Fn(&T) -> U + 'static) -> Store<U> {
        let derived = Store::new(self.with_state(&selector));
        let target = Rc::downgrade(&derived.inner);
        let slot: Rc<Cell<Option<Unsubscribe>>> = Rc::default();

        let bridge = Rc::clone(&slot);
        let handle = self.subscribe(move |state| match target.upgrade() {
            Some(inner) => Store { inner }.set_state(selector(state)),
            None => {
                if let Some(handle) = bridge.take() {
                    tracing::trace!("derived store dropped, removing bridge");
                    handle.unsubscribe();
                }
            }
        });
        slot.set(Some(handle));
        derived
    }

    fn write(&self, write: PendingWrite<T>) {
        if self.inner.notifying.get() {
            tracing::trace!("store write issued during notification, queued");
            self.inner.pending.borrow_mut().push_back(write);
            return;
        }

        let _guard = NotifyGuard::enter(&self.inner);
        let mut next = Some(write);
        while let Some(write) = next {
            self.commit(write);
            self.notify();
            next = self.inner.pending.borrow_mut().pop_front();
        }
    }

    fn commit(&self, write: PendingWrite<T>) {
        let next = match write {
            PendingWrite::Replace(value) => value,
            PendingWrite::Update(updater) => {
                let current = self.inner.value.borrow();
                updater(&current)
            }
        };
        *self.inner.value.borrow_mut() = next;
    }

    fn notify(&self) {
        // Snapshot so listeners may subscribe or unsubscribe while we iterate.
        let entries: Vec<Rc<Entry<T>>> = self.inner.entries.borrow().clone();
        let value = self.inner.value.borrow();
        for entry in entries {
            if entry.active.get() {
                (entry.listener)(&value);
            }
        }
    }
}

impl<T: Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Create a store that mirrors `selector` applied to `source`.
///
/// Free-function form of [`Store::derive`].
pub fn derive_store<T: 'static, U: 'static>(
    source: &Store<T>,
    selector: impl Fn(&T) -> U + 'static,
) -> Store<U> {
    source.derive(selector)
}

/// Marks a store as notifying for the duration of a write cycle.
struct NotifyGuard<'a, T> {
    inner: &'a Inner<T>,
}

impl<'a, T> NotifyGuard<'a, T> {
    fn enter(inner: &'a Inner<T>) -> Self {
        inner.notifying.set(true);
        Self { inner }
    }
}

impl<T> Drop for NotifyGuard<'_, T> {
    fn drop(&mut self) {
        self.inner.notifying.set(false);
        if std::thread::panicking() {
            self.inner.pending.borrow_mut().clear();
        }
    }
}

/// Handle returned by [`Store::subscribe`].
///
/// Calling [`unsubscribe`](Unsubscribe::unsubscribe) more than once is a no-op.
/// It is safe to call from inside a listener, including the listener it
/// removes.
#[must_use = "dropping the handle keeps the listener registered; call `unsubscribe` to remove it"]
pub struct Unsubscribe {
    remove: Cell<Option<Box<dyn FnOnce()>>>,
    active: Cell<bool>,
}

impl Unsubscribe {
    pub(crate) fn new(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: Cell::new(Some(Box::new(remove))),
            active: Cell::new(true),
        }
    }

    /// Remove the listener this handle was created for.
    pub fn unsubscribe(&self) {
        self.active.set(false);
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    /// Whether [`unsubscribe`](Unsubscribe::unsubscribe) has not been called yet.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.active.get())
            .finish()
    }
}
