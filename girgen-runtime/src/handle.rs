use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    #[error("callback not found: handle {0} is not registered")]
    Unknown(usize),
    #[error("callback handle {handle} does not hold a {expected}")]
    WrongType { handle: usize, expected: &'static str },
}

struct Entries {
    next: usize,
    values: HashMap<usize, Entry>,
}

/// Maps opaque numeric handles to Rust values handed to native code.
///
/// Handles start at 1 and are never reused, so a stale handle can only fail
/// to resolve; it never aliases another value. Resolving clones the stored
/// `Arc` and releases the lock before the value is used, so a callback may
/// register or release handles while it runs.
pub struct HandleRegistry {
    entries: Mutex<Entries>,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries {
                next: 1,
                values: HashMap::new(),
            }),
        }
    }

    /// Store a value and return its handle.
    pub fn register<T: Any + Send + Sync>(&self, value: T) -> usize {
        let mut entries = self.entries.lock();
        let handle = entries.next;
        entries.next += 1;
        entries.values.insert(handle, Arc::new(value));
        debug!(handle, value_type = type_name::<T>(), "registered callback handle");
        handle
    }

    pub fn try_resolve<T: Any + Send + Sync>(&self, handle: usize) -> Result<Arc<T>, HandleError> {
        let entry = self
            .entries
            .lock()
            .values
            .get(&handle)
            .cloned()
            .ok_or(HandleError::Unknown(handle))?;
        entry.downcast::<T>().map_err(|_| HandleError::WrongType {
            handle,
            expected: type_name::<T>(),
        })
    }

    /// Resolve a handle received from native code.
    ///
    /// # Panics
    ///
    /// If the handle is not registered or holds another type. Either means
    /// the native side outlived the registration, which cannot be recovered
    /// from.
    pub fn resolve<T: Any + Send + Sync>(&self, handle: usize) -> Arc<T> {
        match self.try_resolve(handle) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Drop the mapping. Returns `false` if the handle was not registered.
    pub fn release(&self, handle: usize) -> bool {
        let released = self.entries.lock().values.remove(&handle).is_some();
        debug!(handle, released, "released callback handle");
        released
    }

    pub fn len(&self) -> usize {
        self.entries.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The process-wide registry used by generated trampolines.
pub fn global() -> &'static HandleRegistry {
    static GLOBAL: OnceLock<HandleRegistry> = OnceLock::new();
    GLOBAL.get_or_init(HandleRegistry::new)
}

pub fn register<T: Any + Send + Sync>(value: T) -> usize {
    global().register(value)
}

pub fn try_resolve<T: Any + Send + Sync>(handle: usize) -> Result<Arc<T>, HandleError> {
    global().try_resolve(handle)
}

pub fn resolve<T: Any + Send + Sync>(handle: usize) -> Arc<T> {
    global().resolve(handle)
}

pub fn release(handle: usize) -> bool {
    global().release(handle)
}
