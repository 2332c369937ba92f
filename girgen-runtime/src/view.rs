use std::ffi::c_void;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

/// Ownership transfer annotation of a native argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transfer {
    /// The callee only borrows the memory.
    #[default]
    None,
    /// The callee owns the container but not its elements.
    Container,
    /// The callee owns the memory.
    Full,
}

/// Frees a native struct allocation.
pub type FreeFn = unsafe extern "C" fn(*mut c_void);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("null struct pointer")]
    Null,
    #[error("transfer {0:?} requires a free function")]
    MissingFree(Transfer),
}

/// A Rust handle on native struct memory, without copying it.
///
/// Whether dropping the view frees the memory is decided only by the
/// transfer annotation it was created with: `None` never frees, `Container`
/// and `Full` free the struct allocation through the given free function.
pub struct StructView<T> {
    ptr: NonNull<T>,
    transfer: Transfer,
    free: Option<FreeFn>,
}

impl<T> StructView<T> {
    /// Wrap a native struct pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a valid `T` for the lifetime of the view. If
    /// `transfer` is not `None`, the view takes ownership and `free` must be
    /// the matching deallocator; nothing else may free the memory.
    pub unsafe fn new(ptr: *mut T, transfer: Transfer, free: Option<FreeFn>) -> Result<Self, ViewError> {
        let ptr = NonNull::new(ptr).ok_or(ViewError::Null)?;
        if transfer != Transfer::None && free.is_none() {
            return Err(ViewError::MissingFree(transfer));
        }
        Ok(Self { ptr, transfer, free })
    }

    /// A view that never frees the memory.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a valid `T` for the lifetime of the view.
    pub unsafe fn borrowed(ptr: *mut T) -> Result<Self, ViewError> {
        Self::new(ptr, Transfer::None, None)
    }

    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn transfer(&self) -> Transfer {
        self.transfer
    }

    /// Whether dropping the view frees the native memory.
    pub fn is_owned(&self) -> bool {
        self.transfer != Transfer::None
    }

    /// # Safety
    ///
    /// The native side must not mutate the struct while the reference lives.
    pub unsafe fn as_ref(&self) -> &T {
        self.ptr.as_ref()
    }

    /// Give the pointer back without freeing it, e.g. to pass ownership on to
    /// another native call.
    pub fn into_raw(self) -> *mut T {
        ManuallyDrop::new(self).ptr.as_ptr()
    }
}

impl<T> Drop for StructView<T> {
    fn drop(&mut self) {
        if self.transfer == Transfer::None {
            return;
        }
        if let Some(free) = self.free {
            // SAFETY: ownership was transferred to the view at construction.
            unsafe { free(self.ptr.as_ptr().cast()) }
        }
    }
}

impl<T> fmt::Debug for StructView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructView")
            .field("ptr", &self.ptr)
            .field("transfer", &self.transfer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[repr(C)]
    struct Point {
        x: i32,
        y: i32,
    }

    static FREED: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn free_point(ptr: *mut c_void) {
        drop(Box::from_raw(ptr as *mut Point));
        FREED.fetch_add(1, Ordering::SeqCst);
    }

    fn native_point() -> *mut Point {
        Box::into_raw(Box::new(Point { x: 1, y: 2 }))
    }

    #[test]
    fn test_view_aliases_native_memory() {
        let ptr = native_point();
        let view = unsafe { StructView::borrowed(ptr) }.unwrap();
        assert_eq!(view.as_ptr(), ptr);
        unsafe { (*ptr).x = 10 };
        assert_eq!(unsafe { view.as_ref() }.x, 10);
        assert_eq!(unsafe { view.as_ref() }.y, 2);
        drop(view);
        unsafe { drop(Box::from_raw(ptr)) };
    }

    #[test]
    fn test_only_transferred_views_free() {
        let before = FREED.load(Ordering::SeqCst);

        let ptr = native_point();
        drop(unsafe { StructView::new(ptr, Transfer::None, Some(free_point)) }.unwrap());
        assert_eq!(FREED.load(Ordering::SeqCst), before);

        drop(unsafe { StructView::new(ptr, Transfer::Full, Some(free_point)) }.unwrap());
        assert_eq!(FREED.load(Ordering::SeqCst), before + 1);

        let ptr = native_point();
        let view = unsafe { StructView::new(ptr, Transfer::Container, Some(free_point)) }.unwrap();
        assert!(view.is_owned());
        let raw = view.into_raw();
        assert_eq!(FREED.load(Ordering::SeqCst), before + 1);
        unsafe { free_point(raw.cast()) };
    }

    #[test]
    fn test_rejected_views() {
        let null = unsafe { StructView::<Point>::borrowed(std::ptr::null_mut()) };
        assert_eq!(null.unwrap_err(), ViewError::Null);

        let ptr = native_point();
        let owning = unsafe { StructView::new(ptr, Transfer::Full, None) };
        assert_eq!(owning.unwrap_err(), ViewError::MissingFree(Transfer::Full));
        unsafe { drop(Box::from_raw(ptr)) };
    }
}
