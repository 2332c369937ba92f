//! # girgen-runtime
//!
//! Support code linked into bindings whose callback trampolines were
//! generated by [`girgen`](https://docs.rs/girgen).
//!
//! Native libraries never see Rust closures directly. A closure is stored in
//! a [`HandleRegistry`] and the native side receives only the numeric handle
//! as its `user_data`. When the native library invokes the callback, the
//! generated `extern "C"` trampoline:
//!
//! 1. resolves the handle back to the closure,
//! 2. wraps native struct pointers in [`StructView`]s that alias the native
//!    memory and free it only if the transfer annotation says so,
//! 3. takes ownership of a native error, if any, as a [`NativeError`],
//! 4. calls the closure.
//!
//! ```
//! use std::ffi::c_void;
//! use girgen_runtime::{StructView, Transfer};
//!
//! type Handler = Box<dyn Fn(StructView<c_void>) + Send + Sync>;
//!
//! unsafe extern "C" fn trampoline(object: *mut c_void, user_data: *mut c_void) {
//!     let callback = girgen_runtime::resolve::<Handler>(user_data as usize);
//!     let object = StructView::new(object, Transfer::None, None)
//!         .unwrap_or_else(|err| panic!("argument `object`: {err}"));
//!     callback(object);
//! }
//!
//! let handle = girgen_runtime::register::<Handler>(Box::new(|object: StructView<c_void>| {
//!     assert!(!object.as_ptr().is_null());
//! }));
//! let mut value = 42u32;
//! unsafe { trampoline(&mut value as *mut u32 as *mut c_void, handle as *mut c_void) };
//! assert!(girgen_runtime::release(handle));
//! ```

mod error;
mod handle;
mod view;

pub use error::{take_error, ErrorFreeFn, NativeError, RawError};
pub use handle::{global, register, release, resolve, try_resolve, HandleError, HandleRegistry};
pub use view::{FreeFn, StructView, Transfer, ViewError};
