// Generated by `TrampolineBuilder` for the `Foo-1.0` fixture of
// girgen/tests/trampolines.rs (edition 2021, runtime link mode).
// Regenerate with `GIRGEN_BLESS=1 cargo test -p girgen --test trampolines`.
pub type PointReadyHandler = Box<
    dyn Fn(
            ::girgen_runtime::StructView<::std::ffi::c_void>,
            Option<::girgen_runtime::NativeError>,
            bool,
            Option<::girgen_runtime::StructView<::std::ffi::c_void>>,
        ) + Send
        + Sync,
>;
/// Native entry point for `PointReady`; `user_data` must be a handle of a registered [`PointReadyHandler`].
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _girgen_foo1_PointReady(
    point: *mut ::std::ffi::c_void,
    error: *mut ::girgen_runtime::RawError,
    ok: i32,
    callback: *mut ::std::ffi::c_void,
    user_data: *mut ::std::ffi::c_void,
) {
    let __girgen_handler = ::girgen_runtime::resolve::<PointReadyHandler>(user_data as usize);
    let point = ::girgen_runtime::StructView::new(
            point,
            ::girgen_runtime::Transfer::Full,
            Some(foo_point_free as ::girgen_runtime::FreeFn),
        )
        .unwrap_or_else(|err| panic!("argument `point`: {err}"));
    let ok = ok != 0;
    let callback = ::girgen_runtime::StructView::new(
            callback,
            ::girgen_runtime::Transfer::None,
            None,
        )
        .ok();
    let error = ::girgen_runtime::take_error(error, g_error_free);
    __girgen_handler(point, error, ok, callback);
}
extern "C" {
    fn foo_point_free(ptr: *mut ::std::ffi::c_void);
}
extern "C" {
    fn g_error_free(error: *mut ::girgen_runtime::RawError);
}
