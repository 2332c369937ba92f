//! Token generation for native callback trampolines.
//!
//! This module only turns an already classified callback signature into
//! items:
//! - the handler type alias the managed side registers,
//! - the `extern "C"` entry point native code calls,
//! - the extern blocks declaring the native deallocators it uses.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use roxygen::roxygen;

use crate::gir::Transfer;
use crate::utils::edition::RustEdition;

/// How one native argument reaches the managed callback.
#[derive(Clone)]
pub(crate) enum ArgKind {
    /// The registry handle; not passed on.
    UserData,
    /// Passed through unchanged.
    Scalar(syn::Type),
    /// `gboolean`, passed on as `bool`.
    Bool,
    /// Struct pointer wrapped in a view.
    Struct {
        transfer: Transfer,
        free: Option<String>,
        nullable: bool,
    },
    /// Native error taken over as `Option<NativeError>`.
    Error,
}

#[derive(Clone)]
pub(crate) struct Arg {
    pub name: syn::Ident,
    pub kind: ArgKind,
}

/// Identifier for a parameter name, `name_` for keywords and `argN` for
/// anything that is not an identifier at all.
pub(crate) fn param_ident(name: &str, index: usize) -> syn::Ident {
    syn::parse_str::<syn::Ident>(name)
        .or_else(|_| syn::parse_str::<syn::Ident>(&format!("{name}_")))
        .unwrap_or_else(|_| format_ident!("arg{}", index))
}

/// Rust type of a native scalar, by C type or GIR type name.
pub(crate) fn scalar_type(type_name: &str) -> Option<syn::Type> {
    let ty: syn::Type = match type_name {
        "gint" | "int" | "gint32" | "int32_t" => syn::parse_quote!(i32),
        "guint" | "unsigned int" | "guint32" | "uint32_t" => syn::parse_quote!(u32),
        "gint8" | "int8_t" => syn::parse_quote!(i8),
        "guint8" | "guchar" | "uint8_t" => syn::parse_quote!(u8),
        "gint16" | "int16_t" => syn::parse_quote!(i16),
        "guint16" | "uint16_t" => syn::parse_quote!(u16),
        "gint64" | "int64_t" => syn::parse_quote!(i64),
        "guint64" | "uint64_t" => syn::parse_quote!(u64),
        "glong" | "long" => syn::parse_quote!(::std::ffi::c_long),
        "gulong" | "unsigned long" => syn::parse_quote!(::std::ffi::c_ulong),
        "gsize" | "size_t" => syn::parse_quote!(usize),
        "gssize" | "ssize_t" => syn::parse_quote!(isize),
        "gfloat" | "float" => syn::parse_quote!(f32),
        "gdouble" | "double" => syn::parse_quote!(f64),
        "gpointer" | "gconstpointer" | "void*" => syn::parse_quote!(*mut ::std::ffi::c_void),
        "utf8" | "filename" | "gchar*" | "char*" | "const gchar*" | "const char*" => {
            syn::parse_quote!(*const ::std::ffi::c_char)
        }
        _ => return None,
    };
    Some(ty)
}

fn transfer_tokens(runtime: &syn::Path, transfer: Transfer) -> TokenStream {
    match transfer {
        Transfer::None => quote! { #runtime::Transfer::None },
        Transfer::Container => quote! { #runtime::Transfer::Container },
        Transfer::Full => quote! { #runtime::Transfer::Full },
    }
}

fn native_type(runtime: &syn::Path, kind: &ArgKind) -> syn::Type {
    match kind {
        ArgKind::UserData | ArgKind::Struct { .. } => syn::parse_quote!(*mut ::std::ffi::c_void),
        ArgKind::Scalar(ty) => ty.clone(),
        ArgKind::Bool => syn::parse_quote!(i32),
        ArgKind::Error => syn::parse_quote!(*mut #runtime::RawError),
    }
}

fn handler_arg_type(runtime: &syn::Path, kind: &ArgKind) -> Option<syn::Type> {
    let ty = match kind {
        ArgKind::UserData => return None,
        ArgKind::Scalar(ty) => ty.clone(),
        ArgKind::Bool => syn::parse_quote!(bool),
        ArgKind::Struct { nullable: false, .. } => {
            syn::parse_quote!(#runtime::StructView<::std::ffi::c_void>)
        }
        ArgKind::Struct { nullable: true, .. } => {
            syn::parse_quote!(Option<#runtime::StructView<::std::ffi::c_void>>)
        }
        ArgKind::Error => syn::parse_quote!(Option<#runtime::NativeError>),
    };
    Some(ty)
}

/// Statement converting a native argument into its managed form.
fn convert_arg(runtime: &syn::Path, arg: &Arg, error_free: &syn::Ident) -> Option<TokenStream> {
    let name = &arg.name;
    match &arg.kind {
        ArgKind::UserData | ArgKind::Scalar(_) => None,
        ArgKind::Bool => Some(quote! { let #name = #name != 0; }),
        ArgKind::Struct {
            transfer,
            free,
            nullable,
        } => {
            let transfer = transfer_tokens(runtime, *transfer);
            let free = match free {
                Some(free) => {
                    let free = format_ident!("{}", free);
                    quote! { Some(#free as #runtime::FreeFn) }
                }
                None => quote! { None },
            };
            let view = quote! { #runtime::StructView::new(#name, #transfer, #free) };
            if *nullable {
                Some(quote! { let #name = #view.ok(); })
            } else {
                let message = format!("argument `{name}`: {{err}}");
                Some(quote! { let #name = #view.unwrap_or_else(|err| panic!(#message)); })
            }
        }
        ArgKind::Error => Some(quote! { let #name = #runtime::take_error(#name, #error_free); }),
    }
}

/// Local the resolved handler is bound to. Not a GIR parameter name, so no
/// converted argument can shadow it.
const HANDLER_LOCAL: &str = "__girgen_handler";

/// Name of the handler type registered for a callback.
pub(crate) fn handler_ident(callback: &str) -> syn::Ident {
    format_ident!("{}Handler", callback)
}

/// The handler alias and the `extern "C"` trampoline of one callback.
///
/// The trampoline resolves the handle first, then wraps struct and boolean
/// arguments in declaration order, then takes the native error, then calls
/// the handler.
#[roxygen]
pub(crate) fn trampoline_items(
    /// Exported symbol name of the trampoline
    symbol: &str,
    /// GIR name of the callback
    callback: &str,
    /// Classified native arguments, exactly one of them `UserData`
    args: &[Arg],
    /// Path of the runtime crate in the generated code
    runtime: &syn::Path,
    /// Symbol used to free native errors
    error_free: &syn::Ident,
    /// Edition of the generated code
    edition: RustEdition,
) -> Vec<syn::Item> {
    let handler = handler_ident(callback);
    let symbol = format_ident!("{}", symbol);
    let no_mangle = edition.no_mangle();
    let local = format_ident!("{}", HANDLER_LOCAL);
    let doc = format!(" Native entry point for `{callback}`; `user_data` must be a handle of a registered [`{handler}`].");

    let handler_args: Vec<syn::Type> = args
        .iter()
        .filter_map(|arg| handler_arg_type(runtime, &arg.kind))
        .collect();
    let params: Vec<TokenStream> = args
        .iter()
        .map(|arg| {
            let name = &arg.name;
            let ty = native_type(runtime, &arg.kind);
            quote! { #name: #ty }
        })
        .collect();
    let user_data = args
        .iter()
        .find(|arg| matches!(arg.kind, ArgKind::UserData))
        .map(|arg| arg.name.clone())
        .unwrap_or_else(|| format_ident!("user_data"));
    let (errors, views): (Vec<&Arg>, Vec<&Arg>) = args
        .iter()
        .partition(|arg| matches!(arg.kind, ArgKind::Error));
    let conversions: Vec<TokenStream> = views
        .into_iter()
        .chain(errors)
        .filter_map(|arg| convert_arg(runtime, arg, error_free))
        .collect();
    let call_args: Vec<&syn::Ident> = args
        .iter()
        .filter(|arg| !matches!(arg.kind, ArgKind::UserData))
        .map(|arg| &arg.name)
        .collect();

    let alias: syn::Item = syn::parse_quote! {
        pub type #handler = Box<dyn Fn(#(#handler_args),*) + Send + Sync>;
    };
    let function: syn::Item = syn::parse_quote! {
        #[doc = #doc]
        #no_mangle
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn #symbol(#(#params),*) {
            let #local = #runtime::resolve::<#handler>(#user_data as usize);
            #(#conversions)*
            #local(#(#call_args),*);
        }
    };
    vec![alias, function]
}

/// An extern block declaring deallocators of one native library.
#[roxygen]
pub(crate) fn extern_block(
    /// `#[link]` attribute, if linking at build time
    link: Option<syn::Attribute>,
    /// Struct deallocators, taking `*mut c_void`
    free_fns: &[String],
    /// Error deallocator, taking `*mut RawError`
    error_free: Option<&syn::Ident>,
    /// Path of the runtime crate in the generated code
    runtime: &syn::Path,
    /// Edition of the generated code
    edition: RustEdition,
) -> syn::Item {
    let unsafety = edition.extern_block_unsafety();
    let free_fns = free_fns.iter().map(|free| format_ident!("{}", free));
    let error_free = error_free.map(|error_free| quote! { fn #error_free(error: *mut #runtime::RawError); });
    syn::parse_quote! {
        #link
        #unsafety extern "C" {
            #(fn #free_fns(ptr: *mut ::std::ffi::c_void);)*
            #error_free
        }
    }
}
