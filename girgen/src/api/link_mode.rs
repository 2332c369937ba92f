use std::env;

use tracing::warn;

/// Environment variable selecting [`LinkMode::Runtime`] when set to `1`.
pub const RUNTIME_LINK_ENV: &str = "GIRGEN_RUNTIME_LINK";

/// How generated code reaches the native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// Link against the library at build time; extern blocks carry
    /// `#[link(name = ...)]`.
    #[default]
    Import,
    /// Leave symbols to be resolved when the library is loaded at run time.
    Runtime,
}

impl LinkMode {
    /// Read the mode from [`RUNTIME_LINK_ENV`].
    pub fn from_env() -> Self {
        Self::from_env_value(env::var(RUNTIME_LINK_ENV).ok().as_deref())
    }

    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("1") => {
                warn!("{RUNTIME_LINK_ENV}=1: runtime linking is experimental and may not work");
                LinkMode::Runtime
            }
            _ => LinkMode::Import,
        }
    }

    /// The `#[link]` attribute for an extern block of `library`, if this mode
    /// needs one.
    pub fn link_attr(&self, library: &str) -> Option<syn::Attribute> {
        match self {
            LinkMode::Import => Some(syn::parse_quote! { #[link(name = #library)] }),
            LinkMode::Runtime => None,
        }
    }
}

/// Linker names of a `shared-library` list such as
/// `libgtk-4.so.1,libgdk-4.so.1`.
pub fn library_link_names(shared_library: &str) -> Vec<String> {
    shared_library
        .split(',')
        .map(str::trim)
        .filter(|lib| !lib.is_empty())
        .map(|lib| {
            let file = lib.rsplit(['/', '\\']).next().unwrap_or(lib);
            let stem = [".so", ".dylib", ".dll"]
                .iter()
                .filter_map(|ext| file.find(ext).map(|pos| &file[..pos]))
                .next()
                .unwrap_or(file);
            stem.strip_prefix("lib").unwrap_or(stem).to_string()
        })
        .collect()
}
