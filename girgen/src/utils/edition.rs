/// Rust edition of the crate the generated trampolines are compiled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RustEdition {
    /// Rust 2021 edition
    Edition2021,
    /// Rust 2024 edition
    Edition2024,
}

impl RustEdition {
    /// Convert edition to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RustEdition::Edition2021 => "2021",
            RustEdition::Edition2024 => "2024",
        }
    }

    /// The `no_mangle` attribute accepted by this edition
    pub fn no_mangle(&self) -> syn::Attribute {
        match self {
            RustEdition::Edition2024 => syn::parse_quote! { #[unsafe(no_mangle)] },
            RustEdition::Edition2021 => syn::parse_quote! { #[no_mangle] },
        }
    }

    /// `unsafe` for extern blocks where this edition requires it
    pub fn extern_block_unsafety(&self) -> Option<syn::Token![unsafe]> {
        match self {
            RustEdition::Edition2024 => Some(Default::default()),
            RustEdition::Edition2021 => None,
        }
    }
}

impl std::fmt::Display for RustEdition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for RustEdition {
    /// Default edition based on compiler version
    fn default() -> Self {
        if_rust_version::if_rust_version! { >= 1.82 {
            RustEdition::Edition2024
        } else {
            RustEdition::Edition2021
        }}
    }
}
