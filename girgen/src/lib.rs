//! # girgen
//!
//! The model side of a GObject-introspection binding generator.
//!
//! ## Problem
//!
//! Introspection repositories describe a native library well enough to
//! generate bindings from, but never exactly as a binding wants them: type
//! names collide with keywords or with each other, some callables are marked
//! non-introspectable for no good reason, parameter directions are wrong, and
//! private headers leak types nobody should bind. Every binding ends up
//! carrying a list of corrections and omissions on top of the raw data.
//!
//! ## Solution
//!
//! `girgen` loads the repositories into one in-memory model, applies an
//! ordered list of [`preprocess`] corrections to it, and decides per symbol
//! whether it is omitted by an ordered list of [`filter`]s. The result is the
//! corrected, filtered model a renderer consumes. For callbacks it also
//! generates the `extern "C"` trampolines that bridge native invocations to
//! Rust closures through [`girgen-runtime`](https://docs.rs/girgen-runtime).
//!
//! Problems are split in two tiers. A configured target missing from the
//! loaded data is logged with `tracing` and skipped, so one configuration can
//! serve several versions of a library. A configuration that cannot be
//! right (an unversioned type, a malformed selector, the wrong kind of type)
//! is a [`GirError`]; the pipeline collects all of them into [`Errors`].
//!
//! ## Usage example
//!
//! ```
//! use girgen::filter::{filter, AbsoluteFilter, FilterMatcher, NamespaceGenerator};
//! use girgen::preprocess::{apply_preprocessors, Preprocessor, RemoveRecordFields, TypeRenamer};
//! use girgen::{Field, Namespace, Node, Record, Repositories, Repository};
//!
//! let mut repos: Repositories = [Repository {
//!     namespace: Namespace::new("Foo", "1.0"),
//!     nodes: vec![Node::Record(Record {
//!         name: "Bar".to_string(),
//!         fields: vec![Field { name: "priv".to_string(), ..Default::default() }],
//!         ..Default::default()
//!     })],
//!     ..Default::default()
//! }]
//! .into_iter()
//! .collect();
//!
//! let preprocessors: Vec<Box<dyn Preprocessor>> = vec![
//!     Box::new(TypeRenamer::new("Foo-1.0.Bar", "Baz").unwrap()),
//!     Box::new(RemoveRecordFields::builder("Foo-1.0.Baz").field("priv").build()),
//! ];
//! apply_preprocessors(&mut repos, &preprocessors).unwrap();
//!
//! let filters: Vec<Box<dyn FilterMatcher>> = vec![Box::new(AbsoluteFilter::new("Foo-1.0.Baz").unwrap())];
//! let gen = NamespaceGenerator::new(&repos, Namespace::new("Foo", "1.0"), filters);
//! assert!(filter(&gen, "Baz", "FooBaz"));
//! ```

pub(crate) mod api;
pub(crate) mod codegen;
pub(crate) mod error;
pub(crate) mod gir;
pub(crate) mod utils;

pub use crate::api::config::{
    FilterConfig, GenerationConfig, GenerationPlan, NamespaceConfig, NamespacePlan, PreprocessConfig,
};
pub use crate::api::link_mode::{library_link_names, LinkMode, RUNTIME_LINK_ENV};
pub use crate::api::locate::{locate_callable_mut, locate_signal_mut, SignalSelector};
pub use crate::api::trampoline::{TrampolineBuilder, TrampolineFile};
pub use crate::error::{Errors, GirError, Result};
pub use crate::gir::namespace::{
    ensure_namespace, eq_namespace, major_version, must_be_versioned, parse_version_name, split_gir_type,
    versioned_namespace,
};
pub use crate::gir::*;
pub use crate::utils::edition::RustEdition;
pub use crate::utils::json::{read_repository, write_repository};
pub use crate::utils::strcases::{guess_snake, GetterStyle, SnakeGuess};

/// Mutations of the loaded model, applied in order by [`apply_preprocessors`](preprocess::apply_preprocessors)
pub mod preprocess {
    pub use crate::api::preprocess::callable::{CallableContext, ModifyCallable, ModifyParamDirections, MustIntrospect, RenameCallable};
    pub mod modify_param_directions {
        pub use crate::api::preprocess::callable::Builder;
    }
    pub use crate::api::preprocess::enum_members::RenameEnumMembers;
    pub use crate::api::preprocess::getter::PreserveGetName;
    pub use crate::api::preprocess::package::{PathMatcher, RemoveCIncludes, RemovePackages};
    pub mod remove_packages {
        pub use crate::api::preprocess::package::Builder;
    }
    pub use crate::api::preprocess::record_fields::RemoveRecordFields;
    pub mod remove_record_fields {
        pub use crate::api::preprocess::record_fields::Builder;
    }
    pub use crate::api::preprocess::rename_type::TypeRenamer;
    pub use crate::api::preprocess::signal::ModifySignal;
    pub use crate::api::preprocess::{apply_preprocessors, Preprocessor};
}

/// Deciding which symbols are omitted from the generated output
pub mod filter {
    pub use crate::api::filter::absolute::AbsoluteFilter;
    pub use crate::api::filter::file::FileFilter;
    pub use crate::api::filter::generator::{FileGenerator, NamespaceGenerator};
    pub use crate::api::filter::regex::RegexFilter;
    pub use crate::api::filter::{
        filter, filter_c_type, filter_field, filter_method, filter_sub, matching_filter, FilterMatcher, FilterOrigin,
        UNMATCHABLE,
    };
}

/// Callback trampoline generation
pub mod trampoline {
    pub use crate::api::trampoline::Builder;
}
