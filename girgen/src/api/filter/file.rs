use std::panic::Location;

use crate::api::filter::{FileGenerator, FilterMatcher, FilterOrigin};
use crate::gir::namespace::versioned_namespace;

/// Omit types declared or documented in a file whose path contains a
/// substring, optionally only within one namespace.
#[derive(Debug, Clone)]
pub struct FileFilter {
    contains: String,
    namespace: Option<String>,
    origin: FilterOrigin,
}

impl FileFilter {
    #[track_caller]
    pub fn new<S: Into<String>>(contains: S) -> Self {
        Self {
            contains: contains.into(),
            namespace: None,
            origin: FilterOrigin::Code(Location::caller()),
        }
    }

    /// Only omit types of the given namespace, written with or without its
    /// version.
    #[track_caller]
    pub fn in_namespace<S1: Into<String>, S2: Into<String>>(namespace: S1, contains: S2) -> Self {
        Self {
            contains: contains.into(),
            namespace: Some(namespace.into()),
            origin: FilterOrigin::Code(Location::caller()),
        }
    }

    pub fn with_origin(mut self, origin: FilterOrigin) -> Self {
        self.origin = origin;
        self
    }
}

impl FilterMatcher for FileFilter {
    fn filter(&self, gen: &dyn FileGenerator, gir: &str, _c: &str) -> bool {
        let Some(found) = gen.find_type(gir) else {
            return false;
        };
        if let Some(namespace) = &self.namespace {
            if found.namespace.name != *namespace && versioned_namespace(found.namespace) != *namespace {
                return false;
            }
        }
        found.node.info().file().unwrap_or_default().contains(&self.contains)
    }

    fn origin(&self) -> &FilterOrigin {
        &self.origin
    }
}
