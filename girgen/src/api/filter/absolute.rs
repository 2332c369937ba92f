use std::panic::Location;

use crate::api::filter::{FileGenerator, FilterMatcher, FilterOrigin};
use crate::error::{GirError, Result};
use crate::gir::namespace::{eq_namespace, split_gir_type};

/// Match one name exactly.
///
/// `Foo-1.0.Bar` matches the GIR type `Bar` of namespace `Foo` (with or
/// without version); `C.foo_bar` matches the native identifier `foo_bar`.
#[derive(Debug, Clone)]
pub struct AbsoluteFilter {
    namespace: String,
    matcher: String,
    origin: FilterOrigin,
}

impl AbsoluteFilter {
    #[track_caller]
    pub fn new(absolute: &str) -> Result<Self> {
        let (namespace, matcher) = split_gir_type(absolute);
        if namespace.is_empty() {
            return Err(GirError::InvalidFilter {
                filter: absolute.to_string(),
                reason: "expected a namespace qualifier such as Foo-1.0.Bar or C.foo_bar",
            });
        }
        Ok(Self {
            namespace: namespace.to_string(),
            matcher: matcher.to_string(),
            origin: FilterOrigin::Code(Location::caller()),
        })
    }

    pub fn with_origin(mut self, origin: FilterOrigin) -> Self {
        self.origin = origin;
        self
    }
}

impl FilterMatcher for AbsoluteFilter {
    fn filter(&self, _gen: &dyn FileGenerator, gir: &str, c: &str) -> bool {
        if self.namespace == "C" {
            return c == self.matcher;
        }
        let (typ, eq) = eq_namespace(&self.namespace, gir);
        eq && typ == self.matcher
    }

    fn origin(&self) -> &FilterOrigin {
        &self.origin
    }
}
