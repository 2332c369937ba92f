use std::panic::Location;

use regex::Regex;

use crate::api::filter::{FileGenerator, FilterMatcher, FilterOrigin};
use crate::error::{GirError, Result};
use crate::gir::namespace::{eq_namespace, split_gir_type};

/// Match names against a regular expression.
///
/// The namespace token selects what is matched: `C` the native identifier,
/// `*` the whole namespace-qualified GIR name, anything else the bare GIR
/// name within that namespace. The pattern must match the whole string
/// unless it contains `(?`, in which case it is used as written.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    namespace: String,
    matcher: Regex,
    origin: FilterOrigin,
}

impl RegexFilter {
    #[track_caller]
    pub fn new(pattern: &str) -> Result<Self> {
        let origin = FilterOrigin::Code(Location::caller());
        let (namespace, matcher) = split_gir_type(pattern);
        if namespace.is_empty() {
            return Err(GirError::InvalidFilter {
                filter: pattern.to_string(),
                reason: "expected a namespace qualifier, `C.` or `*.` before the pattern",
            });
        }
        Ok(Self {
            namespace: namespace.to_string(),
            matcher: whole_match_regex(matcher)?,
            origin,
        })
    }

    pub fn with_origin(mut self, origin: FilterOrigin) -> Self {
        self.origin = origin;
        self
    }
}

fn whole_match_regex(pattern: &str) -> Result<Regex> {
    let anchored = if pattern.contains("(?") {
        pattern.to_string()
    } else {
        format!("^{pattern}$")
    };
    Regex::new(&anchored).map_err(|source| GirError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

impl FilterMatcher for RegexFilter {
    fn filter(&self, _gen: &dyn FileGenerator, gir: &str, c: &str) -> bool {
        match self.namespace.as_str() {
            "C" => self.matcher.is_match(c),
            "*" => self.matcher.is_match(gir),
            namespace => {
                let (typ, eq) = eq_namespace(namespace, gir);
                eq && self.matcher.is_match(typ)
            }
        }
    }

    fn origin(&self) -> &FilterOrigin {
        &self.origin
    }
}
