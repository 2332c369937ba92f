//! Decide whether a candidate symbol is omitted from the generated output.
//!
//! A generator carries an ordered list of [`FilterMatcher`]s. Candidates are
//! checked against them in order and the first matcher that reports a match
//! decides the omission; when none matches the symbol is kept.

pub(crate) mod absolute;
pub(crate) mod file;
pub(crate) mod generator;
pub(crate) mod regex;

use std::fmt;
use std::panic::Location;

use tracing::debug;

use crate::gir::namespace::ensure_namespace;
use crate::gir::{Field, Method};

pub use generator::FileGenerator;

/// Native name used for members without a C identifier. It can never equal
/// a configured name, so such members are not matched by an empty-string rule.
pub const UNMATCHABLE: &str = "\0";

/// Where a filter was registered, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOrigin {
    /// Constructed in code at this location.
    Code(&'static Location<'static>),
    /// Read from a generation config file.
    Config {
        file: String,
        namespace: String,
        index: usize,
    },
}

impl fmt::Display for FilterOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOrigin::Code(location) => write!(f, "{}:{}", location.file(), location.line()),
            FilterOrigin::Config {
                file,
                namespace,
                index,
            } => write!(f, "{file}: namespace {namespace}, filter #{index}"),
        }
    }
}

/// A rule matching GIR and/or C names that should be omitted.
pub trait FilterMatcher: fmt::Debug {
    /// `gir` is always namespace-qualified; `c` is the native identifier or
    /// [`UNMATCHABLE`].
    fn filter(&self, gen: &dyn FileGenerator, gir: &str, c: &str) -> bool;

    fn origin(&self) -> &FilterOrigin;
}

/// The first filter of the generator matching the given names.
pub fn matching_filter<'g>(
    gen: &'g dyn FileGenerator,
    gir: &str,
    c: &str,
) -> Option<&'g dyn FilterMatcher> {
    let gir = ensure_namespace(gen.namespace(), gir);
    let matcher = gen
        .filters()
        .iter()
        .map(|filter| filter.as_ref())
        .find(|filter| filter.filter(gen, &gir, c))?;
    debug!(
        namespace = %gen.namespace().name,
        gir = %gir.escape_default(),
        c = %c.escape_default(),
        filter = ?matcher,
        origin = %matcher.origin(),
        "filtering type"
    );
    Some(matcher)
}

/// Whether the given GIR and/or C name should be omitted by the generator.
pub fn filter(gen: &dyn FileGenerator, gir: &str, c: &str) -> bool {
    matching_filter(gen, gir, c).is_some()
}

/// Filter on the C identifier alone, e.g. for plain C functions.
pub fn filter_c_type(gen: &dyn FileGenerator, c: &str) -> bool {
    filter(gen, UNMATCHABLE, c)
}

/// Filter a member (`parent.sub`) of a type of the generator's namespace.
pub fn filter_sub(gen: &dyn FileGenerator, parent: &str, sub: &str, c: Option<&str>) -> bool {
    let c = c.filter(|c| !c.is_empty()).unwrap_or(UNMATCHABLE);
    let gir = format!("{}.{}.{}", gen.namespace().name, parent, sub);
    filter(gen, &gir, c)
}

pub fn filter_method(gen: &dyn FileGenerator, parent: &str, method: &Method) -> bool {
    filter_sub(gen, parent, &method.name, method.c_identifier.as_deref())
}

pub fn filter_field(gen: &dyn FileGenerator, parent: &str, field: &Field) -> bool {
    filter_sub(gen, parent, &field.name, None)
}
