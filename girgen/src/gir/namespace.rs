//! Namespace qualifiers: splitting dotted GIR names and comparing namespaces
//! with and without a version suffix.

use crate::error::{GirError, Result};
use crate::gir::Namespace;

/// Split a GIR type into its namespace qualifier and the remainder.
///
/// The qualifier is everything before the first `.`, except that a versioned
/// qualifier (`Name-1.0`) keeps the all-digit segments of its version:
///
/// ```
/// assert_eq!(girgen::split_gir_type("Foo-1.0.Bar.baz"), ("Foo-1.0", "Bar.baz"));
/// assert_eq!(girgen::split_gir_type("Foo.Bar"), ("Foo", "Bar"));
/// assert_eq!(girgen::split_gir_type("Bar"), ("", "Bar"));
/// ```
pub fn split_gir_type(gir_type: &str) -> (&str, &str) {
    let Some(first_dot) = gir_type.find('.') else {
        return ("", gir_type);
    };
    if !gir_type[..first_dot].contains('-') {
        return (&gir_type[..first_dot], &gir_type[first_dot + 1..]);
    }

    let mut end = first_dot;
    while let Some(rest) = gir_type.get(end + 1..) {
        let segment_len = rest.find('.').unwrap_or(rest.len());
        let segment = &rest[..segment_len];
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        // A trailing all-digit segment is a type name, not a version part.
        if segment_len == rest.len() {
            break;
        }
        end += 1 + segment_len;
    }

    (&gir_type[..end], &gir_type[end + 1..])
}

/// Split a namespace qualifier into its name and version (`"Foo-1.0"` into
/// `("Foo", "1.0")`). The version is empty when the qualifier has none.
pub fn parse_version_name(qualifier: &str) -> (&str, &str) {
    match qualifier.split_once('-') {
        Some((name, version)) => (name, version),
        None => (qualifier, ""),
    }
}

/// The qualifier naming exactly this namespace version, e.g. `Foo-1.0`.
pub fn versioned_namespace(namespace: &Namespace) -> String {
    format!("{}-{}", namespace.name, namespace.version)
}

/// The major component of a version string.
pub fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Whether a versioned qualifier names the given namespace. The qualifier
/// version may be the full version or only its major component.
pub fn namespace_matches(qualifier: &str, namespace: &Namespace) -> bool {
    let (name, version) = parse_version_name(qualifier);
    name == namespace.name
        && (version == namespace.version || version == major_version(&namespace.version))
}

/// Prefix `name` with the namespace unless it is already qualified.
pub fn ensure_namespace(namespace: &Namespace, name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("{}.{}", namespace.name, name)
    }
}

/// Compare the namespace of `gir_type` against the `wanted` qualifier.
///
/// Returns the bare name of `gir_type` and whether the namespaces are equal.
/// When `wanted` carries a version but the namespace of `gir_type` does not,
/// the version is dropped from `wanted` before comparing. The reverse never
/// happens: an unversioned `wanted` does not match a versioned type.
pub fn eq_namespace<'a>(wanted: &str, gir_type: &'a str) -> (&'a str, bool) {
    let (namespace, typ) = split_gir_type(gir_type);

    let (wanted_name, wanted_version) = parse_version_name(wanted);
    let mut wanted = wanted;
    if !wanted_version.is_empty() {
        let (_, version) = parse_version_name(namespace);
        if version.is_empty() {
            wanted = wanted_name;
        }
    }

    (typ, namespace == wanted)
}

/// Fail unless the namespace of `gir_type` carries an explicit version.
pub fn must_be_versioned(gir_type: &str) -> Result<()> {
    let (namespace, _) = split_gir_type(gir_type);
    let (_, version) = parse_version_name(namespace);
    if version.is_empty() {
        return Err(GirError::UnversionedType {
            gir_type: gir_type.to_string(),
        });
    }
    Ok(())
}
