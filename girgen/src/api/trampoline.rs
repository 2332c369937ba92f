//! Native-side source for callback trampolines.
//!
//! For every callback of a repository that takes a user-data pointer and
//! returns nothing, an `extern "C"` function named
//! `_girgen_<namespace><major>_<Callback>` is generated. Bindings hand that
//! function to the native library together with a handle from
//! `girgen_runtime::register`; the trampoline resolves the handle and calls
//! the registered closure with views of the native arguments.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use roxygen::roxygen;
use tracing::{debug, warn};

use crate::api::link_mode::{library_link_names, LinkMode};
use crate::codegen::trampoline::{extern_block, param_ident, scalar_type, trampoline_items, Arg, ArgKind};
use crate::error::{GirError, Result};
use crate::gir::namespace::{major_version, versioned_namespace};
use crate::gir::{Callback, Direction, Namespace, Node, Parameter, Repositories, Repository, Transfer, TypeRef};
use crate::utils::edition::RustEdition;

const GLIB_LIBRARY: &str = "glib-2.0";
const GOBJECT_LIBRARY: &str = "gobject-2.0";
const ERROR_FREE: &str = "g_error_free";

/// Builder for [`TrampolineBuilder`]
pub struct Builder {
    edition: RustEdition,
    link_mode: LinkMode,
    runtime: syn::Path,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            edition: RustEdition::default(),
            link_mode: LinkMode::default(),
            runtime: syn::parse_quote!(::girgen_runtime),
        }
    }

    /// Edition of the crate the generated file is compiled in
    pub fn edition(mut self, edition: RustEdition) -> Self {
        self.edition = edition;
        self
    }

    pub fn link_mode(mut self, link_mode: LinkMode) -> Self {
        self.link_mode = link_mode;
        self
    }

    /// Path the generated code uses for the runtime crate, `::girgen_runtime`
    /// by default
    #[roxygen]
    pub fn runtime_path(
        mut self,
        /// e.g. `crate::runtime` when the runtime is re-exported
        runtime: syn::Path,
    ) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn build(self) -> TrampolineBuilder {
        TrampolineBuilder { builder: self }
    }
}

/// Generates the trampoline source of one repository.
///
/// # Example
///
/// ```
/// use girgen::{LinkMode, Repositories, Repository, RustEdition, TrampolineBuilder};
///
/// let repos = Repositories::new();
/// let trampolines = TrampolineBuilder::builder()
///     .edition(RustEdition::Edition2021)
///     .link_mode(LinkMode::Import)
///     .build()
///     .generate(&repos, &Repository::default());
/// assert!(trampolines.generated().is_empty());
/// ```
pub struct TrampolineBuilder {
    builder: Builder,
}

/// Native deallocators a generated file needs, by library.
#[derive(Default)]
struct Externs {
    free_fns: BTreeMap<Option<String>, BTreeSet<String>>,
    error_free: bool,
}

impl Externs {
    fn merge(&mut self, other: Externs) {
        for (library, free_fns) in other.free_fns {
            self.free_fns.entry(library).or_default().extend(free_fns);
        }
        self.error_free |= other.error_free;
    }
}

impl TrampolineBuilder {
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Exported symbol of the trampoline for a callback.
    pub fn symbol(namespace: &Namespace, callback: &str) -> String {
        format!(
            "_girgen_{}{}_{}",
            namespace.name.to_lowercase(),
            major_version(&namespace.version),
            callback
        )
    }

    /// Generate trampolines for the callbacks of `repo`.
    ///
    /// `repos` resolves the types of callback parameters. Callbacks with a
    /// signature the trampolines cannot express are skipped with a warning.
    pub fn generate(&self, repos: &Repositories, repo: &Repository) -> TrampolineFile {
        let runtime = &self.builder.runtime;
        let edition = self.builder.edition;
        let error_free = quote::format_ident!("{}", ERROR_FREE);

        let mut items = Vec::new();
        let mut externs = Externs::default();
        let mut generated = Vec::new();
        let mut skipped = Vec::new();

        for node in &repo.nodes {
            let Node::Callback(callback) = node else {
                continue;
            };
            let name = callback.callable.name.clone();
            match classify_callback(repos, &repo.namespace, callback) {
                Ok((args, needed)) => {
                    let symbol = Self::symbol(&repo.namespace, &name);
                    debug!(callback = %name, symbol = %symbol, "generating trampoline");
                    items.extend(trampoline_items(&symbol, &name, &args, runtime, &error_free, edition));
                    externs.merge(needed);
                    generated.push(symbol);
                }
                Err(reason) => {
                    warn!(
                        namespace = %versioned_namespace(&repo.namespace),
                        callback = %name,
                        "skipping callback: {reason}"
                    );
                    skipped.push((name, reason));
                }
            }
        }

        if externs.error_free {
            externs.free_fns.entry(Some(GLIB_LIBRARY.to_string())).or_default();
        }
        for (library, free_fns) in &externs.free_fns {
            let is_glib = library.as_deref() == Some(GLIB_LIBRARY);
            let error_free = (is_glib && externs.error_free).then_some(&error_free);
            let free_fns: Vec<String> = free_fns.iter().cloned().collect();
            let link = library
                .as_deref()
                .and_then(|library| self.builder.link_mode.link_attr(library));
            items.push(extern_block(link, &free_fns, error_free, runtime, edition));
        }

        TrampolineFile {
            file: syn::File {
                shebang: None,
                attrs: vec![],
                items,
            },
            generated,
            skipped,
        }
    }
}

/// Generated trampolines of one repository.
pub struct TrampolineFile {
    file: syn::File,
    generated: Vec<String>,
    skipped: Vec<(String, String)>,
}

impl TrampolineFile {
    /// Symbols of the generated trampolines.
    pub fn generated(&self) -> &[String] {
        &self.generated
    }

    /// Callbacks without a trampoline, with the reason.
    pub fn skipped(&self) -> &[(String, String)] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }

    /// Formatted Rust source.
    pub fn to_source(&self) -> String {
        prettyplease::unparse(&self.file)
    }

    /// Write the formatted source, creating parent directories.
    #[roxygen]
    pub fn write<P: AsRef<Path>>(
        &self,
        /// Destination file
        path: P,
    ) -> Result<PathBuf> {
        let path = path.as_ref();
        let io_error = |source| GirError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, self.to_source()).map_err(io_error)?;
        Ok(path.to_path_buf())
    }
}

fn normalize_c_type(c_type: &str) -> String {
    c_type
        .trim()
        .trim_start_matches("const ")
        .replace(" *", "*")
        .trim()
        .to_string()
}

fn is_gpointer(parameter: &Parameter) -> bool {
    let c_type = parameter.c_type.as_deref().map(normalize_c_type);
    matches!(c_type.as_deref(), None | Some("gpointer") | Some("void*"))
        && matches!(parameter.type_name.as_deref(), None | Some("gpointer"))
}

/// Index of the user-data parameter: the one closure annotations point at,
/// or the one named `user_data`.
fn user_data_index(callback: &Callback) -> std::result::Result<usize, String> {
    let parameters = &callback.callable.parameters;
    let mut candidates: BTreeSet<usize> = parameters
        .iter()
        .filter_map(|p| p.closure)
        .filter(|index| *index < parameters.len())
        .collect();
    if candidates.is_empty() {
        candidates.extend(
            parameters
                .iter()
                .position(|p| p.name == "user_data"),
        );
    }
    let mut candidates = candidates.into_iter();
    match (candidates.next(), candidates.next()) {
        (Some(index), None) if is_gpointer(&parameters[index]) => Ok(index),
        (Some(_), None) => Err("user data parameter is not a plain pointer".to_string()),
        (Some(_), Some(_)) => Err("more than one user data parameter".to_string()),
        (None, _) => Err("no user data parameter".to_string()),
    }
}

fn find_parameter_type<'a>(
    repos: &'a Repositories,
    namespace: &Namespace,
    type_name: &str,
) -> Option<TypeRef<'a>> {
    if type_name.contains('.') {
        repos.find_type(type_name)
    } else {
        repos.find_full_type(&format!("{}.{}", versioned_namespace(namespace), type_name))
    }
}

fn first_link_name(namespace: &Namespace) -> Option<String> {
    namespace
        .shared_library
        .as_deref()
        .and_then(|libs| library_link_names(libs).into_iter().next())
}

fn classify_parameter(
    repos: &Repositories,
    namespace: &Namespace,
    parameter: &Parameter,
    externs: &mut Externs,
) -> std::result::Result<ArgKind, String> {
    let unsupported = |what: &str| {
        format!(
            "parameter `{}` of type `{}` is {what}",
            parameter.name,
            parameter
                .type_name
                .as_deref()
                .or(parameter.c_type.as_deref())
                .unwrap_or("?")
        )
    };
    if parameter.direction != Direction::In {
        return Err(unsupported("not an input"));
    }

    let c_type = parameter.c_type.as_deref().map(normalize_c_type);
    let c_type = c_type.as_deref().unwrap_or_default();
    let type_name = parameter.type_name.as_deref().unwrap_or_default();

    if c_type == "GError*" || matches!(type_name, "GLib.Error" | "Error") {
        if c_type.ends_with("**") {
            return Err(unsupported("an error out-pointer"));
        }
        externs.error_free = true;
        return Ok(ArgKind::Error);
    }
    if c_type == "gboolean" || type_name == "gboolean" {
        return Ok(ArgKind::Bool);
    }
    if let Some(ty) = scalar_type(c_type).or_else(|| scalar_type(type_name)) {
        return Ok(ArgKind::Scalar(ty));
    }

    let found = find_parameter_type(repos, namespace, type_name).ok_or_else(|| unsupported("unknown"))?;
    let transfer = parameter.transfer_ownership;
    let owned = transfer != Transfer::None;
    let free = match found.node {
        Node::Enum(_) => return Ok(ArgKind::Scalar(syn::parse_quote!(i32))),
        Node::Record(record) if owned => {
            let free = record
                .methods
                .iter()
                .find(|m| m.name == "free")
                .and_then(|m| m.c_identifier.clone());
            match free {
                Some(free) => Some((first_link_name(found.namespace), free)),
                None => Some((Some(GLIB_LIBRARY.to_string()), "g_free".to_string())),
            }
        }
        Node::Class(_) | Node::Interface(_) if owned => {
            Some((Some(GOBJECT_LIBRARY.to_string()), "g_object_unref".to_string()))
        }
        Node::Record(_) | Node::Class(_) | Node::Interface(_) => None,
        Node::Callback(_) | Node::Function(_) => return Err(unsupported("not a struct")),
    };
    if !c_type.is_empty() && !c_type.ends_with('*') {
        return Err(unsupported("passed by value"));
    }
    let free = free.map(|(library, free)| {
        externs.free_fns.entry(library).or_default().insert(free.clone());
        free
    });
    Ok(ArgKind::Struct {
        transfer,
        free,
        nullable: parameter.nullable,
    })
}

fn classify_callback(
    repos: &Repositories,
    namespace: &Namespace,
    callback: &Callback,
) -> std::result::Result<(Vec<Arg>, Externs), String> {
    let callable = &callback.callable;
    if !callable.return_value.as_ref().map_or(true, |rv| rv.is_void()) {
        return Err("returns a value".to_string());
    }
    if callable.throws {
        return Err("throws".to_string());
    }
    let user_data = user_data_index(callback)?;

    let mut externs = Externs::default();
    let args = callable
        .parameters
        .iter()
        .enumerate()
        .map(|(index, parameter)| {
            let kind = if index == user_data {
                ArgKind::UserData
            } else {
                classify_parameter(repos, namespace, parameter, &mut externs)?
            };
            Ok(Arg {
                name: param_ident(&parameter.name, index),
                kind,
            })
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;
    Ok((args, externs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gir::{CallableAttrs, Class, Enum, Method, Record, ReturnValue};

    fn param(name: &str, type_name: &str, c_type: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            type_name: Some(type_name.to_string()),
            c_type: Some(c_type.to_string()),
            ..Default::default()
        }
    }

    fn user_data() -> Parameter {
        Parameter {
            closure: Some(99),
            ..param("user_data", "gpointer", "gpointer")
        }
    }

    fn callback(name: &str, parameters: Vec<Parameter>) -> Node {
        Node::Callback(Callback {
            c_type: Some(format!("Foo{name}")),
            callable: CallableAttrs {
                name: name.to_string(),
                parameters,
                ..Default::default()
            },
        })
    }

    fn repos(callbacks: Vec<Node>) -> Repositories {
        let mut nodes = vec![
            Node::Record(Record {
                name: "Point".to_string(),
                c_type: Some("FooPoint".to_string()),
                methods: vec![Method {
                    name: "free".to_string(),
                    c_identifier: Some("foo_point_free".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            Node::Class(Class {
                name: "Widget".to_string(),
                c_type: Some("FooWidget".to_string()),
                ..Default::default()
            }),
            Node::Enum(Enum {
                name: "Mode".to_string(),
                ..Default::default()
            }),
        ];
        nodes.extend(callbacks);
        [Repository {
            namespace: Namespace {
                shared_library: Some("libfoo-1.so.0".to_string()),
                ..Namespace::new("Foo", "1.0")
            },
            nodes,
            ..Default::default()
        }]
        .into_iter()
        .collect()
    }

    fn generate(repos: &Repositories) -> TrampolineFile {
        let repo = repos.find_repository("Foo-1.0").unwrap();
        TrampolineBuilder::builder()
            .edition(RustEdition::Edition2021)
            .build()
            .generate(repos, repo)
    }

    #[test]
    fn test_symbol() {
        assert_eq!(
            TrampolineBuilder::symbol(&Namespace::new("Gio", "2.0"), "AsyncReadyCallback"),
            "_girgen_gio2_AsyncReadyCallback"
        );
    }

    #[test]
    fn test_generated_source() {
        let mut point = param("point", "Point", "FooPoint*");
        point.transfer_ownership = Transfer::Full;
        let mut error = param("error", "GLib.Error", "const GError*");
        error.nullable = true;
        let mut user_data = user_data();
        user_data.closure = Some(4);
        let repos = repos(vec![callback(
            "PointReady",
            vec![
                point,
                param("widget", "Widget", "FooWidget*"),
                param("mode", "Mode", "FooMode"),
                error,
                user_data,
            ],
        )]);

        let file = generate(&repos);
        assert_eq!(file.generated(), ["_girgen_foo1_PointReady"]);
        assert!(file.skipped().is_empty());

        let source = file.to_source();
        assert!(source.contains("pub type PointReadyHandler"));
        assert!(source.contains("#[no_mangle]"));
        assert!(source.contains("pub unsafe extern \"C\" fn _girgen_foo1_PointReady("));
        assert!(source.contains("Some(foo_point_free as ::girgen_runtime::FreeFn)"));
        assert!(source.contains("::girgen_runtime::Transfer::None"));
        assert!(source.contains("#[link(name = \"foo-1\")]"));
        assert!(source.contains("#[link(name = \"glib-2.0\")]"));
        assert!(source.contains("fn g_error_free(error: *mut ::girgen_runtime::RawError);"));
        assert!(!source.contains("gobject-2.0"));
    }

    #[test]
    fn test_runtime_link_mode_omits_link_attributes() {
        let mut point = param("point", "Point", "FooPoint*");
        point.transfer_ownership = Transfer::Full;
        let repos = repos(vec![callback("PointReady", vec![point, user_data()])]);
        let repo = repos.find_repository("Foo-1.0").unwrap();
        let source = TrampolineBuilder::builder()
            .edition(RustEdition::Edition2024)
            .link_mode(LinkMode::Runtime)
            .build()
            .generate(&repos, repo)
            .to_source();
        assert!(source.contains("#[unsafe(no_mangle)]"));
        assert!(source.contains("unsafe extern \"C\" {"));
        assert!(!source.contains("#[link("));
    }

    #[test]
    fn test_unsupported_callbacks_are_skipped() {
        let mut returns = callback("Compare", vec![user_data()]);
        if let Node::Callback(cb) = &mut returns {
            cb.callable.return_value = Some(ReturnValue {
                type_name: Some("gint".to_string()),
                ..Default::default()
            });
        }
        let repos = repos(vec![
            returns,
            callback("NoData", vec![param("value", "gint", "gint")]),
            callback("Unknown", vec![param("thing", "Gone", "FooGone*"), user_data()]),
            callback("Notify", vec![param("flag", "gboolean", "gboolean"), user_data()]),
        ]);
        let file = generate(&repos);
        assert_eq!(file.generated(), ["_girgen_foo1_Notify"]);
        let skipped: Vec<_> = file.skipped().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(skipped, ["Compare", "NoData", "Unknown"]);
    }

    #[test]
    fn test_parameter_named_callback_does_not_shadow_handler() {
        let repos = repos(vec![callback(
            "Notify",
            vec![param("callback", "Widget", "FooWidget*"), user_data()],
        )]);
        let file = generate(&repos);
        assert_eq!(file.generated(), ["_girgen_foo1_Notify"]);

        let source: String = file.to_source().split_whitespace().collect();
        assert!(source.contains("let__girgen_handler=::girgen_runtime::resolve::<NotifyHandler>(user_dataasusize);"));
        assert!(source.contains("letcallback=::girgen_runtime::StructView::new(callback,"));
        assert!(source.contains("__girgen_handler(callback);"));
        assert!(!source.contains("callback(callback)"));
    }

    #[test]
    fn test_write_creates_directories() {
        let repos = repos(vec![callback("Notify", vec![user_data()])]);
        let dir = tempfile::tempdir().unwrap();
        let path = generate(&repos).write(dir.path().join("out/trampolines.rs")).unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("_girgen_foo1_Notify"));
    }
}
