//! Generation configuration read from TOML.
//!
//! ```toml
//! repositories = ["gir/Foo-1.0.json"]
//!
//! [[namespace]]
//! name = "Foo-1.0"
//! output = "out/foo"
//! filters = [
//!     { absolute = "Foo-1.0.Bar" },
//!     { regex = "C.foo_.*_private" },
//!     { file = "foo-private.h", namespace = "Foo" },
//! ]
//!
//! [[namespace.preprocess]]
//! kind = "rename-type"
//! gir-type = "Foo-1.0.Bar"
//! new-name = "Baz"
//! ```
//!
//! Relative paths are resolved against the directory of the configuration
//! file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::api::filter::absolute::AbsoluteFilter;
use crate::api::filter::file::FileFilter;
use crate::api::filter::regex::RegexFilter;
use crate::api::filter::{FilterMatcher, FilterOrigin};
use crate::api::preprocess::callable::{ModifyParamDirections, MustIntrospect, RenameCallable};
use crate::api::preprocess::enum_members::RenameEnumMembers;
use crate::api::preprocess::getter::PreserveGetName;
use crate::api::preprocess::package::{RemoveCIncludes, RemovePackages};
use crate::api::preprocess::record_fields::RemoveRecordFields;
use crate::api::preprocess::rename_type::TypeRenamer;
use crate::api::preprocess::signal::ModifySignal;
use crate::api::preprocess::Preprocessor;
use crate::error::{Errors, GirError, Result};
use crate::gir::namespace::{must_be_versioned, parse_version_name};
use crate::gir::Direction;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// File the configuration was read from, empty if parsed from a string.
    #[serde(skip)]
    pub path: PathBuf,
    /// Repository documents to load.
    #[serde(default)]
    pub repositories: Vec<PathBuf>,
    #[serde(default, rename = "namespace")]
    pub namespaces: Vec<NamespaceConfig>,
}

/// One generated namespace.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NamespaceConfig {
    /// Versioned qualifier such as `Foo-1.0`.
    pub name: String,
    /// Output directory.
    pub output: PathBuf,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    #[serde(default)]
    pub preprocess: Vec<PreprocessConfig>,
}

/// One filter entry; the key decides the kind. Mixing keys of different
/// kinds is rejected.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged, deny_unknown_fields)]
pub enum FilterConfig {
    Absolute {
        absolute: String,
    },
    Regex {
        regex: String,
    },
    File {
        file: String,
        #[serde(default)]
        namespace: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum PreprocessConfig {
    RemovePackages {
        gir_file: String,
        names: Vec<String>,
    },
    RemoveCIncludes {
        gir_file: String,
        names: Vec<String>,
    },
    PreserveGetName {
        gir_type: String,
    },
    RenameEnumMembers {
        gir_type: String,
        regex: String,
        replace: String,
    },
    RenameType {
        gir_type: String,
        new_name: String,
    },
    RemoveRecordFields {
        gir_type: String,
        fields: Vec<String>,
    },
    MustIntrospect {
        gir_type: String,
    },
    RenameCallable {
        gir_type: String,
        new_name: String,
    },
    ModifyParamDirections {
        gir_type: String,
        directions: BTreeMap<String, Direction>,
    },
    ModifySignalParamDirections {
        selector: String,
        directions: BTreeMap<String, Direction>,
    },
}

impl PreprocessConfig {
    pub fn build(&self) -> Result<Box<dyn Preprocessor>> {
        let preprocessor: Box<dyn Preprocessor> = match self {
            PreprocessConfig::RemovePackages { gir_file, names } => Box::new(
                names
                    .iter()
                    .fold(RemovePackages::builder(gir_file.as_str()), |b, name| b.name(name.as_str()))
                    .build_packages()?,
            ),
            PreprocessConfig::RemoveCIncludes { gir_file, names } => Box::new(
                names
                    .iter()
                    .fold(RemoveCIncludes::builder(gir_file.as_str()), |b, name| b.name(name.as_str()))
                    .build_c_includes()?,
            ),
            PreprocessConfig::PreserveGetName { gir_type } => Box::new(PreserveGetName::new(gir_type.as_str())?),
            PreprocessConfig::RenameEnumMembers {
                gir_type,
                regex,
                replace,
            } => Box::new(RenameEnumMembers::new(gir_type.as_str(), regex, replace.as_str())?),
            PreprocessConfig::RenameType { gir_type, new_name } => {
                Box::new(TypeRenamer::new(gir_type.as_str(), new_name.as_str())?)
            }
            PreprocessConfig::RemoveRecordFields { gir_type, fields } => {
                must_be_versioned(gir_type)?;
                Box::new(
                    fields
                        .iter()
                        .fold(RemoveRecordFields::builder(gir_type.as_str()), |b, field| {
                            b.field(field.as_str())
                        })
                        .build(),
                )
            }
            PreprocessConfig::MustIntrospect { gir_type } => Box::new(MustIntrospect::new(gir_type.as_str())?),
            PreprocessConfig::RenameCallable { gir_type, new_name } => {
                Box::new(RenameCallable::new(gir_type.as_str(), new_name.as_str())?)
            }
            PreprocessConfig::ModifyParamDirections {
                gir_type,
                directions,
            } => Box::new(
                directions
                    .iter()
                    .fold(ModifyParamDirections::builder(gir_type.as_str()), |b, (name, direction)| {
                        b.direction(name.as_str(), *direction)
                    })
                    .build()?,
            ),
            PreprocessConfig::ModifySignalParamDirections {
                selector,
                directions,
            } => Box::new(ModifySignal::param_directions(selector, directions.clone())?),
        };
        Ok(preprocessor)
    }
}

impl FilterConfig {
    pub fn build(&self, origin: FilterOrigin) -> Result<Box<dyn FilterMatcher>> {
        let filter: Box<dyn FilterMatcher> = match self {
            FilterConfig::Absolute { absolute } => Box::new(AbsoluteFilter::new(absolute)?.with_origin(origin)),
            FilterConfig::Regex { regex } => Box::new(RegexFilter::new(regex)?.with_origin(origin)),
            FilterConfig::File {
                file,
                namespace: Some(namespace),
            } => Box::new(FileFilter::in_namespace(namespace.as_str(), file.as_str()).with_origin(origin)),
            FilterConfig::File { file, namespace: None } => {
                Box::new(FileFilter::new(file.as_str()).with_origin(origin))
            }
        };
        Ok(filter)
    }
}

/// Everything needed to run the pipeline, built from a [`GenerationConfig`].
pub struct GenerationPlan {
    pub repositories: Vec<PathBuf>,
    /// Preprocessors of all namespaces, in configuration order.
    pub preprocessors: Vec<Box<dyn Preprocessor>>,
    pub namespaces: Vec<NamespacePlan>,
}

pub struct NamespacePlan {
    /// Versioned qualifier of the namespace.
    pub name: String,
    pub output: PathBuf,
    pub filters: Vec<Box<dyn FilterMatcher>>,
}

impl GenerationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| GirError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| GirError::Config {
            path: path.display().to_string(),
            source,
        })?;
        config.path = path.to_path_buf();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| GirError::Config {
            path: String::new(),
            source,
        })
    }

    /// Resolve a path of the configuration against its directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match self.path.parent() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Construct all preprocessors and filters.
    ///
    /// Every entry is built even after a failure, so that all configuration
    /// errors are reported together.
    pub fn build(&self) -> std::result::Result<GenerationPlan, Errors> {
        let mut errors = Errors::new();
        let mut preprocessors = Vec::new();
        let mut namespaces = Vec::new();

        for namespace in &self.namespaces {
            if parse_version_name(&namespace.name).1.is_empty() {
                errors.push(GirError::UnversionedType {
                    gir_type: namespace.name.clone(),
                });
            }
            for preprocess in &namespace.preprocess {
                match preprocess.build() {
                    Ok(preprocessor) => preprocessors.push(preprocessor),
                    Err(err) => errors.push(err),
                }
            }
            let mut filters = Vec::new();
            for (index, filter) in namespace.filters.iter().enumerate() {
                let origin = FilterOrigin::Config {
                    file: self.path.display().to_string(),
                    namespace: namespace.name.clone(),
                    index,
                };
                match filter.build(origin) {
                    Ok(filter) => filters.push(filter),
                    Err(err) => errors.push(err),
                }
            }
            namespaces.push(NamespacePlan {
                name: namespace.name.clone(),
                output: self.resolve(&namespace.output),
                filters,
            });
        }

        info!(
            preprocessors = preprocessors.len(),
            namespaces = namespaces.len(),
            errors = errors.len(),
            "built generation plan"
        );
        errors.into_result(GenerationPlan {
            repositories: self.repositories.iter().map(|path| self.resolve(path)).collect(),
            preprocessors,
            namespaces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
repositories = ["gir/Foo-1.0.json"]

[[namespace]]
name = "Foo-1.0"
output = "out/foo"
filters = [
    { absolute = "Foo-1.0.Bar" },
    { regex = "C.foo_.*_private" },
    { file = "private" },
    { file = "internal", namespace = "Foo" },
]

[[namespace.preprocess]]
kind = "rename-type"
gir-type = "Foo-1.0.Bar"
new-name = "Baz"

[[namespace.preprocess]]
kind = "modify-param-directions"
gir-type = "Foo-1.0.Widget.get_size"
directions = { width = "out", height = "inout" }

[[namespace.preprocess]]
kind = "remove-c-includes"
gir-file = "Foo-1.0.json"
names = ["foo/private.h", "/^foo-internal/"]
"#;

    #[test]
    fn test_parse() {
        let config = GenerationConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.repositories, [PathBuf::from("gir/Foo-1.0.json")]);
        let namespace = &config.namespaces[0];
        assert_eq!(namespace.name, "Foo-1.0");
        assert_eq!(
            namespace.filters[3],
            FilterConfig::File {
                file: "internal".to_string(),
                namespace: Some("Foo".to_string()),
            }
        );
        assert_eq!(
            namespace.preprocess[0],
            PreprocessConfig::RenameType {
                gir_type: "Foo-1.0.Bar".to_string(),
                new_name: "Baz".to_string(),
            }
        );
        assert_eq!(
            namespace.preprocess[1],
            PreprocessConfig::ModifyParamDirections {
                gir_type: "Foo-1.0.Widget.get_size".to_string(),
                directions: BTreeMap::from([
                    ("height".to_string(), Direction::InOut),
                    ("width".to_string(), Direction::Out),
                ]),
            }
        );
    }

    #[test]
    fn test_build_plan() {
        let plan = GenerationConfig::from_toml_str(CONFIG).unwrap().build().unwrap();
        assert_eq!(plan.preprocessors.len(), 3);
        assert_eq!(plan.namespaces.len(), 1);
        let filters = &plan.namespaces[0].filters;
        assert_eq!(filters.len(), 4);
        assert_eq!(
            filters[1].origin(),
            &FilterOrigin::Config {
                file: String::new(),
                namespace: "Foo-1.0".to_string(),
                index: 1,
            }
        );
    }

    #[test]
    fn test_build_collects_all_errors() {
        let config = GenerationConfig::from_toml_str(
            r#"
[[namespace]]
name = "Foo"
output = "out"
filters = [{ absolute = "Bar" }, { regex = "Foo.(" }]

[[namespace.preprocess]]
kind = "rename-type"
gir-type = "Foo.Bar"
new-name = "Baz"

[[namespace.preprocess]]
kind = "modify-signal-param-directions"
selector = "Foo-1.0.Widget.clicked"
directions = {}
"#,
        )
        .unwrap();
        let Err(errors) = config.build() else {
            panic!("expected errors");
        };
        assert_eq!(errors.len(), 5);
        let kinds: Vec<_> = errors
            .iter()
            .map(|err| match err {
                GirError::UnversionedType { .. } => "unversioned",
                GirError::InvalidFilter { .. } => "filter",
                GirError::InvalidRegex { .. } => "regex",
                GirError::InvalidSignalSelector { .. } => "selector",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, ["unversioned", "unversioned", "selector", "filter", "regex"]);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = GenerationConfig::from_toml_str(
            r#"
[[namespace]]
name = "Foo-1.0"
output = "out"

[[namespace.preprocess]]
kind = "delete-everything"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, GirError::Config { .. }));
    }

    #[test]
    fn test_filter_with_mixed_kinds_is_rejected() {
        for filters in [
            r#"[{ absolute = "Foo-1.0.Bar", regex = "Foo.B.*" }]"#,
            r#"[{ regex = "Foo.B.*", file = "private" }]"#,
            r#"[{ absolute = "Foo-1.0.Bar", namespace = "Foo" }]"#,
        ] {
            let err = GenerationConfig::from_toml_str(&format!(
                "[[namespace]]\nname = \"Foo-1.0\"\noutput = \"out\"\nfilters = {filters}\n"
            ))
            .unwrap_err();
            assert!(matches!(err, GirError::Config { .. }), "{filters}");
        }
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("girgen.toml");
        fs::write(&path, CONFIG).unwrap();
        let config = GenerationConfig::load(&path).unwrap();
        let plan = config.build().unwrap();
        assert_eq!(plan.repositories, [dir.path().join("gir/Foo-1.0.json")]);
        assert_eq!(plan.namespaces[0].output, dir.path().join("out/foo"));
        assert!(matches!(
            plan.namespaces[0].filters[0].origin(),
            FilterOrigin::Config { file, .. } if file.ends_with("girgen.toml")
        ));
    }
}
