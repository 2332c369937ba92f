use std::path::Path;

use roxygen::roxygen;
use tracing::warn;

use crate::error::{GirError, Result};
use crate::gir::namespace::{namespace_matches, parse_version_name, split_gir_type, versioned_namespace};
use crate::gir::{Namespace, Node, Repository};
use crate::utils::json::read_repository;

/// A node found by its dotted GIR name, together with the namespace of the
/// repository that declares it.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef<'a> {
    pub namespace: &'a Namespace,
    pub node: &'a Node,
}

/// Mutable counterpart of [`TypeRef`].
#[derive(Debug)]
pub struct TypeMut<'a> {
    pub namespace: &'a Namespace,
    pub node: &'a mut Node,
}

/// All repositories loaded for one generation run.
///
/// Lookups always walk the live model; nothing derived from it is cached,
/// since preprocessors rename and remove nodes in place.
#[derive(Debug, Default)]
pub struct Repositories {
    repos: Vec<Repository>,
}

impl Repositories {
    pub fn new() -> Self {
        Self { repos: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Repository> {
        self.repos.iter()
    }

    /// Add a repository. Two repositories may not share a namespace and version.
    pub fn add(&mut self, repo: Repository) -> Result<()> {
        if let Some(existing) = self.repos.iter().find(|r| r.namespace.name == repo.namespace.name && r.namespace.version == repo.namespace.version) {
            return Err(GirError::DuplicateNamespace {
                namespace: versioned_namespace(&repo.namespace),
                first: existing.path.clone(),
                second: repo.path,
            });
        }
        self.repos.push(repo);
        Ok(())
    }

    /// Load a repository document from disk and add it.
    #[roxygen]
    pub fn load<P: AsRef<Path>>(
        &mut self,
        /// Path to the repository document
        path: P,
    ) -> Result<()> {
        let repo = read_repository(path)?;
        self.add(repo)
    }

    /// Find the repository loaded from the given file. `file` may be the full
    /// originating path or just its file name.
    pub fn from_gir_file(&mut self, file: &str) -> Option<&mut Repository> {
        self.repos.iter_mut().find(|repo| {
            repo.path == file
                || Path::new(&repo.path)
                    .file_name()
                    .is_some_and(|name| name.to_str() == Some(file))
        })
    }

    /// Find the repository named by a versioned qualifier such as `Foo-1.0`.
    pub fn find_repository(&self, qualifier: &str) -> Option<&Repository> {
        self.repos
            .iter()
            .find(|repo| namespace_matches(qualifier, &repo.namespace))
    }

    /// Resolve a fully qualified, versioned GIR type such as `Foo-1.0.Bar`.
    ///
    /// Unversioned qualifiers are rejected with a warning; they are ambiguous
    /// as soon as two versions of a library are loaded.
    pub fn find_full_type(&self, gir_type: &str) -> Option<TypeRef<'_>> {
        let (qualifier, name) = split_full_type(gir_type)?;
        self.repos
            .iter()
            .filter(|repo| namespace_matches(qualifier, &repo.namespace))
            .find_map(|repo| {
                repo.nodes
                    .iter()
                    .find(|node| node.name() == name)
                    .map(|node| TypeRef {
                        namespace: &repo.namespace,
                        node,
                    })
            })
    }

    /// Mutable counterpart of [`find_full_type`](Self::find_full_type).
    pub fn find_full_type_mut(&mut self, gir_type: &str) -> Option<TypeMut<'_>> {
        let (qualifier, name) = split_full_type(gir_type)?;
        for repo in self.repos.iter_mut() {
            if !namespace_matches(qualifier, &repo.namespace) {
                continue;
            }
            let Repository { namespace, nodes, .. } = repo;
            if let Some(node) = nodes.iter_mut().find(|node| node.name() == name) {
                return Some(TypeMut { namespace, node });
            }
        }
        None
    }

    /// Resolve a GIR type whose qualifier may be unversioned (`Foo.Bar`); the
    /// first repository with that namespace name is used.
    pub fn find_type(&self, gir_type: &str) -> Option<TypeRef<'_>> {
        let (qualifier, name) = split_gir_type(gir_type);
        let (namespace_name, version) = parse_version_name(qualifier);
        if !version.is_empty() {
            return self.find_full_type(gir_type);
        }
        self.repos
            .iter()
            .filter(|repo| repo.namespace.name == namespace_name)
            .find_map(|repo| {
                repo.nodes
                    .iter()
                    .find(|node| node.name() == name)
                    .map(|node| TypeRef {
                        namespace: &repo.namespace,
                        node,
                    })
            })
    }
}

fn split_full_type(gir_type: &str) -> Option<(&str, &str)> {
    let (qualifier, name) = split_gir_type(gir_type);
    let (_, version) = parse_version_name(qualifier);
    if version.is_empty() {
        warn!(gir_type, "GIR type lookup without a namespace version");
        return None;
    }
    Some((qualifier, name))
}

impl FromIterator<Repository> for Repositories {
    /// Collect repositories, keeping the first of any namespace+version pair.
    fn from_iter<T: IntoIterator<Item = Repository>>(iter: T) -> Self {
        let mut repos = Self::new();
        for repo in iter {
            if let Err(err) = repos.add(repo) {
                warn!("{err}");
            }
        }
        repos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gir::{Enum, NodeKind, Record};

    fn repo(name: &str, version: &str, path: &str, nodes: Vec<Node>) -> Repository {
        Repository {
            path: path.to_string(),
            namespace: Namespace::new(name, version),
            nodes,
            ..Default::default()
        }
    }

    fn record(name: &str) -> Node {
        Node::Record(Record {
            name: name.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_find_full_type_requires_version() {
        let repos: Repositories = [repo("Foo", "1.0", "gir/Foo-1.0.json", vec![record("Bar")])]
            .into_iter()
            .collect();

        let found = repos.find_full_type("Foo-1.0.Bar").unwrap();
        assert_eq!(found.node.kind(), NodeKind::Record);
        assert_eq!(found.namespace.name, "Foo");

        assert!(repos.find_full_type("Foo-1.Bar").is_some());
        assert!(repos.find_full_type("Foo.Bar").is_none());
        assert!(repos.find_full_type("Foo-2.0.Bar").is_none());
        assert!(repos.find_full_type("Foo-1.0.Baz").is_none());
    }

    #[test]
    fn test_find_type_accepts_unversioned() {
        let repos: Repositories = [repo("Foo", "1.0", "Foo-1.0.json", vec![record("Bar")])]
            .into_iter()
            .collect();
        assert!(repos.find_type("Foo.Bar").is_some());
        assert!(repos.find_type("Foo-1.0.Bar").is_some());
        assert!(repos.find_type("Baz.Bar").is_none());
    }

    #[test]
    fn test_versions_are_disambiguated() {
        let repos: Repositories = [
            repo("Foo", "1.0", "a.json", vec![record("Old")]),
            repo("Foo", "2.0", "b.json", vec![record("New")]),
        ]
        .into_iter()
        .collect();
        assert!(repos.find_full_type("Foo-1.0.Old").is_some());
        assert!(repos.find_full_type("Foo-1.0.New").is_none());
        assert!(repos.find_full_type("Foo-2.0.New").is_some());
    }

    #[test]
    fn test_duplicate_namespace_rejected() {
        let mut repos = Repositories::new();
        repos.add(repo("Foo", "1.0", "a.json", vec![])).unwrap();
        let err = repos.add(repo("Foo", "1.0", "b.json", vec![])).unwrap_err();
        assert!(matches!(err, GirError::DuplicateNamespace { .. }));
        assert_eq!(repos.len(), 1);
    }

    #[test]
    fn test_from_gir_file_matches_file_name() {
        let mut repos: Repositories = [repo("Foo", "1.0", "/usr/share/gir-1.0/Foo-1.0.json", vec![])]
            .into_iter()
            .collect();
        assert!(repos.from_gir_file("Foo-1.0.json").is_some());
        assert!(repos.from_gir_file("/usr/share/gir-1.0/Foo-1.0.json").is_some());
        assert!(repos.from_gir_file("Bar-1.0.json").is_none());
    }

    #[test]
    fn test_find_full_type_mut_edits_in_place() {
        let mut repos: Repositories = [repo(
            "Foo",
            "1.0",
            "Foo-1.0.json",
            vec![Node::Enum(Enum {
                name: "Bar".to_string(),
                ..Default::default()
            })],
        )]
        .into_iter()
        .collect();

        repos.find_full_type_mut("Foo-1.0.Bar").unwrap().node.set_name("Baz");
        assert!(repos.find_full_type("Foo-1.0.Bar").is_none());
        assert!(repos.find_full_type("Foo-1.0.Baz").is_some());
    }
}
