use tracing::info;

use crate::api::filter::{filter, filter_field, filter_method, filter_sub, FilterMatcher, UNMATCHABLE};
use crate::gir::namespace::versioned_namespace;
use crate::gir::{Field, Method, Namespace, Node, Repositories, Repository, TypeRef};

/// What a filter may ask of the generator evaluating it.
pub trait FileGenerator {
    /// Namespace unqualified candidates belong to.
    fn namespace(&self) -> &Namespace;

    /// Filters in evaluation order.
    fn filters(&self) -> &[Box<dyn FilterMatcher>];

    /// Read-only type lookup; the qualifier may omit the version.
    fn find_type(&self, gir_type: &str) -> Option<TypeRef<'_>>;
}

/// Generates one namespace of the loaded repositories.
pub struct NamespaceGenerator<'a> {
    repos: &'a Repositories,
    namespace: Namespace,
    filters: Vec<Box<dyn FilterMatcher>>,
}

impl<'a> NamespaceGenerator<'a> {
    pub fn new(repos: &'a Repositories, namespace: Namespace, filters: Vec<Box<dyn FilterMatcher>>) -> Self {
        Self {
            repos,
            namespace,
            filters,
        }
    }

    /// The repository of exactly this namespace version.
    pub fn repository(&self) -> Option<&'a Repository> {
        self.repos.iter().find(|repo| {
            repo.namespace.name == self.namespace.name && repo.namespace.version == self.namespace.version
        })
    }

    /// Whether a top-level node is omitted.
    pub fn is_filtered(&self, node: &Node) -> bool {
        filter(self, node.name(), node.c_name().unwrap_or(UNMATCHABLE))
    }

    /// A copy of the repository without the filtered nodes and members.
    ///
    /// Returns `None` when the namespace is not loaded.
    pub fn retained_repository(&self) -> Option<Repository> {
        let repo = self.repository()?;
        let mut retained = repo.clone();
        let total = retained.nodes.len();
        retained.nodes.retain(|node| !self.is_filtered(node));
        for node in retained.nodes.iter_mut() {
            self.retain_members(node);
        }
        info!(
            namespace = %versioned_namespace(&self.namespace),
            retained = retained.nodes.len(),
            omitted = total - retained.nodes.len(),
            "filtered namespace"
        );
        Some(retained)
    }

    fn retain_members(&self, node: &mut Node) {
        let parent = node.name().to_string();
        let keep_method = |method: &Method| !filter_method(self, &parent, method);
        let keep_field = |field: &Field| !filter_field(self, &parent, field);
        match node {
            Node::Class(class) => {
                class.constructors.retain(keep_method);
                class.methods.retain(keep_method);
                class.virtual_methods.retain(keep_method);
                class.fields.retain(keep_field);
            }
            Node::Record(record) => {
                record.constructors.retain(keep_method);
                record.methods.retain(keep_method);
                record.fields.retain(keep_field);
            }
            Node::Interface(interface) => {
                interface.methods.retain(keep_method);
                interface.virtual_methods.retain(keep_method);
            }
            Node::Enum(enumeration) => {
                enumeration.members.retain(|member| {
                    !filter_sub(self, &parent, &member.name, Some(&member.c_identifier))
                });
            }
            Node::Callback(_) | Node::Function(_) => {}
        }
    }
}

impl FileGenerator for NamespaceGenerator<'_> {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn filters(&self) -> &[Box<dyn FilterMatcher>] {
        &self.filters
    }

    fn find_type(&self, gir_type: &str) -> Option<TypeRef<'_>> {
        self.repos.find_type(gir_type)
    }
}
