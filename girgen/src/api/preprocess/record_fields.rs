use std::collections::HashSet;

use roxygen::roxygen;
use tracing::warn;

use crate::api::preprocess::Preprocessor;
use crate::error::{GirError, Result};
use crate::gir::{Node, Repositories};

/// Builder for [`RemoveRecordFields`]
pub struct Builder {
    gir_type: String,
    fields: HashSet<String>,
}

impl Builder {
    #[roxygen]
    pub fn new<S: Into<String>>(
        /// Full GIR type of the record
        gir_type: S,
    ) -> Self {
        Self {
            gir_type: gir_type.into(),
            fields: HashSet::new(),
        }
    }

    /// Add a field to remove, cased as it appears in the repository.
    #[roxygen]
    pub fn field<S: Into<String>>(
        mut self,
        /// Field name
        field: S,
    ) -> Self {
        self.fields.insert(field.into());
        self
    }

    pub fn build(self) -> RemoveRecordFields {
        RemoveRecordFields { builder: self }
    }
}

/// Remove named fields from a record.
pub struct RemoveRecordFields {
    builder: Builder,
}

impl RemoveRecordFields {
    pub fn builder<S: Into<String>>(gir_type: S) -> Builder {
        Builder::new(gir_type)
    }
}

impl Preprocessor for RemoveRecordFields {
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        let gir_type = &self.builder.gir_type;
        let Some(found) = repos.find_full_type_mut(gir_type) else {
            warn!(gir_type = %gir_type, "GIR type not found");
            return Ok(());
        };
        let kind = found.node.kind();
        let Node::Record(record) = found.node else {
            return Err(GirError::WrongKind {
                gir_type: gir_type.clone(),
                expected: "record",
                found: kind,
            });
        };
        record
            .fields
            .retain(|field| !self.builder.fields.contains(&field.name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gir::{Enum, Field, Namespace, Record, Repository};

    fn repos() -> Repositories {
        [Repository {
            namespace: Namespace::new("Foo", "1.0"),
            nodes: vec![
                Node::Record(Record {
                    name: "Point".to_string(),
                    fields: ["x", "priv", "y", "padding"]
                        .into_iter()
                        .map(|name| Field {
                            name: name.to_string(),
                            ..Default::default()
                        })
                        .collect(),
                    ..Default::default()
                }),
                Node::Enum(Enum {
                    name: "Mode".to_string(),
                    ..Default::default()
                }),
            ],
            ..Default::default()
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_remove_fields_keeps_order() {
        let mut repos = repos();
        RemoveRecordFields::builder("Foo-1.0.Point")
            .field("priv")
            .field("padding")
            .build()
            .preprocess(&mut repos)
            .unwrap();
        let found = repos.find_full_type("Foo-1.0.Point").unwrap();
        let names: Vec<_> = found.node.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn test_non_record_is_hard_error() {
        let mut repos = repos();
        let err = RemoveRecordFields::builder("Foo-1.0.Mode")
            .field("x")
            .build()
            .preprocess(&mut repos)
            .unwrap_err();
        assert!(matches!(err, GirError::WrongKind { expected: "record", .. }));
    }

    #[test]
    fn test_missing_record_is_soft() {
        let mut repos = repos();
        assert!(RemoveRecordFields::builder("Foo-1.0.Nope")
            .field("x")
            .build()
            .preprocess(&mut repos)
            .is_ok());
    }
}
