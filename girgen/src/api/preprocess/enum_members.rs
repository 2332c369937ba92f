use regex::Regex;
use roxygen::roxygen;
use tracing::warn;

use crate::api::preprocess::Preprocessor;
use crate::error::{GirError, Result};
use crate::gir::namespace::must_be_versioned;
use crate::gir::{Node, Repositories};

/// Rewrite the C identifiers of all members of an enum, mostly to avoid
/// collisions. The regex is applied to everything after the first
/// underscore-delimited segment; that leading type prefix is kept as is.
pub struct RenameEnumMembers {
    gir_type: String,
    regex: Regex,
    replace: String,
}

impl RenameEnumMembers {
    #[roxygen]
    pub fn new<S1: Into<String>, S2: AsRef<str>, S3: Into<String>>(
        /// Versioned enum type, e.g. `Foo-1.0.Bar`
        gir_type: S1,
        /// Pattern matched against each identifier after its prefix
        regex: S2,
        /// Replacement, may refer to capture groups as `$1` or `${name}`
        replace: S3,
    ) -> Result<Self> {
        let gir_type = gir_type.into();
        must_be_versioned(&gir_type)?;
        let regex = Regex::new(regex.as_ref()).map_err(|source| GirError::InvalidRegex {
            pattern: regex.as_ref().to_string(),
            source,
        })?;
        Ok(Self {
            gir_type,
            regex,
            replace: replace.into(),
        })
    }
}

impl Preprocessor for RenameEnumMembers {
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        let Some(found) = repos.find_full_type_mut(&self.gir_type) else {
            warn!(gir_type = %self.gir_type, "GIR enum not found");
            return Ok(());
        };
        let kind = found.node.kind();
        let Node::Enum(enumeration) = found.node else {
            return Err(GirError::WrongKind {
                gir_type: self.gir_type.clone(),
                expected: "enum",
                found: kind,
            });
        };

        for member in &mut enumeration.members {
            let Some((prefix, rest)) = member.c_identifier.split_once('_') else {
                continue;
            };
            let rest = self.regex.replace_all(rest, self.replace.as_str());
            member.c_identifier = format!("{prefix}_{rest}");
        }
        Ok(())
    }
}
