use roxygen::roxygen;
use tracing::{info, warn};

use crate::api::preprocess::Preprocessor;
use crate::error::Result;
use crate::gir::namespace::must_be_versioned;
use crate::gir::Repositories;

/// Rename a type. The GIR type is matched absolutely and must carry its
/// namespace version (`Foo-1.0.Widget`); the new name is a bare name.
pub struct TypeRenamer {
    from: String,
    to: String,
}

impl TypeRenamer {
    #[roxygen]
    pub fn new<S1: Into<String>, S2: Into<String>>(
        /// Versioned GIR type to rename
        gir_type: S1,
        /// New bare name
        new_name: S2,
    ) -> Result<Self> {
        let from = gir_type.into();
        must_be_versioned(&from)?;
        Ok(Self {
            from,
            to: new_name.into(),
        })
    }
}

impl Preprocessor for TypeRenamer {
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        let Some(found) = repos.find_full_type_mut(&self.from) else {
            warn!(gir_type = %self.from, "GIR type not found");
            return Ok(());
        };

        let old_name = found.node.name().to_string();
        found.node.set_name(self.to.as_str());
        info!(from = %self.from, to = %self.to, "renamed type");

        if let Some(doc) = found.node.info_mut().doc.as_mut() {
            doc.string
                .push_str(&format!("\n\nThis type has been renamed from {old_name}."));
        }
        Ok(())
    }
}
