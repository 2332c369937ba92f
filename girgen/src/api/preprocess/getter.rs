use tracing::warn;

use crate::api::preprocess::Preprocessor;
use crate::error::Result;
use crate::gir::namespace::must_be_versioned;
use crate::gir::Repositories;
use crate::utils::strcases::{GetterStyle, SnakeGuess};

/// Prefix a getter marker onto a type name so that code generation does not
/// mistake the type for a property accessor and strip its verb.
pub struct PreserveGetName<S = SnakeGuess> {
    gir_type: String,
    style: S,
}

impl PreserveGetName {
    /// `gir_type` must carry a namespace version, like `Foo-1.0.Value`.
    pub fn new<T: Into<String>>(gir_type: T) -> Result<Self> {
        Self::with_style(gir_type, SnakeGuess)
    }
}

impl<S: GetterStyle> PreserveGetName<S> {
    /// Use a custom casing heuristic for the prefix.
    pub fn with_style<T: Into<String>>(gir_type: T, style: S) -> Result<Self> {
        let gir_type = gir_type.into();
        must_be_versioned(&gir_type)?;
        Ok(Self { gir_type, style })
    }
}

impl<S: GetterStyle> Preprocessor for PreserveGetName<S> {
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        let Some(found) = repos.find_full_type_mut(&self.gir_type) else {
            warn!(gir_type = %self.gir_type, "GIR type not found");
            return Ok(());
        };
        let renamed = self.style.getter_name(found.node.name());
        found.node.set_name(renamed);
        Ok(())
    }
}
