//! Ordered in-place mutations of the loaded repositories.
//!
//! Preprocessors run strictly one after another; each one sees everything the
//! previous ones did. Configuration problems detectable up front are reported
//! by the constructors, the rest while the preprocessor runs.

pub(crate) mod callable;
pub(crate) mod enum_members;
pub(crate) mod getter;
pub(crate) mod package;
pub(crate) mod record_fields;
pub(crate) mod rename_type;
pub(crate) mod signal;

use tracing::debug;

use crate::error::{Errors, Result};
use crate::gir::Repositories;

/// A mutation of the shared model.
pub trait Preprocessor {
    /// Go over the repositories, changing what's necessary. A returned error
    /// is a hard failure of the run; missing targets are logged instead.
    fn preprocess(&self, repos: &mut Repositories) -> Result<()>;
}

impl<F> Preprocessor for F
where
    F: Fn(&mut Repositories) -> Result<()>,
{
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        self(repos)
    }
}

/// Apply the preprocessors in order.
///
/// Every preprocessor runs even after a failure so that all hard errors of
/// the configuration are reported at once; the model must be discarded when
/// this returns an error.
pub fn apply_preprocessors(
    repos: &mut Repositories,
    preprocessors: &[Box<dyn Preprocessor>],
) -> std::result::Result<(), Errors> {
    let mut errors = Errors::new();
    for (index, preprocessor) in preprocessors.iter().enumerate() {
        debug!(index, "applying preprocessor");
        if let Err(err) = preprocessor.preprocess(repos) {
            errors.push(err);
        }
    }
    errors.into_result(())
}
