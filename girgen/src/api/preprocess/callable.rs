//! Modify functions, callbacks and the callable members of types.

use std::collections::BTreeMap;

use roxygen::roxygen;
use tracing::warn;

use crate::api::locate::locate_callable_mut;
use crate::api::preprocess::Preprocessor;
use crate::error::{GirError, Result};
use crate::gir::namespace::must_be_versioned;
use crate::gir::{CallableAttrs, Direction, Repositories};

type ModifyFn = Box<dyn Fn(&CallableContext, &mut CallableAttrs) -> Result<()>>;

/// Passed to modification closures so that their errors can name the
/// configured GIR type.
pub struct CallableContext {
    pub gir_type: String,
}

/// Apply an arbitrary change to one callable.
///
/// The GIR type is either a function or callback (`Foo-1.0.func`), or a
/// member of a class, record or interface (`Foo-1.0.Widget.set_value`). A
/// missing owner type is logged and skipped; a missing member is an error.
pub struct ModifyCallable {
    context: CallableContext,
    modify: ModifyFn,
}

impl ModifyCallable {
    #[roxygen]
    pub fn new<S, F>(
        /// Versioned GIR path of the callable
        gir_type: S,
        /// Change to apply
        modify: F,
    ) -> Result<Self>
    where
        S: Into<String>,
        F: Fn(&CallableContext, &mut CallableAttrs) -> Result<()> + 'static,
    {
        let gir_type = gir_type.into();
        must_be_versioned(&gir_type)?;
        Ok(Self {
            context: CallableContext { gir_type },
            modify: Box::new(modify),
        })
    }
}

impl Preprocessor for ModifyCallable {
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        match locate_callable_mut(repos, &self.context.gir_type)? {
            Some(callable) => (self.modify)(&self.context, callable),
            None => {
                warn!(gir_type = %self.context.gir_type, "GIR type not found");
                Ok(())
            }
        }
    }
}

/// Force a callable to be introspectable.
pub struct MustIntrospect;

impl MustIntrospect {
    pub fn new<S: Into<String>>(gir_type: S) -> Result<ModifyCallable> {
        ModifyCallable::new(gir_type, |_, callable| {
            callable.introspectable = Some(true);
            Ok(())
        })
    }
}

/// Rename a callable.
pub struct RenameCallable;

impl RenameCallable {
    #[roxygen]
    pub fn new<S1: Into<String>, S2: Into<String>>(
        /// Versioned GIR path of the callable
        gir_type: S1,
        /// New name
        new_name: S2,
    ) -> Result<ModifyCallable> {
        let new_name = new_name.into();
        ModifyCallable::new(gir_type, move |_, callable| {
            callable.name = new_name.clone();
            Ok(())
        })
    }
}

/// Builder for overriding parameter directions of a callable
pub struct Builder {
    gir_type: String,
    directions: BTreeMap<String, Direction>,
}

impl Builder {
    pub fn new<S: Into<String>>(gir_type: S) -> Self {
        Self {
            gir_type: gir_type.into(),
            directions: BTreeMap::new(),
        }
    }

    /// Override the direction of one parameter.
    ///
    /// # Example
    ///
    /// ```
    /// use girgen::{Direction, preprocess::ModifyParamDirections};
    ///
    /// let modify = ModifyParamDirections::builder("Foo-1.0.Widget.get_size")
    ///     .direction("width", Direction::Out)
    ///     .direction("height", Direction::Out)
    ///     .build()
    ///     .unwrap();
    /// ```
    #[roxygen]
    pub fn direction<S: Into<String>>(
        mut self,
        /// Parameter name
        parameter: S,
        /// New direction
        direction: Direction,
    ) -> Self {
        self.directions.insert(parameter.into(), direction);
        self
    }

    /// Build the preprocessor. Fails if the GIR type is unversioned.
    pub fn build(self) -> Result<ModifyCallable> {
        let directions = self.directions;
        ModifyCallable::new(self.gir_type, move |context, callable| {
            for (name, direction) in &directions {
                let parameter =
                    callable
                        .find_parameter_mut(name)
                        .ok_or_else(|| GirError::ParameterNotFound {
                            gir_type: context.gir_type.clone(),
                            parameter: name.clone(),
                        })?;
                parameter.direction = *direction;
            }
            Ok(())
        })
    }
}

/// Override parameter directions of a callable; naming a parameter the
/// callable does not have is an error.
pub struct ModifyParamDirections;

impl ModifyParamDirections {
    pub fn builder<S: Into<String>>(gir_type: S) -> Builder {
        Builder::new(gir_type)
    }
}
