use std::collections::BTreeMap;

use crate::api::locate::{locate_signal_mut, SignalSelector};
use crate::api::preprocess::Preprocessor;
use crate::error::{GirError, Result};
use crate::gir::{Direction, Repositories, Signal};

type ModifyFn = Box<dyn Fn(&SignalSelector, &mut Signal) -> Result<()>>;

/// Like [`ModifyCallable`](crate::preprocess::ModifyCallable), for signals of
/// classes and interfaces. The selector must look like
/// `Namespace.Type::signal-name`; anything else is rejected up front.
pub struct ModifySignal {
    selector: SignalSelector,
    modify: ModifyFn,
}

impl ModifySignal {
    pub fn new<F>(selector: &str, modify: F) -> Result<Self>
    where
        F: Fn(&SignalSelector, &mut Signal) -> Result<()> + 'static,
    {
        Ok(Self {
            selector: SignalSelector::parse(selector)?,
            modify: Box::new(modify),
        })
    }

    /// Override the directions of named signal parameters.
    pub fn param_directions(
        selector: &str,
        directions: BTreeMap<String, Direction>,
    ) -> Result<Self> {
        Self::new(selector, move |selector, signal| {
            for (name, direction) in &directions {
                let parameter =
                    signal
                        .find_parameter_mut(name)
                        .ok_or_else(|| GirError::ParameterNotFound {
                            gir_type: format!("{}::{}", selector.owner, selector.signal),
                            parameter: name.clone(),
                        })?;
                parameter.direction = *direction;
            }
            Ok(())
        })
    }
}

impl Preprocessor for ModifySignal {
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        match locate_signal_mut(repos, &self.selector) {
            Some(signal) => (self.modify)(&self.selector, signal),
            None => Ok(()),
        }
    }
}
