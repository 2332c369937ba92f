//! Resolve dotted member paths to the callable or signal they name.
//!
//! Members are not independently addressable nodes, so a path such as
//! `Foo-1.0.Widget.set_value` is split into its owner type and member name,
//! the owner is resolved through the type index, and the member is searched
//! in the owner's member lists.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::error::{GirError, Result};
use crate::gir::namespace::split_gir_type;
use crate::gir::{CallableAttrs, NodeKind, Repositories, Signal};

/// Find the callable named by `gir_type`.
///
/// `Foo-1.0.func` names a function or callback directly;
/// `Foo-1.0.Type.member` names a constructor, method or virtual method of a
/// class, record or interface. Returns `Ok(None)` only when the owner type is
/// not loaded; a missing member is an error.
pub fn locate_callable_mut<'a>(
    repos: &'a mut Repositories,
    gir_type: &str,
) -> Result<Option<&'a mut CallableAttrs>> {
    let (namespace, rest) = split_gir_type(gir_type);
    let (owner, member) = match rest.split_once('.') {
        Some((owner, member)) => (owner, Some(member)),
        None => (rest, None),
    };

    let Some(found) = repos.find_full_type_mut(&format!("{namespace}.{owner}")) else {
        return Ok(None);
    };
    let node = found.node;
    let kind = node.kind();

    if matches!(kind, NodeKind::Function | NodeKind::Callback) {
        return Ok(node.callable_mut());
    }

    let not_found = || GirError::CallableNotFound {
        gir_type: gir_type.to_string(),
    };
    let member = member.ok_or_else(not_found)?;
    let lists = node.member_lists_mut().ok_or_else(|| GirError::WrongKind {
        gir_type: gir_type.to_string(),
        expected: "class, record or interface",
        found: kind,
    })?;

    for list in lists {
        if let Some(callable) = list.iter_mut().find(|c| c.name == member) {
            return Ok(Some(callable));
        }
    }
    Err(not_found())
}

fn signal_selector_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*)\.(.*)::(.*)$").expect("signal selector pattern is valid"))
}

/// A parsed `Namespace.Type::signal-name` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSelector {
    /// `Namespace.Type`
    pub owner: String,
    pub signal: String,
}

impl SignalSelector {
    pub fn parse(selector: &str) -> Result<Self> {
        let invalid = || GirError::InvalidSignalSelector {
            selector: selector.to_string(),
        };
        let captures = signal_selector_re().captures(selector).ok_or_else(invalid)?;
        let (namespace, typ, signal) = (&captures[1], &captures[2], &captures[3]);
        if namespace.is_empty() || typ.is_empty() || signal.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            owner: format!("{namespace}.{typ}"),
            signal: signal.to_string(),
        })
    }
}

/// Find the signal named by the selector on a class or interface.
///
/// Both a missing owner and a missing signal are logged and reported as
/// `None`.
pub fn locate_signal_mut<'a>(
    repos: &'a mut Repositories,
    selector: &SignalSelector,
) -> Option<&'a mut Signal> {
    let Some(found) = repos.find_full_type_mut(&selector.owner) else {
        warn!(owner = %selector.owner, "GIR type not found");
        return None;
    };
    let signal = found
        .node
        .signals_mut()
        .and_then(|signals| signals.iter_mut().find(|s| s.name == selector.signal));
    if signal.is_none() {
        warn!(owner = %selector.owner, signal = %selector.signal, "GIR signal not found");
    }
    signal
}
