//! The in-memory semantic model built from introspection repositories.

pub(crate) mod model;
pub(crate) mod namespace;
pub(crate) mod repositories;

pub use model::*;
pub use repositories::{Repositories, TypeMut, TypeRef};
