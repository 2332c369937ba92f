pub(crate) mod config;
pub(crate) mod filter;
pub(crate) mod link_mode;
pub(crate) mod locate;
pub(crate) mod preprocess;
pub(crate) mod trampoline;
