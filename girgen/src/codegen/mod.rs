pub(crate) mod trampoline;
