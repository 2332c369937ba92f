pub(crate) mod edition;
pub(crate) mod json;
pub(crate) mod strcases;
