pub(crate) mod id;
pub(crate) mod intro;
pub(crate) mod ping;
