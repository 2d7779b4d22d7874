pub(crate) mod kind;
pub(crate) mod model;
pub(crate) mod store;
pub(crate) mod timer;
