pub(crate) mod atoms;
pub(crate) mod call_wrapper;
pub(crate) mod client_message;
pub(crate) mod keymap;
pub(crate) mod monitors;
pub(crate) mod properties;
