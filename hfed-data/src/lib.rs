//! Session-level pieces of the HFED dashboard: the result cache, the models
//! handed to renderers, and the load state machine that ties them to a
//! transport.

pub mod cache;
pub mod render;
pub mod session;
