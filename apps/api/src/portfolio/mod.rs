//! Session-scoped portfolio runs: the pipeline, the in-memory session store and
//! the HTTP handlers that drive them.

pub mod handlers;
pub mod pipeline;
pub mod session;
