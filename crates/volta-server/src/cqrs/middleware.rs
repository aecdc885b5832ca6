//! Marker traits separating write commands from read queries
//!
//! Every command and query struct implements one of these alongside its
//! `mediator::Request` impl, so the write/read split stays visible at the
//! type level.

/// Marker for write operations (executed via POST, PUT, DELETE)
pub trait Command {}

/// Marker for read operations (executed via GET)
pub trait Query {}
