//! HTTP request handlers.

pub(crate) mod serve;
