//! Content produced by each agent kind.
//!
//! Responses are templated; none of the variants call a language model.

pub(crate) mod data_query;
pub(crate) mod general;
pub(crate) mod integration;
pub(crate) mod planner;
