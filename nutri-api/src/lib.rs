//! HTTP transport for the nutri job service.

pub mod config;
pub mod routes;
pub mod startup;
