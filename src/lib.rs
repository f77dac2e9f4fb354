// ABOUTME: Library crate for the storefront checkout wizard exposing public API for testing and external use

#![allow(missing_docs)]

pub mod api;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod session;
