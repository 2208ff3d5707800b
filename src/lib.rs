//! Tollgate - Subscription billing orchestration.
//!
//! This crate reconciles subscription state between a host CMS and the
//! Stripe payment provider, driven by signed webhook deliveries.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
