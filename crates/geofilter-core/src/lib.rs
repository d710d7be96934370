//! Geofilter Core - Domain models, collaborator ports, and configuration
//!
//! This crate contains the shared types every geofilter crate speaks: spatial
//! references, coordinate trees, GeoJSON-style geometries, the error taxonomy,
//! and the traits through which catalog lookup, WKT checking and projection
//! are plugged in.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{GeofilterError, PreconditionFailure, Result};
