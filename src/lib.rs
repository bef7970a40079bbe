//! # API Management Controller
//!
//! Reconciles declarative API Management service documents against the
//! Azure Resource Manager control plane.
//!
//! A document describes one service: its publisher details, tier, managed
//! identity, network placement, gateway certificates, custom hostnames,
//! security toggles, policy and developer portal settings. [`Reconciler::apply`]
//! drives the live service to that description, [`Reconciler::read`] rebuilds
//! a document from the live service so unchanged reads reproduce what was
//! applied, and [`Reconciler::delete`] tears the service down, optionally
//! purging the soft-deleted remnant.
//!
//! ## Layout
//!
//! - [`document`]: the document types and tier-independent validation
//! - [`reconciler`]: paired expand/flatten codecs and the apply/read/delete flows
//! - [`api`]: the control plane trait, its wire model and the REST client
//! - [`tier`]: the `{Tier}_{Capacity}` sku encoding and per-tier capabilities
//! - [`id`]: typed resource path identifiers
//! - [`config`]: environment-driven settings

pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod id;
pub mod reconciler;
pub mod tier;

pub use config::Environment;
pub use document::ServiceDocument;
pub use error::{Error, ValidationError};
pub use reconciler::{requires_replacement, Reconciler};
