/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FastFeed Dictionary
//!
//! FAST template catalog management for the FastFeed market-data handler.
//!
//! This crate provides:
//! - **Schema definitions**: Wire types, field operators, field descriptors and templates
//! - **Catalog loading**: JSON catalogs validated on load
//!
//! The catalog is configuration: the decoder never hard-codes an exchange's
//! field layout.

pub mod error;
pub mod schema;

pub use error::DictionaryError;
pub use schema::{FieldDescriptor, Operator, Template, TemplateCatalog, WireType};
