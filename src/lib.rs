//! refrax: a `$ref` resolver for JSON/YAML document graphs
//!
//! This crate provides the reference-resolution engine behind refrax,
//! turning a graph of structured documents connected by `$ref`-style
//! indirection pointers into a navigable, typed view.
//!
//! # Overview
//!
//! refrax is designed for code generators and other tools that consume
//! multi-file JSON/YAML document sets, providing:
//!
//! - **Reference coordinates**: a stable identity for every location in
//!   the graph, distinct from the value living there
//! - **Transparent dereferencing**: cross-file and relative `$ref` chains
//!   are followed to their terminal value, with cycle detection
//! - **Typed navigation**: checked map/list/string/boolean projections
//!   that never re-expose raw indirection nodes
//! - **Read-through caching**: each document is loaded at most once per
//!   registry
//! - **Diagnostics**: broken-reference sweeps over single documents or
//!   whole directory trees
//!
//! # Architecture
//!
//! The crate is organized around several key modules:
//!
//! - [`registry`]: the core — [`registry::Reference`] coordinates,
//!   [`registry::Fragment`] values and the [`registry::FragmentRegistry`]
//!   resolution engine
//! - [`loader`]: the document-loading boundary (filesystem and in-memory)
//! - [`diagnostics`]: broken-reference detection
//! - [`config`]: configuration management and settings
//!
//! # Usage
//!
//! ```ignore
//! use refrax::loader::FsLoader;
//! use refrax::registry::{FragmentRegistry, Reference};
//!
//! let registry = FragmentRegistry::new(FsLoader::new(base_dir));
//! let root = registry.get(&Reference::root("api.yaml"))?;
//! let name = root.get(["info", "title"])?.as_str()?;
//! ```

// Core module - coordinates, fragments and the resolution engine
pub mod registry;

// Document loading boundary
pub mod loader;

// Diagnostics over documents and trees
pub mod diagnostics;

// Configuration and errors
pub mod config;
pub mod errors;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
