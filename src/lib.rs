//! Coverage data model and merge engine.
//!
//! Parsers for vendor coverage formats populate [`file::CodeFile`]s, attach
//! them to [`class::Class`]es, which in turn live inside
//! [`assembly::Assembly`]s. Multiple parsed reports covering the same codebase
//! are combined with the recursive `merge` operations (assembly → class →
//! file), and every derived quota is computed on read so the model stays
//! consistent after any mutation.

pub mod assembly;
pub mod class;
pub mod error;
pub mod file;
pub mod filereader;
pub mod history;
pub mod metric;
pub mod model;
pub mod summary;
