//! # cubesql
//!
//! A semantic-layer SQL compiler: cubes, joins and queries in, fan-out-safe
//! SQL out.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │         CubeCatalog (cubes, fields, joins)  +  Query     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Field Resolver -- validate fields, find needed cubes │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!            ┌─────────────┴─────────────┐
//!            ▼ one cube                  ▼ many cubes
//! ┌───────────────────────┐   ┌───────────────────────────────┐
//! │  Single-Cube Compiler  │   │  Multi-Cube Compiler (fan-out- │
//! │  flat SELECT [+window] │   │  safe dimension/metric CTEs)   │
//! └───────────────────────┘   └───────────────────────────────┘
//!                          │
//!                          ▼ [emit]
//! ┌─────────────────────────────────────────────────────────┐
//! │                      SQL string                          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Both compilers lean on [`cube_view::CubeView`], which leans on
//! [`variant::expand_variants`], which leans on [`template::substitute`].

pub mod alias;
pub mod compiler;
pub mod config;
pub mod cube_view;
pub mod error;
pub mod model;
pub mod resolver;
pub mod template;
pub mod variant;

pub use alias::{AliasSource, RandomAliasSource, SequentialAliasSource};
pub use compiler::compile_query;
pub use error::{CompileError, CompileResult};
pub use model::{Cube, CubeCatalog, FieldDecl, FieldKind, Join, JoinType, Query};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::alias::{AliasSource, RandomAliasSource, SequentialAliasSource};
    pub use crate::compiler::compile_query;
    pub use crate::error::{CompileError, CompileResult};
    pub use crate::model::{Cube, CubeCatalog, FieldDecl, FieldKind, Join, JoinType, Query};
}
