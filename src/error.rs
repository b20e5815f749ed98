//! Errors returned by the compiler.
//!
//! A closed set of kinds (spec §7): every failure path in the crate
//! produces one of these, carrying the offending identifier verbatim.

use thiserror::Error;

/// Result type returned by compilation and catalog-loading operations.
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Query, filter or sort referenced a field not present in the catalog.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A needed cube on the multi-cube path has no `primary_key` dimension.
    #[error("cube '{0}' has no primary key dimension")]
    NoPrimaryKey(String),

    /// A needed cube on the multi-cube path is not touched by any join.
    #[error("cube '{0}' has no join defined")]
    DisconnectedCube(String),

    /// Template substitution did not converge within the recursion cap.
    #[error("recursive substitution did not converge, check variables in: {0}")]
    RecursionLimit(String),

    /// A window metric was referenced on the multi-cube path.
    #[error("window metric '{0}' is not supported in a multi-cube join")]
    UnsupportedWindowInJoin(String),

    /// A needed cube on the multi-cube path declares more than one
    /// primary-key dimension; only a single `pk0` column is supported.
    #[error("cube '{0}' declares more than one primary key dimension, only a single primary key column is supported")]
    MultiColumnPKUnsupported(String),

    /// The catalog itself is malformed.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// No cube was needed to answer the query; this can only happen if the
    /// resolver is given a query with zero fields, filters, and sorts.
    #[error("no cubes needed to generate the query")]
    EmptyQuery,
}
