//! Data-access collaborator trait definitions.

use hanover_primitives::{DateRange, Symbol};
use polars::prelude::*;

/// Errors surfaced by the data-access collaborator.
///
/// All of these are fatal for the current request; retry policy belongs to
/// the collaborator, never to the core.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Remote endpoint unreachable.
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// Credentials rejected.
    #[error("authentication failure: {0}")]
    Authentication(String),

    /// Unknown table identifier.
    #[error("unknown table: {0}")]
    MissingTable(String),

    /// Polars error while materializing rows.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),
}

/// A read-only query against one table of the security master.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Table identifier.
    pub table: String,
    /// Fields to return; empty means all fields.
    pub fields: Vec<String>,
    /// Date range restriction.
    pub range: DateRange,
    /// Optional security filter; `None` means the full universe.
    pub symbols: Option<Vec<Symbol>>,
}

impl QueryRequest {
    /// Create a request for all securities over a range.
    #[must_use]
    pub fn new(table: impl Into<String>, fields: Vec<String>, range: DateRange) -> Self {
        Self { table: table.into(), fields, range, symbols: None }
    }

    /// Restrict the request to specific securities.
    #[must_use]
    pub fn with_symbols(mut self, symbols: Vec<Symbol>) -> Self {
        self.symbols = Some(symbols);
        self
    }
}

/// Read-only access to raw security-level panel data.
///
/// The only potentially slow or blocking step in the pipeline; everything
/// downstream is synchronous in-memory computation.
pub trait DataSource: Send + Sync {
    /// Execute a query and return the matching rows as typed columns.
    ///
    /// # Errors
    /// Returns `SourceError` on connectivity, authentication, or schema
    /// failures. The core treats all of these as fatal for the request.
    fn query(&self, request: &QueryRequest) -> Result<DataFrame, SourceError>;
}
