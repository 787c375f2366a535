//! The data layer behind the tool surface.
//!
//! SQL generation and drivers live outside datagate. A gateway plugs them in
//! by implementing [`EntityBackend`]; the tool surface only calls it after an
//! operation has passed the exposure and permission checks.

use crate::aggregation::Record;
use crate::arguments::Arguments;
use async_trait::async_trait;
use datagate_core::EntitySource;

/// Row retrieval options for `read_records` and `aggregate_records`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadQuery {
    /// Fields to return; empty means all.
    pub select: Vec<String>,
    /// Field equality filter.
    pub filter: Arguments,
    /// Sort keys such as `title asc`.
    pub order_by: Vec<String>,
    pub first: Option<usize>,
}

/// The data layer behind the tool surface.
///
/// Calls arrive only after policy and permission checks have passed, so an
/// implementation only has to talk to the database object named by `source`.
#[async_trait]
pub trait EntityBackend: Send + Sync {
    /// Read rows from a table or view.
    async fn read_records(
        &self,
        source: &EntitySource,
        query: &ReadQuery,
    ) -> anyhow::Result<Vec<Record>>;

    /// Insert a row and return it as stored.
    async fn create_record(&self, source: &EntitySource, data: &Arguments)
    -> anyhow::Result<Record>;

    /// Update the row matching `keys`. Returns `None` when no row matched.
    async fn update_record(
        &self,
        source: &EntitySource,
        keys: &Arguments,
        fields: &Arguments,
    ) -> anyhow::Result<Option<Record>>;

    /// Delete the row matching `keys`. Returns whether a row was removed.
    async fn delete_record(&self, source: &EntitySource, keys: &Arguments) -> anyhow::Result<bool>;

    /// Run a stored procedure with bound parameters.
    async fn execute_entity(
        &self,
        source: &EntitySource,
        parameters: &Arguments,
    ) -> anyhow::Result<Vec<Record>>;
}
