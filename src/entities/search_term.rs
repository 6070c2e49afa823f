//! Search term entity - Append-only log of internal search submissions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Search term database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "search_terms")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Submitted query text
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub q: String,
    /// When the search was submitted
    pub search_date: DateTimeUtc,
    /// Requester address
    pub ip_address: String,
    /// Signed-in account, if any
    pub user_id: Option<i64>,
    /// Analytics tracking token, empty when absent
    #[sea_orm(column_type = "String(StringLen::N(50))", default_value = "")]
    pub tracking_id: String,
}

/// `SearchTerm` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.q)
    }
}
