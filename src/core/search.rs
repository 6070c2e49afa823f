//! Search log - Append-only record of internal search submissions.

use crate::{
    core::forms::validate_query,
    entities::{SearchTerm, search_term},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::net::IpAddr;
use tracing::debug;

/// Longest tracking token stored with a search.
pub const MAX_TRACKING_ID_LENGTH: usize = 50;

/// A search submission to log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSearch {
    /// Query text
    pub q: String,
    /// Requester address
    pub ip_address: IpAddr,
    /// Signed-in account, if any
    pub user_id: Option<i64>,
    /// Analytics tracking token, may be empty
    pub tracking_id: String,
}

/// Filters for [`list_search_terms`]. `None` fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchTermFilter {
    /// Only searches from this address
    pub ip_address: Option<IpAddr>,
    /// Only searches by this account
    pub user_id: Option<i64>,
    /// Only searches with exactly this text
    pub q: Option<String>,
}

/// Appends a search to the log. Repeated identical searches are all kept.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank or overlong query or tracking id.
pub async fn record_search<C>(db: &C, search: NewSearch) -> Result<search_term::Model>
where
    C: ConnectionTrait,
{
    let q = search.q.trim();
    validate_query(q)?;

    let tracking_length = search.tracking_id.chars().count();
    if tracking_length > MAX_TRACKING_ID_LENGTH {
        return Err(Error::validation(
            "tracking_id",
            format!("must be at most {MAX_TRACKING_ID_LENGTH} characters, got {tracking_length}"),
        ));
    }

    let term = search_term::ActiveModel {
        q: Set(q.to_string()),
        search_date: Set(Utc::now()),
        ip_address: Set(search.ip_address.to_string()),
        user_id: Set(search.user_id),
        tracking_id: Set(search.tracking_id),
        ..Default::default()
    };

    let term = term.insert(db).await?;
    debug!("Logged search {:?} from {}", term.q, term.ip_address);
    Ok(term)
}

/// Logged searches matching `filter`, newest first.
pub async fn list_search_terms<C>(db: &C, filter: SearchTermFilter) -> Result<Vec<search_term::Model>>
where
    C: ConnectionTrait,
{
    let mut query = SearchTerm::find();

    if let Some(ip_address) = filter.ip_address {
        query = query.filter(search_term::Column::IpAddress.eq(ip_address.to_string()));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(search_term::Column::UserId.eq(user_id));
    }
    if let Some(q) = filter.q {
        query = query.filter(search_term::Column::Q.eq(q));
    }

    query
        .order_by_desc(search_term::Column::SearchDate)
        .order_by_desc(search_term::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::net::Ipv4Addr;

    fn search(q: &str) -> NewSearch {
        NewSearch {
            q: q.to_string(),
            ip_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            user_id: None,
            tracking_id: String::new(),
        }
    }

    #[tokio::test]
    async fn test_record_search() -> Result<()> {
        let db = setup_test_db().await?;

        let term = record_search(&db, search("  ruby rings ")).await?;
        assert_eq!(term.q, "ruby rings");
        assert_eq!(term.ip_address, "127.0.0.1");
        assert_eq!(term.tracking_id, "");
        assert_eq!(term.to_string(), "ruby rings");

        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_searches_are_all_logged() -> Result<()> {
        let db = setup_test_db().await?;

        record_search(&db, search("rings")).await?;
        record_search(&db, search("rings")).await?;

        let terms = list_search_terms(&db, SearchTermFilter::default()).await?;
        assert_eq!(terms.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_search_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = record_search(&db, search("   ")).await;
        assert!(matches!(result, Err(Error::Validation { field: "q", .. })));

        let result = record_search(&db, search(&"q".repeat(51))).await;
        assert!(matches!(result, Err(Error::Validation { field: "q", .. })));

        let mut tracked = search("rings");
        tracked.tracking_id = "t".repeat(51);
        let result = record_search(&db, tracked).await;
        assert!(matches!(result, Err(Error::Validation { field: "tracking_id", .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_search_terms_filters() -> Result<()> {
        let db = setup_test_db().await?;

        let first = record_search(&db, search("rings")).await?;
        let mut other_ip = search("chains");
        other_ip.ip_address = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        other_ip.user_id = Some(3);
        record_search(&db, other_ip).await?;
        let last = record_search(&db, search("rings")).await?;

        let all = list_search_terms(&db, SearchTermFilter::default()).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, last.id);

        let local = list_search_terms(
            &db,
            SearchTermFilter {
                ip_address: Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
                ..Default::default()
            },
        )
        .await?;
        let ids: Vec<i64> = local.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![last.id, first.id]);

        let by_user = list_search_terms(
            &db,
            SearchTermFilter {
                user_id: Some(3),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user[0].q, "chains");

        let by_text = list_search_terms(
            &db,
            SearchTermFilter {
                q: Some("rings".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_text.len(), 2);

        Ok(())
    }
}
