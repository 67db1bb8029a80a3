//! Change reporting for the sync-collection REPORT.
//!
//! Collapses the change log into added/modified/deleted uri sets relative
//! to a client-held sync token, so clients diff a collection in O(changes)
//! instead of enumerating every card.

use std::collections::BTreeMap;

use hagaki_core::constants::{format_sync_token, parse_sync_token};
use hagaki_db::db::connection::DbConnection;
use hagaki_db::db::enums::ChangeOperation;
use hagaki_db::db::query::change;
use hagaki_db::model::change::CardChange;

use crate::addressbook::get_owned;
use crate::auth::Principal;
use crate::error::{ServiceError, ServiceResult};

/// The collapsed change set of an addressbook since a sync token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressbookChanges {
    /// The token the client should present next time.
    pub sync_token: String,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

/// ## Summary
/// Computes the changes of an addressbook since the given sync token.
///
/// An empty token means initial sync and yields every live card as added.
///
/// ## Errors
/// `Malformed` for a token this server did not mint, `NotFound`/`Forbidden`
/// from the addressbook lookup.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn changes_since(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_id: i64,
    token: &str,
) -> ServiceResult<AddressbookChanges> {
    let book = get_owned(conn, principal, addressbook_id).await?;

    let since = parse_sync_token(token)
        .ok_or_else(|| ServiceError::Malformed(format!("invalid sync token: {token}")))?;

    let entries = change::since(conn, book.id, since).await?;
    let collapsed = collapse(&entries);

    Ok(AddressbookChanges {
        sync_token: format_sync_token(book.ctag),
        added: collapsed.added,
        modified: collapsed.modified,
        deleted: collapsed.deleted,
    })
}

#[derive(Debug, Default)]
struct Collapsed {
    added: Vec<String>,
    modified: Vec<String>,
    deleted: Vec<String>,
}

/// Collapses an ordered change-log slice into one outcome per uri.
///
/// A uri first seen as added and still live reports as added, whatever
/// happened in between; a uri whose last entry is a deletion reports as
/// deleted; everything else is a modification.
fn collapse(entries: &[CardChange]) -> Collapsed {
    let mut per_uri: BTreeMap<&str, (ChangeOperation, ChangeOperation)> = BTreeMap::new();

    for entry in entries {
        per_uri
            .entry(&entry.uri)
            .and_modify(|(_first, last)| *last = entry.operation)
            .or_insert((entry.operation, entry.operation));
    }

    let mut collapsed = Collapsed::default();

    for (uri, (first, last)) in per_uri {
        match (first, last) {
            (_, ChangeOperation::Deleted) => collapsed.deleted.push(uri.to_string()),
            (ChangeOperation::Added, _) => collapsed.added.push(uri.to_string()),
            _ => collapsed.modified.push(uri.to_string()),
        }
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(uri: &str, ctag: i64, operation: ChangeOperation) -> CardChange {
        CardChange {
            id: ctag,
            addressbookid: 1,
            uri: uri.to_string(),
            ctag,
            operation,
        }
    }

    #[test]
    fn collapse_keeps_latest_outcome() {
        let entries = vec![
            entry("a.vcf", 1, ChangeOperation::Added),
            entry("a.vcf", 2, ChangeOperation::Modified),
            entry("b.vcf", 3, ChangeOperation::Modified),
            entry("c.vcf", 4, ChangeOperation::Added),
            entry("c.vcf", 5, ChangeOperation::Deleted),
        ];

        let collapsed = collapse(&entries);

        // Added-then-modified within the window is still new to the client
        assert_eq!(collapsed.added, vec!["a.vcf"]);
        assert_eq!(collapsed.modified, vec!["b.vcf"]);
        assert_eq!(collapsed.deleted, vec!["c.vcf"]);
    }

    #[test]
    fn collapse_empty_log() {
        let collapsed = collapse(&[]);
        assert!(collapsed.added.is_empty());
        assert!(collapsed.modified.is_empty());
        assert!(collapsed.deleted.is_empty());
    }

    #[test]
    fn delete_then_recreate_reports_added() {
        let entries = vec![
            entry("a.vcf", 1, ChangeOperation::Deleted),
            entry("a.vcf", 2, ChangeOperation::Added),
        ];

        let collapsed = collapse(&entries);
        // First seen as deleted, but the row is live again: not a deletion
        assert!(collapsed.deleted.is_empty());
        assert_eq!(collapsed.modified, vec!["a.vcf"]);
    }
}
