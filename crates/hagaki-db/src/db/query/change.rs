//! Change-log queries backing the sync-collection REPORT.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::card_changes;
use crate::error::DbResult;
use crate::model::change::{CardChange, NewCardChange};

/// ## Summary
/// Appends a change-log entry for a card mutation.
#[tracing::instrument(skip(conn, new), fields(addressbook_id = new.addressbookid, uri = new.uri))]
pub async fn append(conn: &mut DbConnection<'_>, new: &NewCardChange<'_>) -> DbResult<CardChange> {
    Ok(diesel::insert_into(card_changes::table)
        .values(new)
        .returning(CardChange::as_returning())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Returns the change-log entries of an addressbook newer than the given
/// ctag, oldest first, so later entries for the same uri win when collapsed.
#[tracing::instrument(skip(conn))]
pub async fn since(
    conn: &mut DbConnection<'_>,
    addressbook_id: i64,
    ctag: i64,
) -> DbResult<Vec<CardChange>> {
    Ok(card_changes::table
        .filter(card_changes::addressbookid.eq(addressbook_id))
        .filter(card_changes::ctag.gt(ctag))
        .order(card_changes::ctag.asc())
        .select(CardChange::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Deletes the change log of an addressbook (cascade step of collection
/// delete).
#[tracing::instrument(skip(conn))]
pub async fn delete_for_addressbook(
    conn: &mut DbConnection<'_>,
    addressbook_id: i64,
) -> DbResult<usize> {
    Ok(diesel::delete(
        card_changes::table.filter(card_changes::addressbookid.eq(addressbook_id)),
    )
    .execute(conn)
    .await?)
}
