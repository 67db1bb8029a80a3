//! Card row queries.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::cards;
use crate::error::DbResult;
use crate::model::card::{Card, CardUpdate, NewCard};

/// ## Summary
/// Lists the cards of an addressbook, ordered by full name ascending for
/// stable client pagination.
#[tracing::instrument(skip(conn))]
pub async fn list_for_addressbook(
    conn: &mut DbConnection<'_>,
    addressbook_id: i64,
) -> DbResult<Vec<Card>> {
    Ok(cards::table
        .filter(cards::addressbookid.eq(addressbook_id))
        .order(cards::fullname.asc())
        .select(Card::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Fetches a card by id.
#[tracing::instrument(skip(conn))]
pub async fn get(conn: &mut DbConnection<'_>, id: i64) -> DbResult<Option<Card>> {
    Ok(cards::table
        .find(id)
        .select(Card::as_select())
        .first(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Fetches a card by addressbook and resource uri.
#[tracing::instrument(skip(conn))]
pub async fn get_by_uri(
    conn: &mut DbConnection<'_>,
    addressbook_id: i64,
    uri: &str,
) -> DbResult<Option<Card>> {
    Ok(cards::table
        .filter(cards::addressbookid.eq(addressbook_id))
        .filter(cards::uri.eq(uri))
        .select(Card::as_select())
        .first(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Fetches several cards of one addressbook by uri (for multiget REPORTs).
/// Missing uris are simply absent from the result.
#[tracing::instrument(skip(conn, uris), fields(uri_count = uris.len()))]
pub async fn get_by_uris(
    conn: &mut DbConnection<'_>,
    addressbook_id: i64,
    uris: &[String],
) -> DbResult<Vec<Card>> {
    Ok(cards::table
        .filter(cards::addressbookid.eq(addressbook_id))
        .filter(cards::uri.eq_any(uris))
        .select(Card::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Returns the resource uris already taken inside an addressbook.
#[tracing::instrument(skip(conn))]
pub async fn uris_for_addressbook(
    conn: &mut DbConnection<'_>,
    addressbook_id: i64,
) -> DbResult<Vec<String>> {
    Ok(cards::table
        .filter(cards::addressbookid.eq(addressbook_id))
        .select(cards::uri)
        .load(conn)
        .await?)
}

/// ## Summary
/// Inserts a new card and returns the created row.
#[tracing::instrument(skip(conn, new), fields(addressbook_id = new.addressbookid, uri = new.uri))]
pub async fn create(conn: &mut DbConnection<'_>, new: &NewCard<'_>) -> DbResult<Card> {
    Ok(diesel::insert_into(cards::table)
        .values(new)
        .returning(Card::as_returning())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Rewrites a card's data columns. Returns `None` when the id does not exist.
#[tracing::instrument(skip(conn, changes))]
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &CardUpdate<'_>,
) -> DbResult<Option<Card>> {
    Ok(diesel::update(cards::table.find(id))
        .set(changes.clone())
        .returning(Card::as_returning())
        .get_result(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Deletes a card by id; returns the number of rows removed.
#[tracing::instrument(skip(conn))]
pub async fn delete(conn: &mut DbConnection<'_>, id: i64) -> DbResult<usize> {
    Ok(diesel::delete(cards::table.find(id)).execute(conn).await?)
}

/// ## Summary
/// Deletes every card of an addressbook (cascade step of collection delete).
#[tracing::instrument(skip(conn))]
pub async fn delete_for_addressbook(
    conn: &mut DbConnection<'_>,
    addressbook_id: i64,
) -> DbResult<usize> {
    Ok(
        diesel::delete(cards::table.filter(cards::addressbookid.eq(addressbook_id)))
            .execute(conn)
            .await?,
    )
}
