//! Addressbook row queries.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::addressbooks;
use crate::error::DbResult;
use crate::model::addressbook::{Addressbook, AddressbookUpdate, NewAddressbook};

/// ## Summary
/// Lists all addressbooks owned by a user, ordered by display name.
#[tracing::instrument(skip(conn))]
pub async fn list_for_owner(conn: &mut DbConnection<'_>, owner: &str) -> DbResult<Vec<Addressbook>> {
    Ok(addressbooks::table
        .filter(addressbooks::userid.eq(owner))
        .order(addressbooks::displayname.asc())
        .select(Addressbook::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Fetches an addressbook by id.
#[tracing::instrument(skip(conn))]
pub async fn get(conn: &mut DbConnection<'_>, id: i64) -> DbResult<Option<Addressbook>> {
    Ok(addressbooks::table
        .find(id)
        .select(Addressbook::as_select())
        .first(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Fetches an addressbook by owner and collection uri.
#[tracing::instrument(skip(conn))]
pub async fn get_by_uri(
    conn: &mut DbConnection<'_>,
    owner: &str,
    uri: &str,
) -> DbResult<Option<Addressbook>> {
    Ok(addressbooks::table
        .filter(addressbooks::userid.eq(owner))
        .filter(addressbooks::uri.eq(uri))
        .select(Addressbook::as_select())
        .first(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Returns the collection uris already taken by an owner.
#[tracing::instrument(skip(conn))]
pub async fn uris_for_owner(conn: &mut DbConnection<'_>, owner: &str) -> DbResult<Vec<String>> {
    Ok(addressbooks::table
        .filter(addressbooks::userid.eq(owner))
        .select(addressbooks::uri)
        .load(conn)
        .await?)
}

/// ## Summary
/// Inserts a new addressbook and returns the created row.
#[tracing::instrument(skip(conn, new))]
pub async fn create(
    conn: &mut DbConnection<'_>,
    new: &NewAddressbook<'_>,
) -> DbResult<Addressbook> {
    Ok(diesel::insert_into(addressbooks::table)
        .values(new)
        .returning(Addressbook::as_returning())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Applies a partial update and bumps the ctag in the same statement.
///
/// Returns `None` when the id does not exist.
#[tracing::instrument(skip(conn, changes))]
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &AddressbookUpdate<'_>,
) -> DbResult<Option<Addressbook>> {
    Ok(diesel::update(addressbooks::table.find(id))
        .set((changes.clone(), addressbooks::ctag.eq(addressbooks::ctag + 1)))
        .returning(Addressbook::as_returning())
        .get_result(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Increments the addressbook's ctag and returns the new value.
///
/// The increment is a single `ctag = ctag + 1` statement, delegated to the
/// database to perform atomically. Returns `None` when the id does not exist.
#[tracing::instrument(skip(conn))]
pub async fn touch(conn: &mut DbConnection<'_>, id: i64) -> DbResult<Option<i64>> {
    Ok(diesel::update(addressbooks::table.find(id))
        .set(addressbooks::ctag.eq(addressbooks::ctag + 1))
        .returning(addressbooks::ctag)
        .get_result(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Deletes the addressbook row itself. Cascade of cards and change-log rows
/// is orchestrated by the service layer inside one transaction.
#[tracing::instrument(skip(conn))]
pub async fn delete(conn: &mut DbConnection<'_>, id: i64) -> DbResult<usize> {
    Ok(diesel::delete(addressbooks::table.find(id))
        .execute(conn)
        .await?)
}
