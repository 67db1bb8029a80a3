//! Addressbook collection service.
//!
//! Wraps the addressbook queries with ownership enforcement and the
//! collision-free uri assignment used when collections are created by name.

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use hagaki_core::util::uri::{base_uri, unique_uri};
use hagaki_db::db::connection::DbConnection;
use hagaki_db::db::query::{addressbook, card, change};
use hagaki_db::model::addressbook::{Addressbook, AddressbookUpdate, NewAddressbook};

use crate::auth::{Principal, require_owner};
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Lists the principal's addressbooks.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn list(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
) -> ServiceResult<Vec<Addressbook>> {
    Ok(addressbook::list_for_owner(conn, &principal.name).await?)
}

/// ## Summary
/// Fetches an addressbook by id and verifies ownership.
///
/// ## Errors
/// `NotFound` for a missing id, `Forbidden` for an ownership mismatch.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn get_owned(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    id: i64,
) -> ServiceResult<Addressbook> {
    let found = addressbook::get(conn, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("addressbook {id}")))?;

    require_owner(principal, &found)?;

    Ok(found)
}

/// ## Summary
/// Fetches the principal's addressbook with the given collection uri.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn get_by_uri(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    uri: &str,
) -> ServiceResult<Addressbook> {
    addressbook::get_by_uri(conn, &principal.name, uri)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("addressbook {uri}")))
}

/// ## Summary
/// Creates an addressbook from a display name, assigning a collision-free
/// uri: the lower-cased sanitized name, with an incrementing numeric suffix
/// until unique among the owner's collections ("Work", "Work" -> `work`,
/// `work1`).
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn create(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    name: &str,
    description: Option<&str>,
) -> ServiceResult<Addressbook> {
    let taken: std::collections::HashSet<String> =
        addressbook::uris_for_owner(conn, &principal.name)
            .await?
            .into_iter()
            .collect();

    let uri = unique_uri(&base_uri(name), |candidate| taken.contains(candidate));

    let created = addressbook::create(
        conn,
        &NewAddressbook {
            userid: &principal.name,
            displayname: name,
            uri: &uri,
            description,
        },
    )
    .await?;

    tracing::info!(addressbook_id = created.id, uri = %created.uri, "Addressbook created");

    Ok(created)
}

/// ## Summary
/// Creates an addressbook at an explicit uri (the `CardDAV` MKCOL path).
///
/// ## Errors
/// `Conflict` when the uri is already taken by the owner.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn create_at_uri(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    uri: &str,
    displayname: &str,
    description: Option<&str>,
) -> ServiceResult<Addressbook> {
    if addressbook::get_by_uri(conn, &principal.name, uri)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "addressbook uri {uri} already exists"
        )));
    }

    let created = addressbook::create(
        conn,
        &NewAddressbook {
            userid: &principal.name,
            displayname,
            uri,
            description,
        },
    )
    .await?;

    tracing::info!(addressbook_id = created.id, uri = %created.uri, "Addressbook created via MKCOL");

    Ok(created)
}

/// ## Summary
/// Applies a partial update (name and/or description). The ctag is always
/// incremented, even for a no-field update, matching touch semantics.
///
/// ## Errors
/// `NotFound` for a missing id, `Forbidden` for an ownership mismatch.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn update(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    id: i64,
    displayname: Option<&str>,
    description: Option<&str>,
) -> ServiceResult<Addressbook> {
    // Ownership first; the update statement itself does not check it
    let _existing = get_owned(conn, principal, id).await?;

    addressbook::update(
        conn,
        id,
        &AddressbookUpdate {
            displayname,
            description,
        },
    )
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("addressbook {id}")))
}

/// ## Summary
/// Deletes an addressbook, cascading its cards and change log first, all in
/// one transaction.
///
/// ## Errors
/// `NotFound` for a missing id, `Forbidden` for an ownership mismatch.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn delete(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    id: i64,
) -> ServiceResult<()> {
    let existing = get_owned(conn, principal, id).await?;

    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            let removed_cards = card::delete_for_addressbook(tx, existing.id).await?;
            change::delete_for_addressbook(tx, existing.id).await?;
            addressbook::delete(tx, existing.id).await?;

            tracing::info!(
                addressbook_id = existing.id,
                removed_cards,
                "Addressbook deleted"
            );

            Ok(())
        }
        .scope_boxed()
    })
    .await
}
