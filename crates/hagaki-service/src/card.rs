//! Card store service.
//!
//! Orchestrates card writes: normalization (or trusted stamping), the row
//! write, the owning addressbook's ctag bump, and the change-log append —
//! the last three always inside one transaction.

use std::collections::HashSet;

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use hagaki_db::db::connection::DbConnection;
use hagaki_db::db::enums::ChangeOperation;
use hagaki_db::db::etag::generate_etag;
use hagaki_db::db::query::{addressbook as addressbook_query, card as card_query, change};
use hagaki_db::model::card::{Card, CardUpdate, NewCard};
use hagaki_db::model::change::NewCardChange;
use hagaki_rfc::vcard::parse::{decode_text, parse_single};
use hagaki_rfc::vcard::serialize_single;

use crate::addressbook::get_owned;
use crate::auth::Principal;
use crate::error::{ServiceError, ServiceResult};
use crate::normalize::{normalize_card, normalize_parsed, stamp_trusted};

/// Display name of last resort for cards with no derivable name.
pub const FALLBACK_NAME: &str = "Unknown Name";

/// Outcome of a card write.
#[derive(Debug, Clone)]
pub struct CardWrite {
    /// The stored row.
    pub card: Card,
    /// Whether the write created the card (true) or updated it (false).
    pub created: bool,
    /// `ETag` of the stored bytes.
    pub etag: String,
}

/// Outcome of a batch import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
}

/// ## Summary
/// Lists an addressbook's cards ordered by full name.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn list(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_id: i64,
) -> ServiceResult<Vec<Card>> {
    let book = get_owned(conn, principal, addressbook_id).await?;
    Ok(card_query::list_for_addressbook(conn, book.id).await?)
}

/// ## Summary
/// Fetches a card by addressbook and resource uri.
///
/// ## Errors
/// `NotFound` when the uri has no row.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn get_by_uri(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_id: i64,
    uri: &str,
) -> ServiceResult<Card> {
    let book = get_owned(conn, principal, addressbook_id).await?;

    card_query::get_by_uri(conn, book.id, uri)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("card {uri}")))
}

/// ## Summary
/// Fetches several cards by uri for a multiget REPORT. Missing uris are
/// absent from the result, not errors.
#[tracing::instrument(skip(conn, principal, uris), fields(owner = %principal.name, uri_count = uris.len()))]
pub async fn multiget(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_id: i64,
    uris: &[String],
) -> ServiceResult<Vec<Card>> {
    let book = get_owned(conn, principal, addressbook_id).await?;
    Ok(card_query::get_by_uris(conn, book.id, uris).await?)
}

/// ## Summary
/// Adds a card through the untrusted path: the full normalizer runs, the
/// uri derives from the (possibly generated) UID, and an existing row at
/// that uri turns the add into an edit.
///
/// ## Errors
/// `Malformed` for unparseable payloads, `UidProbeExhausted` when uri
/// probing runs dry, `Forbidden`/`NotFound` from ownership checks.
#[tracing::instrument(skip(conn, principal, raw), fields(owner = %principal.name, raw_len = raw.len()))]
pub async fn add(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_id: i64,
    raw: &[u8],
) -> ServiceResult<CardWrite> {
    let book = get_owned(conn, principal, addressbook_id).await?;

    let taken: HashSet<String> = card_query::uris_for_addressbook(conn, book.id)
        .await?
        .into_iter()
        .collect();

    let normalized = normalize_card(raw, &taken, FALLBACK_NAME)?;

    let existing = card_query::get_by_uri(conn, book.id, &normalized.uri).await?;

    persist(
        conn,
        PersistCard {
            addressbook_id: book.id,
            uri: normalized.uri.clone(),
            full_name: normalized.full_name.clone(),
            carddata: normalized.carddata(),
            existing_id: existing.map(|c| c.id),
        },
    )
    .await
}

/// ## Summary
/// Stores a card arriving through the `CardDAV` write path. The payload is
/// trusted as client-authored: stored verbatim except for VERSION/PRODID
/// stamping. The existence of a row at the uri distinguishes create from
/// update.
///
/// ## Errors
/// `Malformed` for unparseable payloads, `Forbidden`/`NotFound` from
/// ownership checks.
#[tracing::instrument(skip(conn, principal, raw), fields(owner = %principal.name, uri = uri, raw_len = raw.len()))]
pub async fn put_trusted(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_id: i64,
    uri: &str,
    raw: &[u8],
) -> ServiceResult<CardWrite> {
    let book = get_owned(conn, principal, addressbook_id).await?;

    let text = decode_text(raw);
    let mut vcard = parse_single(&text).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    stamp_trusted(&mut vcard);

    let full_name = vcard
        .formatted_name()
        .unwrap_or(FALLBACK_NAME)
        .to_string();
    let carddata = serialize_single(&vcard);

    let existing = card_query::get_by_uri(conn, book.id, uri).await?;

    persist(
        conn,
        PersistCard {
            addressbook_id: book.id,
            uri: uri.to_string(),
            full_name,
            carddata,
            existing_id: existing.map(|c| c.id),
        },
    )
    .await
}

/// ## Summary
/// Edits a card in place. A malformed payload is a no-op returning
/// `Malformed`; the stored row is left untouched.
///
/// ## Errors
/// `NotFound` for a missing card, `Forbidden` for ownership mismatch,
/// `Malformed` for an unparseable payload.
#[tracing::instrument(skip(conn, principal, raw), fields(owner = %principal.name, raw_len = raw.len()))]
pub async fn edit(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    card_id: i64,
    raw: &[u8],
) -> ServiceResult<CardWrite> {
    let existing = card_query::get(conn, card_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("card {card_id}")))?;

    let book = get_owned(conn, principal, existing.addressbookid).await?;

    // Validate before touching anything; a parse failure leaves the row as-is
    let text = decode_text(raw);
    let vcard = parse_single(&text).map_err(|e| ServiceError::Malformed(e.to_string()))?;

    let full_name = vcard
        .formatted_name()
        .map_or_else(|| existing.fullname.clone(), ToString::to_string);
    let carddata = serialize_single(&vcard);

    persist(
        conn,
        PersistCard {
            addressbook_id: book.id,
            uri: existing.uri.clone(),
            full_name,
            carddata,
            existing_id: Some(existing.id),
        },
    )
    .await
}

/// ## Summary
/// Deletes a card, bumps the owning addressbook's ctag, and appends a
/// deletion entry to the change log, all in one transaction.
///
/// ## Errors
/// `NotFound` for a missing card, `Forbidden` for ownership mismatch.
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn delete(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    card_id: i64,
) -> ServiceResult<()> {
    let existing = card_query::get(conn, card_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("card {card_id}")))?;

    let book = get_owned(conn, principal, existing.addressbookid).await?;

    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            card_query::delete(tx, existing.id).await?;

            let new_ctag = addressbook_query::touch(tx, book.id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("addressbook {}", book.id)))?;

            change::append(
                tx,
                &NewCardChange {
                    addressbookid: book.id,
                    uri: &existing.uri,
                    ctag: new_ctag,
                    operation: ChangeOperation::Deleted,
                },
            )
            .await?;

            tracing::info!(card_id = existing.id, uri = %existing.uri, "Card deleted");

            Ok(())
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Deletes a card addressed by uri (the `CardDAV` DELETE path).
#[tracing::instrument(skip(conn, principal), fields(owner = %principal.name))]
pub async fn delete_by_uri(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_id: i64,
    uri: &str,
) -> ServiceResult<()> {
    let card = get_by_uri(conn, principal, addressbook_id, uri).await?;
    delete(conn, principal, card.id).await
}

/// ## Summary
/// Imports a document holding one or more cards. Malformed or colliding
/// cards are logged and skipped; the batch continues (per-item failure
/// never aborts the import).
///
/// ## Errors
/// `Malformed` only when the document as a whole cannot be parsed.
#[tracing::instrument(skip(conn, principal, raw), fields(owner = %principal.name, raw_len = raw.len()))]
pub async fn import(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_id: i64,
    raw: &[u8],
) -> ServiceResult<ImportReport> {
    let book = get_owned(conn, principal, addressbook_id).await?;

    let text = decode_text(raw);
    let cards =
        hagaki_rfc::vcard::parse(&text).map_err(|e| ServiceError::Malformed(e.to_string()))?;

    let mut taken: HashSet<String> = card_query::uris_for_addressbook(conn, book.id)
        .await?
        .into_iter()
        .collect();

    let mut report = ImportReport::default();

    for vcard in cards {
        let normalized = match normalize_parsed(vcard, &taken, FALLBACK_NAME) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping card in import batch");
                report.failed += 1;
                continue;
            }
        };

        let existing = card_query::get_by_uri(conn, book.id, &normalized.uri).await?;

        let write = persist(
            conn,
            PersistCard {
                addressbook_id: book.id,
                uri: normalized.uri.clone(),
                full_name: normalized.full_name.clone(),
                carddata: normalized.carddata(),
                existing_id: existing.map(|c| c.id),
            },
        )
        .await;

        match write {
            Ok(outcome) => {
                taken.insert(outcome.card.uri.clone());
                report.imported += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to store card from import batch");
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        imported = report.imported,
        failed = report.failed,
        "Import finished"
    );

    Ok(report)
}

/// Parameters for the transactional card write.
struct PersistCard {
    addressbook_id: i64,
    uri: String,
    full_name: String,
    carddata: String,
    existing_id: Option<i64>,
}

/// Writes the row, bumps the ctag, and appends the change entry in one
/// transaction.
async fn persist(conn: &mut DbConnection<'_>, write: PersistCard) -> ServiceResult<CardWrite> {
    let etag = generate_etag(write.carddata.as_bytes());
    let created = write.existing_id.is_none();

    let card = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let now = chrono::Utc::now();

                let card = match write.existing_id {
                    Some(id) => card_query::update(
                        tx,
                        id,
                        &CardUpdate {
                            fullname: &write.full_name,
                            carddata: &write.carddata,
                            lastmodified: now,
                        },
                    )
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("card {id}")))?,
                    None => {
                        card_query::create(
                            tx,
                            &NewCard {
                                addressbookid: write.addressbook_id,
                                fullname: &write.full_name,
                                carddata: &write.carddata,
                                uri: &write.uri,
                                lastmodified: now,
                            },
                        )
                        .await?
                    }
                };

                let new_ctag = addressbook_query::touch(tx, write.addressbook_id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("addressbook {}", write.addressbook_id))
                    })?;

                let operation = if write.existing_id.is_none() {
                    ChangeOperation::Added
                } else {
                    ChangeOperation::Modified
                };

                change::append(
                    tx,
                    &NewCardChange {
                        addressbookid: write.addressbook_id,
                        uri: &card.uri,
                        ctag: new_ctag,
                        operation,
                    },
                )
                .await?;

                Ok(card)
            }
            .scope_boxed()
        })
        .await?;

    Ok(CardWrite {
        card,
        created,
        etag,
    })
}
