use diesel::{pg::Pg, prelude::*};

use crate::db::enums::ChangeOperation;
use crate::db::schema;

/// One entry in an addressbook's change log.
///
/// `ctag` records the addressbook ctag value after the mutation, so a
/// sync-collection request with a client token of N returns exactly the
/// entries with `ctag > N`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::card_changes)]
#[diesel(check_for_backend(Pg))]
pub struct CardChange {
    pub id: i64,
    pub addressbookid: i64,
    pub uri: String,
    pub ctag: i64,
    pub operation: ChangeOperation,
}

/// Insert struct for appending change-log entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::card_changes)]
pub struct NewCardChange<'a> {
    pub addressbookid: i64,
    pub uri: &'a str,
    pub ctag: i64,
    pub operation: ChangeOperation,
}
