use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A stored contact card.
///
/// `fullname` is a denormalized display cache of the vCard's FN property,
/// kept in sync on every write so listings can sort without parsing
/// `carddata`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::cards)]
#[diesel(check_for_backend(Pg))]
pub struct Card {
    pub id: i64,
    pub addressbookid: i64,
    pub fullname: String,
    pub carddata: String,
    pub uri: String,
    pub lastmodified: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for creating new cards.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::cards)]
pub struct NewCard<'a> {
    pub addressbookid: i64,
    pub fullname: &'a str,
    pub carddata: &'a str,
    pub uri: &'a str,
    pub lastmodified: chrono::DateTime<chrono::Utc>,
}

/// Full rewrite of a card's mutable columns on edit.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::cards)]
pub struct CardUpdate<'a> {
    pub fullname: &'a str,
    pub carddata: &'a str,
    pub lastmodified: chrono::DateTime<chrono::Utc>,
}
