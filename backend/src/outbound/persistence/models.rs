//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, companies, profiles, subscribers};

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the companies table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = companies)]
pub(crate) struct NewCompanyRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
}

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub account_id: Uuid,
    pub company_id: Uuid,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub account_id: Uuid,
    pub company_id: Uuid,
    pub full_name: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the subscribers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscribers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriberRow {
    pub email: String,
    pub account_id: Option<Uuid>,
    pub subscribed: bool,
    pub tier: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub billing_ref: Option<String>,
    pub employee_count: i32,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for subscriber upserts.
///
/// `employee_count` is left to the column default on insert and never
/// touched by billing updates.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscribers)]
pub(crate) struct NewSubscriberRow<'a> {
    pub email: &'a str,
    pub account_id: Option<Uuid>,
    pub subscribed: bool,
    pub tier: Option<&'a str>,
    pub expires_at: Option<DateTime<Utc>>,
    pub billing_ref: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
