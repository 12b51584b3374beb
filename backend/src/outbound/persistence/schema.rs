//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Registered accounts and their password hashes.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised email, unique across all accounts.
        email -> Varchar,
        /// PHC-format Argon2 hash.
        password_hash -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tenant companies. Slugs are not unique.
    companies (id) {
        id -> Uuid,
        name -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One profile per account, linking it to a company with a role.
    profiles (account_id) {
        account_id -> Uuid,
        company_id -> Uuid,
        full_name -> Varchar,
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Billing-driven subscription state keyed by email.
    subscribers (email) {
        email -> Varchar,
        account_id -> Nullable<Uuid>,
        subscribed -> Bool,
        tier -> Nullable<Varchar>,
        expires_at -> Nullable<Timestamptz>,
        billing_ref -> Nullable<Text>,
        employee_count -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(profiles -> accounts (account_id));
diesel::joinable!(profiles -> companies (company_id));
diesel::joinable!(subscribers -> accounts (account_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, companies, profiles, subscribers);
