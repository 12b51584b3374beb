//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Registration inserts the account, its company, and its profile inside a
//! single transaction. The unique constraint on `accounts.email` is the
//! final arbiter for concurrent registrations of the same address.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, NewRegistration, StoredCredentials,
};
use crate::domain::{
    Account, AccountDetails, AccountId, Company, CompanyId, EmailAddress, Profile, Role,
};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{
    AccountRow, CompanyRow, NewAccountRow, NewCompanyRow, NewProfileRow, ProfileRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{accounts, companies, profiles};

const EMAIL_UNIQUE_CONSTRAINT: &str = "accounts_email_key";

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    map_basic_pool_error(error, AccountRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> AccountRepositoryError {
    map_basic_diesel_error(
        error,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| AccountRepositoryError::query(format!("stored email invalid: {err}")))?;
    Ok(Account {
        id: AccountId::from_uuid(row.id),
        email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_profile(
    profile: ProfileRow,
    company: CompanyRow,
) -> Result<Profile, AccountRepositoryError> {
    let role = Role::try_from(profile.role.as_str())
        .map_err(|err| AccountRepositoryError::query(format!("stored role invalid: {err}")))?;
    Ok(Profile {
        account_id: AccountId::from_uuid(profile.account_id),
        full_name: profile.full_name,
        role,
        company: Company {
            id: CompanyId::from_uuid(company.id),
            name: company.name,
            slug: company.slug,
        },
    })
}

impl DieselAccountRepository {
    async fn find_row_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRow>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        accounts::table
            .filter(accounts::email.eq(email))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn create_registration(
        &self,
        registration: &NewRegistration,
    ) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let account = &registration.account;
        let company = &registration.profile.company;
        let account_row = NewAccountRow {
            id: *account.id.as_uuid(),
            email: account.email.as_ref(),
            password_hash: registration.password_hash.as_str(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        };
        let company_row = NewCompanyRow {
            id: *company.id.as_uuid(),
            name: company.name.as_str(),
            slug: company.slug.as_str(),
        };
        let profile_row = NewProfileRow {
            account_id: *account.id.as_uuid(),
            company_id: *company.id.as_uuid(),
            full_name: registration.profile.full_name.as_str(),
            role: registration.profile.role.as_str(),
        };

        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                diesel::insert_into(accounts::table)
                    .values(&account_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(companies::table)
                    .values(&company_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(profiles::table)
                    .values(&profile_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| {
            if is_unique_violation(&err, EMAIL_UNIQUE_CONSTRAINT) {
                AccountRepositoryError::duplicate_email(account.email.as_ref())
            } else {
                map_diesel_error(err)
            }
        })
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, AccountRepositoryError> {
        let Some(row) = self.find_row_by_email(email).await? else {
            return Ok(None);
        };
        let password_hash = row.password_hash.clone();
        let account = row_to_account(row)?;
        Ok(Some(StoredCredentials {
            account,
            password_hash,
        }))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        self.find_row_by_email(email.as_ref())
            .await?
            .map(row_to_account)
            .transpose()
    }

    async fn find_details(
        &self,
        id: &AccountId,
    ) -> Result<Option<AccountDetails>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let Some(account_row) = accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };

        let profile_rows: Option<(ProfileRow, CompanyRow)> = profiles::table
            .inner_join(companies::table)
            .filter(profiles::account_id.eq(id.as_uuid()))
            .select((ProfileRow::as_select(), CompanyRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let account = row_to_account(account_row)?;
        let profile = profile_rows
            .map(|(profile, company)| rows_to_profile(profile, company))
            .transpose()?;
        Ok(Some(AccountDetails { account, profile }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn account_row(email: &str) -> AccountRow {
        let now = Utc::now();
        AccountRow {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn account_rows_convert_without_hash() {
        let row = account_row("a@x.com");
        let id = row.id;
        let account = row_to_account(row).expect("valid row");
        assert_eq!(account.id.as_uuid(), &id);
        assert_eq!(account.email.as_ref(), "a@x.com");
    }

    #[rstest]
    fn corrupt_email_rows_are_query_errors() {
        let error = row_to_account(account_row("not-an-email")).expect_err("invalid");
        assert!(matches!(error, AccountRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case("admin", Some(Role::Admin))]
    #[case("member", Some(Role::Member))]
    #[case("owner", None)]
    fn profile_rows_require_known_roles(#[case] role: &str, #[case] expected: Option<Role>) {
        let account_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let profile = ProfileRow {
            account_id,
            company_id,
            full_name: "Ann".to_owned(),
            role: role.to_owned(),
        };
        let company = CompanyRow {
            id: company_id,
            name: "Acme".to_owned(),
            slug: "acme".to_owned(),
        };
        let converted = rows_to_profile(profile, company).ok().map(|p| p.role);
        assert_eq!(converted, expected);
    }
}
