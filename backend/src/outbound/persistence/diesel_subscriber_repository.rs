//! PostgreSQL-backed `SubscriberRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SubscriberRepository, SubscriberRepositoryError};
use crate::domain::{AccountId, EmailAddress, EntitlementUpdate, Subscriber};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewSubscriberRow, SubscriberRow};
use super::pool::{DbPool, PoolError};
use super::schema::subscribers;

/// Diesel-backed implementation of the `SubscriberRepository` port.
#[derive(Clone)]
pub struct DieselSubscriberRepository {
    pool: DbPool,
}

impl DieselSubscriberRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SubscriberRepositoryError {
    map_basic_pool_error(error, SubscriberRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> SubscriberRepositoryError {
    map_basic_diesel_error(
        error,
        SubscriberRepositoryError::query,
        SubscriberRepositoryError::connection,
    )
}

fn row_to_subscriber(row: SubscriberRow) -> Result<Subscriber, SubscriberRepositoryError> {
    let email = EmailAddress::new(&row.email).map_err(|err| {
        SubscriberRepositoryError::query(format!("stored subscriber email invalid: {err}"))
    })?;
    let employee_count = u32::try_from(row.employee_count).map_err(|_| {
        SubscriberRepositoryError::query(format!(
            "stored employee count negative: {}",
            row.employee_count
        ))
    })?;
    Ok(Subscriber {
        email,
        account_id: row.account_id.map(AccountId::from_uuid),
        subscribed: row.subscribed,
        tier: row.tier,
        expires_at: row.expires_at,
        billing_ref: row.billing_ref,
        employee_count,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl SubscriberRepository for DieselSubscriberRepository {
    async fn find_by_account_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        subscribers::table
            .filter(subscribers::account_id.eq(account_id.as_uuid()))
            .order_by(subscribers::updated_at.desc())
            .select(SubscriberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_subscriber)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        subscribers::table
            .filter(subscribers::email.eq(email.as_ref()))
            .select(SubscriberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_subscriber)
            .transpose()
    }

    async fn upsert(
        &self,
        update: &EntitlementUpdate,
        now: DateTime<Utc>,
    ) -> Result<Subscriber, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewSubscriberRow {
            email: update.email.as_ref(),
            account_id: update.account_id.map(|id| *id.as_uuid()),
            subscribed: update.subscribed,
            tier: update.tier.as_deref(),
            expires_at: update.expires_at,
            billing_ref: update.billing_ref.as_deref(),
            updated_at: now,
        };
        let billing_fields = (
            subscribers::subscribed.eq(excluded(subscribers::subscribed)),
            subscribers::tier.eq(excluded(subscribers::tier)),
            subscribers::expires_at.eq(excluded(subscribers::expires_at)),
            subscribers::billing_ref.eq(excluded(subscribers::billing_ref)),
            subscribers::updated_at.eq(excluded(subscribers::updated_at)),
        );

        // An update without an account id keeps any existing link.
        let stored = if update.account_id.is_some() {
            diesel::insert_into(subscribers::table)
                .values(&row)
                .on_conflict(subscribers::email)
                .do_update()
                .set((
                    billing_fields,
                    subscribers::account_id.eq(excluded(subscribers::account_id)),
                ))
                .returning(SubscriberRow::as_returning())
                .get_result::<SubscriberRow>(&mut conn)
                .await
        } else {
            diesel::insert_into(subscribers::table)
                .values(&row)
                .on_conflict(subscribers::email)
                .do_update()
                .set(billing_fields)
                .returning(SubscriberRow::as_returning())
                .get_result::<SubscriberRow>(&mut conn)
                .await
        }
        .map_err(map_diesel_error)?;

        row_to_subscriber(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(employee_count: i32) -> SubscriberRow {
        SubscriberRow {
            email: "a@x.com".to_owned(),
            account_id: Some(Uuid::new_v4()),
            subscribed: true,
            tier: Some("Premium".to_owned()),
            expires_at: None,
            billing_ref: None,
            employee_count,
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn rows_convert_to_subscribers() {
        let subscriber = row_to_subscriber(row(5)).expect("valid row");
        assert_eq!(subscriber.employee_count, 5);
        assert_eq!(subscriber.tier.as_deref(), Some("Premium"));
        assert!(subscriber.account_id.is_some());
    }

    #[rstest]
    fn negative_counts_are_rejected() {
        let error = row_to_subscriber(row(-1)).expect_err("negative");
        assert!(matches!(error, SubscriberRepositoryError::Query { .. }));
    }
}
