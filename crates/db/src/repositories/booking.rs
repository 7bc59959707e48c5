//! Booking repository.

use std::sync::Arc;

use crate::entities::{
    Booking,
    booking::{self, BookingStatus, PaymentStatus},
    notification,
};
use admarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Booking repository for database operations.
#[derive(Clone)]
pub struct BookingRepository {
    db: Arc<DatabaseConnection>,
}

impl BookingRepository {
    /// Create a new booking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a booking by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<booking::Model>> {
        Booking::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a booking by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<booking::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))
    }

    /// Find a booking by provider checkout session id.
    pub async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> AppResult<Option<booking::Model>> {
        Booking::find()
            .filter(booking::Column::CheckoutSessionId.eq(session_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new booking.
    pub async fn create(&self, model: booking::ActiveModel) -> AppResult<booking::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List bookings where the user is either party, newest first.
    pub async fn find_for_participant(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<booking::Model>> {
        Booking::find()
            .filter(
                Condition::any()
                    .add(booking::Column::AdvertiserId.eq(user_id))
                    .add(booking::Column::PublisherId.eq(user_id)),
            )
            .order_by_desc(booking::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count bookings where the user is either party.
    pub async fn count_for_participant(&self, user_id: &str) -> AppResult<u64> {
        Booking::find()
            .filter(
                Condition::any()
                    .add(booking::Column::AdvertiserId.eq(user_id))
                    .add(booking::Column::PublisherId.eq(user_id)),
            )
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a booking confirmed and paid, emitting notifications for both
    /// parties in the same transaction.
    pub async fn apply_checkout_completed(
        &self,
        booking: booking::Model,
        notifications: Vec<notification::ActiveModel>,
    ) -> AppResult<booking::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: booking::ActiveModel = booking.into();
        active.status = Set(BookingStatus::Confirmed);
        active.payment_status = Set(PaymentStatus::Paid);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for model in notifications {
            model
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Mark a booking's payment failed, emitting a notification in the same
    /// transaction.
    pub async fn apply_payment_failed(
        &self,
        booking: booking::Model,
        notification: notification::ActiveModel,
    ) -> AppResult<booking::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: booking::ActiveModel = booking.into();
        active.payment_status = Set(PaymentStatus::Failed);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        notification
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_booking(id: &str) -> booking::Model {
        booking::Model {
            id: id.to_string(),
            advertiser_id: "adv1".to_string(),
            publisher_id: "pub1".to_string(),
            placement: "Homepage banner".to_string(),
            amount_cents: 50_000,
            currency: "USD".to_string(),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            checkout_session_id: Some("cs_test_1".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_checkout_session() {
        let booking = create_test_booking("booking1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[booking.clone()]])
                .into_connection(),
        );

        let repo = BookingRepository::new(db);
        let result = repo.find_by_checkout_session("cs_test_1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "booking1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<booking::Model>::new()])
                .into_connection(),
        );

        let repo = BookingRepository::new(db);
        let result = repo.get_by_id("nope").await;

        match result {
            Err(AppError::BookingNotFound(id)) => assert_eq!(id, "nope"),
            _ => panic!("Expected BookingNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_for_participant() {
        let first = create_test_booking("booking1");
        let second = create_test_booking("booking2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[first, second]])
                .into_connection(),
        );

        let repo = BookingRepository::new(db);
        let result = repo.find_for_participant("adv1", 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
