//! Booking listing and creation.

use admarket_common::{AppError, AppResult, IdGenerator};
use admarket_db::{
    entities::{
        booking::{self, BookingStatus, PaymentStatus},
        user::Role,
    },
    repositories::{BookingRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::session::Identity;

/// Input for creating a booking.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub publisher_id: String,

    #[validate(length(min = 1, max = 256))]
    pub placement: String,

    #[validate(range(min = 1))]
    pub amount_cents: i64,

    #[validate(length(min = 3, max = 8))]
    pub currency: String,

    /// Provider checkout session id, set when checkout was initiated
    /// before the booking record.
    pub checkout_session_id: Option<String>,
}

/// A booking as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub advertiser_id: String,
    pub publisher_id: String,
    pub placement: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: String,
}

impl From<booking::Model> for BookingResponse {
    fn from(b: booking::Model) -> Self {
        Self {
            id: b.id,
            advertiser_id: b.advertiser_id,
            publisher_id: b.publisher_id,
            placement: b.placement,
            amount_cents: b.amount_cents,
            currency: b.currency,
            status: b.status,
            payment_status: b.payment_status,
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

/// Booking service.
#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl BookingService {
    /// Create a new booking service.
    #[must_use]
    pub const fn new(booking_repo: BookingRepository, user_repo: UserRepository) -> Self {
        Self {
            booking_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a pending, unpaid booking. Advertisers only; the
    /// counterpart must be a publisher.
    pub async fn create(
        &self,
        advertiser: &Identity,
        input: CreateBookingInput,
    ) -> AppResult<booking::Model> {
        input.validate()?;

        if advertiser.role != Role::Advertiser {
            return Err(AppError::Forbidden(
                "Only advertisers create bookings".to_string(),
            ));
        }

        let publisher = self.user_repo.get_by_id(&input.publisher_id).await?;
        if publisher.role != Role::Publisher {
            return Err(AppError::BadRequest(
                "Target user is not a publisher".to_string(),
            ));
        }

        let model = booking::ActiveModel {
            id: Set(self.id_gen.generate()),
            advertiser_id: Set(advertiser.user_id.clone()),
            publisher_id: Set(publisher.id),
            placement: Set(input.placement),
            amount_cents: Set(input.amount_cents),
            currency: Set(input.currency.to_uppercase()),
            status: Set(BookingStatus::Pending),
            payment_status: Set(PaymentStatus::Unpaid),
            checkout_session_id: Set(input.checkout_session_id),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let booking = self.booking_repo.create(model).await?;

        tracing::info!(booking_id = %booking.id, "Booking created");

        Ok(booking)
    }

    /// List bookings where the caller is a party.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<BookingResponse>> {
        let bookings = self
            .booking_repo
            .find_for_participant(user_id, limit, offset)
            .await?;

        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }
}
