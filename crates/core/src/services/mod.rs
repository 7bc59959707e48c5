//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod admin;
pub mod appeal;
pub mod booking;
pub mod gate;
pub mod messaging;
pub mod moderation;
pub mod notification;
pub mod payment;
pub mod session;

pub use account::{AccountService, LoginInput, SignupInput, UserSummary, hash_password};
pub use admin::{
    AdminUserResponse, AdminUserService, CreateAdminInput, GrantInput, UpdateAdminInput,
};
pub use appeal::{AppealResponse, AppealService, SubmitAppealInput};
pub use booking::{BookingResponse, BookingService, CreateBookingInput};
pub use gate::{GateDecision, RoleGateService, RouteAccess};
pub use messaging::{
    ConversationResponse, MessageResponse, MessagingService, SendMessageInput,
    StartConversationInput,
};
pub use moderation::{ModerationService, SuspensionState};
pub use notification::{MarkReadInput, NotificationResponse, NotificationService};
pub use payment::PaymentService;
pub use session::{Claims, Identity, SESSION_COOKIE, SessionService};
