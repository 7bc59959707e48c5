//! Database repositories.

mod appeal;
mod booking;
mod messaging;
mod notification;
mod permission;
mod user;

pub use appeal::AppealRepository;
pub use booking::BookingRepository;
pub use messaging::MessagingRepository;
pub use notification::NotificationRepository;
pub use permission::PermissionRepository;
pub use user::UserRepository;
