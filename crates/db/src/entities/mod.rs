//! Database entities.

pub mod appeal;
pub mod booking;
pub mod conversation;
pub mod message;
pub mod notification;
pub mod permission_grant;
pub mod user;

pub use appeal::Entity as Appeal;
pub use booking::Entity as Booking;
pub use conversation::Entity as Conversation;
pub use message::Entity as Message;
pub use notification::Entity as Notification;
pub use permission_grant::Entity as PermissionGrant;
pub use user::Entity as User;
