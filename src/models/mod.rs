pub mod event;
pub mod organizer;
pub mod otp;
pub mod ticket;
pub mod transaction;
pub mod user;
