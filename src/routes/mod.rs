pub mod auth;
pub mod events;
pub mod organizers;
pub mod tickets;
pub mod transactions;
pub mod users;
