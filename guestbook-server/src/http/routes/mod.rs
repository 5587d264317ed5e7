//! Route modules

pub mod guestbook;
pub mod health;
