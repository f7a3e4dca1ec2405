pub mod booking;
pub mod checkin;
pub mod event;
pub mod health;
pub mod location;
pub mod notification;
