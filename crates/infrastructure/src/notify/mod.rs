pub mod hub;

pub use hub::InMemoryNotificationHub;
