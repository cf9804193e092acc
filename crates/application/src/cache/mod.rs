mod expiring_lru;

pub use expiring_lru::ExpiringLru;
