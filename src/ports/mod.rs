mod halo_client;
mod reminder;
mod seed_store;

pub use halo_client::{HaloClient, MockHaloClient};
pub use reminder::{LogReminderSender, ReminderSender};
pub use seed_store::SeedStore;
