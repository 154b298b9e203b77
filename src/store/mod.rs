//! Persistence contract. Each resource module declares a repository trait
//! (select / filter / insert / update over its table); `Store` bundles them so
//! handlers can hold a single `Arc<dyn Store>`.

use async_trait::async_trait;

use crate::{
    expenses::repo::ExpenseRepo, friends::repo::FriendRepo, groups::repo::GroupRepo,
    inbox::repo::InboxRepo, payments::repo::PaymentRepo, settings::repo::SettingsRepo,
    users::repo::UserRepo,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[async_trait]
pub trait Store:
    UserRepo + GroupRepo + ExpenseRepo + PaymentRepo + FriendRepo + InboxRepo + SettingsRepo
{
    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}
