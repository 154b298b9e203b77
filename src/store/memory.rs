//! In-memory `Store` used by the test suite in place of the hosted database.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    expenses::{
        repo::ExpenseRepo,
        repo_types::{Expense, ExpenseParticipant, NewExpense},
    },
    friends::{repo::FriendRepo, repo_types::FriendLink},
    groups::{
        repo::GroupRepo,
        repo_types::{Group, NewGroup},
    },
    inbox::{
        repo::InboxRepo,
        repo_types::{Message, NewNotification, Notification, NotificationStatus},
    },
    payments::{
        repo::PaymentRepo,
        repo_types::{NewPayment, Payment, PaymentStatus},
    },
    settings::{
        repo::SettingsRepo,
        repo_types::{SettingsValues, UserSettings},
    },
    store::Store,
    users::{
        repo::UserRepo,
        repo_types::{ProfileUpdate, UserProfile},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<UserProfile>,
    groups: Vec<Group>,
    expenses: Vec<Expense>,
    participants: Vec<ExpenseParticipant>,
    payments: Vec<Payment>,
    friend_links: Vec<FriendLink>,
    notifications: Vec<Notification>,
    messages: Vec<Message>,
    settings: Vec<UserSettings>,
    /// Rows `get_payment` serves instead of the live ones.
    stale_payments: Vec<Payment>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail, as if the database went away.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }

    pub async fn add_user(&self, name: &str, username: &str) -> UserProfile {
        let user = UserProfile {
            id: Uuid::new_v4(),
            name: Some(name.to_string()),
            email: Some(format!("{}@example.com", username.to_lowercase())),
            username: Some(username.to_string()),
            phone_number: None,
            display_currency: Some("USD".into()),
        };
        self.tables.write().await.users.push(user.clone());
        user
    }

    pub async fn add_message(&self, thread_id: Uuid, recipient_id: Uuid, sender: &str, body: &str) {
        self.tables.write().await.messages.push(Message {
            id: Uuid::new_v4(),
            thread_id,
            recipient_id,
            sender_name: sender.to_string(),
            body: body.to_string(),
            created_at: OffsetDateTime::now_utc(),
        });
    }

    pub async fn all_expenses(&self) -> Vec<Expense> {
        self.tables.read().await.expenses.clone()
    }

    pub async fn all_participants(&self) -> Vec<ExpenseParticipant> {
        self.tables.read().await.participants.clone()
    }

    pub async fn all_payments(&self) -> Vec<Payment> {
        self.tables.read().await.payments.clone()
    }

    pub async fn all_notifications(&self) -> Vec<Notification> {
        self.tables.read().await.notifications.clone()
    }

    /// Makes `get_payment` keep returning `payment` as it is now, while the
    /// live row can still change underneath.
    pub async fn freeze_payment_read(&self, payment: Payment) {
        self.tables.write().await.stale_payments.push(payment);
    }

    pub async fn settings_row_count(&self) -> usize {
        self.tables.read().await.settings.len()
    }
}

fn newest_first<T: Clone>(rows: impl DoubleEndedIterator<Item = T>, key: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
    let mut out: Vec<T> = rows.rev().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<UserProfile>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserProfile>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t
            .users
            .iter()
            .find(|u| {
                u.username
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(username))
            })
            .cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<UserProfile>> {
        self.check()?;
        let mut t = self.tables.write().await;
        Ok(t.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.name = Some(update.name.clone());
            u.username = Some(update.username.clone());
            u.phone_number = Some(update.phone_number.clone());
            u.display_currency = Some(update.display_currency.clone());
            u.clone()
        }))
    }
}

#[async_trait]
impl GroupRepo for MemoryStore {
    async fn create_group(&self, group: NewGroup) -> anyhow::Result<Group> {
        self.check()?;
        let row = Group {
            id: Uuid::new_v4(),
            name: group.name,
            description: group.description,
            members: group.members,
            owner_id: group.owner_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.groups.push(row.clone());
        Ok(row)
    }

    async fn get_group(&self, id: Uuid) -> anyhow::Result<Option<Group>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn groups_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Group>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t.groups.iter().filter(|g| ids.contains(&g.id)).cloned().collect())
    }

    async fn groups_for_member(&self, user_id: Uuid) -> anyhow::Result<Vec<Group>> {
        self.check()?;
        let t = self.tables.read().await;
        let rows = t.groups.iter().filter(|g| g.has_member(user_id)).cloned();
        Ok(newest_first(rows.collect::<Vec<_>>().into_iter(), |g| g.created_at))
    }

    async fn update_group(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Option<Group>> {
        self.check()?;
        let mut t = self.tables.write().await;
        Ok(t.groups.iter_mut().find(|g| g.id == id).map(|g| {
            g.name = name.to_string();
            g.description = description.map(str::to_string);
            g.clone()
        }))
    }

    async fn set_group_members(&self, id: Uuid, members: &[Uuid]) -> anyhow::Result<Option<Group>> {
        self.check()?;
        let mut t = self.tables.write().await;
        Ok(t.groups.iter_mut().find(|g| g.id == id).map(|g| {
            g.members = members.to_vec();
            g.clone()
        }))
    }
}

#[async_trait]
impl ExpenseRepo for MemoryStore {
    async fn insert_expense(&self, expense: NewExpense) -> anyhow::Result<Expense> {
        self.check()?;
        let row = Expense {
            id: Uuid::new_v4(),
            user_id: expense.user_id,
            group_id: expense.group_id,
            amount: expense.amount,
            description: expense.description,
            expense_type: expense.expense_type,
            expense_date: expense.expense_date,
            split_type: expense.split_type,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.expenses.push(row.clone());
        Ok(row)
    }

    async fn insert_participants(
        &self,
        rows: &[ExpenseParticipant],
    ) -> anyhow::Result<Vec<ExpenseParticipant>> {
        self.check()?;
        self.tables
            .write()
            .await
            .participants
            .extend_from_slice(rows);
        Ok(rows.to_vec())
    }

    async fn get_expense(&self, id: Uuid) -> anyhow::Result<Option<Expense>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t.expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn expenses_by_creator(&self, user_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        self.check()?;
        let t = self.tables.read().await;
        let mut rows: Vec<Expense> = t
            .expenses
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (b.expense_date, b.created_at).cmp(&(a.expense_date, a.created_at))
        });
        Ok(rows)
    }

    async fn expenses_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Expense>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t.expenses.iter().filter(|e| ids.contains(&e.id)).cloned().collect())
    }

    async fn expenses_by_group(&self, group_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t
            .expenses
            .iter()
            .filter(|e| e.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn participants_for_member(
        &self,
        member_id: Uuid,
    ) -> anyhow::Result<Vec<ExpenseParticipant>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t
            .participants
            .iter()
            .filter(|p| p.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn participants_for_expenses(
        &self,
        expense_ids: &[Uuid],
    ) -> anyhow::Result<Vec<ExpenseParticipant>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t
            .participants
            .iter()
            .filter(|p| expense_ids.contains(&p.expense_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PaymentRepo for MemoryStore {
    async fn insert_payments(&self, rows: &[NewPayment]) -> anyhow::Result<Vec<Payment>> {
        self.check()?;
        let now = OffsetDateTime::now_utc();
        let inserted: Vec<Payment> = rows
            .iter()
            .map(|r| Payment {
                id: Uuid::new_v4(),
                expense_id: Some(r.expense_id),
                group_id: r.group_id,
                from_user_id: r.from_user_id,
                to_user_id: r.to_user_id,
                amount: r.amount,
                status: PaymentStatus::Requested,
                created_at: now,
                paid_at: None,
                paid_via: None,
            })
            .collect();
        self.tables
            .write()
            .await
            .payments
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn get_payment(&self, id: Uuid) -> anyhow::Result<Option<Payment>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t
            .stale_payments
            .iter()
            .chain(t.payments.iter())
            .find(|p| p.id == id)
            .cloned())
    }

    async fn payments_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Payment>> {
        self.check()?;
        let t = self.tables.read().await;
        let rows: Vec<Payment> = t
            .payments
            .iter()
            .filter(|p| p.from_user_id == user_id || p.to_user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows.into_iter(), |p| p.created_at))
    }

    async fn mark_payment_paid(
        &self,
        id: Uuid,
        paid_at: OffsetDateTime,
        paid_via: Option<&str>,
    ) -> anyhow::Result<Option<Payment>> {
        self.check()?;
        let mut t = self.tables.write().await;
        Ok(t
            .payments
            .iter_mut()
            .find(|p| p.id == id && p.status == PaymentStatus::Requested)
            .map(|p| {
                p.status = PaymentStatus::Paid;
                p.paid_at = Some(paid_at);
                p.paid_via = paid_via.map(str::to_string);
                p.clone()
            }))
    }
}

#[async_trait]
impl FriendRepo for MemoryStore {
    async fn friend_links(&self, owner_id: Uuid) -> anyhow::Result<Vec<FriendLink>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t
            .friend_links
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn get_friend_link(&self, id: Uuid) -> anyhow::Result<Option<FriendLink>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t.friend_links.iter().find(|l| l.id == id).cloned())
    }

    async fn find_friend_link(
        &self,
        owner_id: Uuid,
        friend_id: Uuid,
    ) -> anyhow::Result<Option<FriendLink>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t
            .friend_links
            .iter()
            .find(|l| l.owner_id == owner_id && l.friend_id == friend_id)
            .cloned())
    }

    async fn insert_friend_link(
        &self,
        owner_id: Uuid,
        friend_id: Uuid,
        note: Option<&str>,
    ) -> anyhow::Result<FriendLink> {
        self.check()?;
        let row = FriendLink {
            id: Uuid::new_v4(),
            owner_id,
            friend_id,
            note: note.map(str::to_string),
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.friend_links.push(row.clone());
        Ok(row)
    }

    async fn delete_friend_link(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        self.check()?;
        let mut t = self.tables.write().await;
        let before = t.friend_links.len();
        t.friend_links
            .retain(|l| !(l.id == id && l.owner_id == owner_id));
        Ok(t.friend_links.len() < before)
    }
}

#[async_trait]
impl InboxRepo for MemoryStore {
    async fn insert_notifications(&self, rows: &[NewNotification]) -> anyhow::Result<()> {
        self.check()?;
        let now = OffsetDateTime::now_utc();
        let mut t = self.tables.write().await;
        t.notifications.extend(rows.iter().map(|r| Notification {
            id: Uuid::new_v4(),
            user_id: r.user_id,
            from_user_id: r.from_user_id,
            kind: r.kind,
            message: r.message.clone(),
            status: NotificationStatus::Pending,
            created_at: now,
        }));
        Ok(())
    }

    async fn pending_notifications(&self, user_id: Uuid) -> anyhow::Result<Vec<Notification>> {
        self.check()?;
        let t = self.tables.read().await;
        let rows: Vec<Notification> = t
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.status == NotificationStatus::Pending)
            .cloned()
            .collect();
        Ok(newest_first(rows.into_iter(), |n| n.created_at))
    }

    async fn set_notification_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: NotificationStatus,
    ) -> anyhow::Result<Option<Notification>> {
        self.check()?;
        let mut t = self.tables.write().await;
        Ok(t
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.status = status;
                n.clone()
            }))
    }

    async fn messages_for(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
        self.check()?;
        let t = self.tables.read().await;
        let rows: Vec<Message> = t
            .messages
            .iter()
            .filter(|m| m.recipient_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows.into_iter(), |m| m.created_at))
    }
}

#[async_trait]
impl SettingsRepo for MemoryStore {
    async fn get_settings(&self, user_id: Uuid) -> anyhow::Result<Option<UserSettings>> {
        self.check()?;
        let t = self.tables.read().await;
        Ok(t.settings.iter().rev().find(|s| s.user_id == user_id).cloned())
    }

    async fn insert_settings(
        &self,
        user_id: Uuid,
        values: &SettingsValues,
    ) -> anyhow::Result<UserSettings> {
        self.check()?;
        let row = UserSettings {
            id: Uuid::new_v4(),
            user_id,
            notifications_enabled: values.notifications_enabled,
            theme: values.theme.clone(),
            font_size: values.font_size.clone(),
        };
        self.tables.write().await.settings.push(row.clone());
        Ok(row)
    }

    async fn update_settings(
        &self,
        id: Uuid,
        values: &SettingsValues,
    ) -> anyhow::Result<Option<UserSettings>> {
        self.check()?;
        let mut t = self.tables.write().await;
        Ok(t.settings.iter_mut().find(|s| s.id == id).map(|s| {
            s.notifications_enabled = values.notifications_enabled;
            s.theme = values.theme.clone();
            s.font_size = values.font_size.clone();
            s.clone()
        }))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    async fn requested_payment(store: &MemoryStore) -> Payment {
        let rows = store
            .insert_payments(&[NewPayment {
                expense_id: Uuid::new_v4(),
                group_id: None,
                from_user_id: Uuid::new_v4(),
                to_user_id: Uuid::new_v4(),
                amount: 12.5,
            }])
            .await
            .unwrap();
        rows[0].clone()
    }

    #[tokio::test]
    async fn mark_paid_only_applies_to_requested_rows() {
        let store = MemoryStore::new();
        let payment = requested_payment(&store).await;
        let first_at = OffsetDateTime::now_utc();

        let first = store
            .mark_payment_paid(payment.id, first_at, Some("venmo"))
            .await
            .unwrap()
            .expect("first update applies");
        assert_eq!(first.status, PaymentStatus::Paid);

        let second = store
            .mark_payment_paid(payment.id, first_at + Duration::minutes(1), Some("cash"))
            .await
            .unwrap();
        assert!(second.is_none());

        let row = store.get_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(row.paid_at, Some(first_at));
        assert_eq!(row.paid_via.as_deref(), Some("venmo"));
    }
}
