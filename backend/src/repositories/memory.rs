//! In-memory store implementations mirroring the Postgres semantics,
//! including the conditional-update contracts. They back the test suite
//! and are handy for running the API without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ApiKeyStore, EventStore, StoreError, UpdateStore, UserStore};
use crate::models::api_key::ApiKey;
use crate::models::event::Event;
use crate::models::update::{Update, UpdateKind, UpdateStatus};
use crate::models::user::{ProfileChanges, User};

fn newest_first<T, F: Fn(&T) -> (DateTime<Utc>, String)>(items: &mut [T], key: F) {
    items.sort_by(|a, b| {
        let (ta, ia) = key(a);
        let (tb, ib) = key(b);
        tb.cmp(&ta).then(ia.cmp(&ib))
    });
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().expect("users lock");
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("users lock");
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("users lock");
        Ok(users.get(id).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), StoreError> {
        let users = self.users.read().expect("users lock");
        let total = users.len() as i64;

        let mut all: Vec<User> = users.values().cloned().collect();
        newest_first(&mut all, |u| (u.created_at, u.id.clone()));

        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn mark_verified(&self, email: &str, code: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().expect("users lock");
        for user in users.values_mut() {
            if user.email == email
                && !user.verified
                && user.verification_code.as_deref() == Some(code)
            {
                user.verified = true;
                user.verification_code = None;
                user.updated_at = Utc::now();
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn replace_verification_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().expect("users lock");
        for user in users.values_mut() {
            if user.email == email && !user.verified {
                user.verification_code = Some(code.to_string());
                user.updated_at = Utc::now();
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn set_session_token(
        &self,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().expect("users lock");
        match users.get_mut(user_id) {
            Some(user) => {
                user.session_token = token.map(|t| t.to_string());
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_reset_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().expect("users lock");
        match users.get_mut(user_id) {
            Some(user) => {
                user.reset_token_hash = Some(token_hash.to_string());
                user.reset_token_expires_at = Some(expires_at);
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().expect("users lock");
        for user in users.values_mut() {
            if user.reset_token_hash.as_deref() == Some(token_hash)
                && user.reset_token_expires_at.is_some_and(|exp| exp > now)
            {
                user.password_hash = new_password_hash.to_string();
                user.reset_token_hash = None;
                user.reset_token_expires_at = None;
                user.updated_at = Utc::now();
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().expect("users lock");

        if let Some(ref email) = changes.email {
            if users
                .values()
                .any(|u| u.email == *email && u.id != user_id)
            {
                return Err(StoreError::DuplicateEmail);
            }
        }

        match users.get_mut(user_id) {
            Some(user) => {
                if let Some(ref v) = changes.first_name {
                    user.first_name = v.clone();
                }
                if let Some(ref v) = changes.last_name {
                    user.last_name = v.clone();
                }
                if let Some(ref v) = changes.email {
                    user.email = v.clone();
                }
                if let Some(ref v) = changes.password_hash {
                    user.password_hash = v.clone();
                }
                if let Some(ref v) = changes.profile_image {
                    user.profile_image = v.clone();
                }
                user.updated_at = Utc::now();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().expect("users lock");
        Ok(users.remove(user_id))
    }

    async fn clear_expired_reset_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut users = self.users.write().expect("users lock");
        let mut cleared = 0;
        for user in users.values_mut() {
            if user.reset_token_expires_at.is_some_and(|exp| exp < now) {
                user.reset_token_hash = None;
                user.reset_token_expires_at = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

#[derive(Default)]
pub struct MemoryApiKeyStore {
    keys: RwLock<HashMap<String, ApiKey>>,
}

impl MemoryApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyStore for MemoryApiKeyStore {
    async fn insert(&self, key: &ApiKey) -> Result<(), StoreError> {
        self.keys
            .write()
            .expect("keys lock")
            .insert(key.key.clone(), key.clone());
        Ok(())
    }

    async fn find(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        Ok(self.keys.read().expect("keys lock").get(key).cloned())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut keys = self.keys.write().expect("keys lock");
        let before = keys.len();
        keys.retain(|_, k| k.expires_at >= now);
        Ok((before - keys.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<String, Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        self.events
            .write()
            .expect("events lock")
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn list(&self, featured: Option<bool>) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().expect("events lock");
        let mut all: Vec<Event> = events
            .values()
            .filter(|e| featured.map_or(true, |flag| e.featured == flag))
            .cloned()
            .collect();
        newest_first(&mut all, |e| (e.created_at, e.id.clone()));
        Ok(all)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().expect("events lock").get(id).cloned())
    }

    async fn update(&self, event: &Event) -> Result<bool, StoreError> {
        let mut events = self.events.write().expect("events lock");
        match events.get_mut(&event.id) {
            Some(existing) => {
                existing.title = event.title.clone();
                existing.description = event.description.clone();
                existing.flyer = event.flyer.clone();
                existing.photos = event.photos.clone();
                existing.featured = event.featured;
                existing.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_featured(
        &self,
        id: &str,
        creator_id: &str,
        featured: bool,
    ) -> Result<Option<Event>, StoreError> {
        let mut events = self.events.write().expect("events lock");
        match events.get_mut(id) {
            Some(event) if event.creator_id == creator_id => {
                event.featured = featured;
                event.updated_at = Utc::now();
                Ok(Some(event.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .events
            .write()
            .expect("events lock")
            .remove(id)
            .is_some())
    }
}

#[derive(Default)]
pub struct MemoryUpdateStore {
    updates: RwLock<HashMap<String, Update>>,
}

impl MemoryUpdateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_sorted<F: Fn(&Update) -> bool>(&self, keep: F) -> Vec<Update> {
        let updates = self.updates.read().expect("updates lock");
        let mut all: Vec<Update> = updates.values().filter(|u| keep(u)).cloned().collect();
        newest_first(&mut all, |u| (u.created_at, u.id.clone()));
        all
    }
}

#[async_trait]
impl UpdateStore for MemoryUpdateStore {
    async fn insert(&self, update: &Update) -> Result<(), StoreError> {
        self.updates
            .write()
            .expect("updates lock")
            .insert(update.id.clone(), update.clone());
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Update>, StoreError> {
        Ok(self.collect_sorted(|u| u.status == UpdateStatus::Active))
    }

    async fn list_active_by_creator(&self, creator_id: &str) -> Result<Vec<Update>, StoreError> {
        Ok(self
            .collect_sorted(|u| u.status == UpdateStatus::Active && u.creator_id == creator_id))
    }

    async fn find_active_for_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> Result<Option<Update>, StoreError> {
        let updates = self.updates.read().expect("updates lock");
        Ok(updates
            .get(id)
            .filter(|u| u.creator_id == creator_id && u.status == UpdateStatus::Active)
            .cloned())
    }

    async fn edit(
        &self,
        id: &str,
        creator_id: &str,
        title: &str,
        description: &str,
        kind: UpdateKind,
    ) -> Result<Option<Update>, StoreError> {
        let mut updates = self.updates.write().expect("updates lock");
        match updates.get_mut(id) {
            Some(update) if update.creator_id == creator_id => {
                update.title = title.to_string();
                update.description = description.to_string();
                update.kind = kind;
                update.updated_at = Utc::now();
                Ok(Some(update.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn set_status(
        &self,
        id: &str,
        creator_id: &str,
        status: UpdateStatus,
    ) -> Result<Option<Update>, StoreError> {
        let mut updates = self.updates.write().expect("updates lock");
        match updates.get_mut(id) {
            Some(update) if update.creator_id == creator_id => {
                update.status = status;
                update.updated_at = Utc::now();
                Ok(Some(update.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: &str, creator_id: &str) -> Result<Option<Update>, StoreError> {
        let mut updates = self.updates.write().expect("updates lock");
        match updates.get(id) {
            Some(update) if update.creator_id == creator_id => {
                let removed = update.clone();
                updates.remove(id);
                Ok(Some(removed))
            }
            _ => Ok(None),
        }
    }
}
