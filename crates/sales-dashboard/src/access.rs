//! Session-scoped role lookups.
//!
//! Roles come from the agency directory, which is slow enough that the
//! dashboard keeps a short-lived copy per session. The cache lives on the
//! [`SessionContext`] rather than in module state, so signing out drops it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::calendar::Clock;
use crate::reporting::StoreError;

/// How long a directory answer is trusted before it is fetched again.
pub const DEFAULT_ROLE_TTL_SECONDS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Producer,
    Csr,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Sales Manager",
            Self::Producer => "Producer",
            Self::Csr => "Customer Service Rep",
        }
    }

    /// Managers and admins work the review queue and coaching reports.
    pub const fn can_review(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

/// Source of truth for user roles.
pub trait RoleDirectory: Send + Sync {
    fn role_for(&self, user_id: &str) -> Result<Role, StoreError>;
}

#[derive(Debug, Clone, Copy)]
struct CachedRole {
    role: Role,
    fetched_at: DateTime<Utc>,
}

/// Role answers with a fixed time-to-live measured on an injected clock.
#[derive(Debug)]
pub struct RoleCache<C> {
    clock: C,
    ttl: Duration,
    entries: HashMap<String, CachedRole>,
}

impl<C: Clock> RoleCache<C> {
    pub fn new(clock: C, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn with_default_ttl(clock: C) -> Self {
        Self::new(clock, Duration::seconds(DEFAULT_ROLE_TTL_SECONDS))
    }

    /// Cached role for `user_id`, or `None` if absent or older than the TTL.
    pub fn get(&self, user_id: &str) -> Option<Role> {
        let cached = self.entries.get(user_id)?;
        if self.clock.now() - cached.fetched_at >= self.ttl {
            return None;
        }
        Some(cached.role)
    }

    pub fn insert(&mut self, user_id: impl Into<String>, role: Role) {
        let fetched_at = self.clock.now();
        self.entries
            .insert(user_id.into(), CachedRole { role, fetched_at });
    }

    pub fn invalidate(&mut self, user_id: &str) {
        self.entries.remove(user_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("session has been signed out")]
    SignedOut,
    #[error(transparent)]
    Directory(#[from] StoreError),
}

/// A signed-in user's view of the dashboard, owning its role cache.
#[derive(Debug)]
pub struct SessionContext<C> {
    user_id: Option<String>,
    roles: RoleCache<C>,
}

impl<C: Clock> SessionContext<C> {
    pub fn new(user_id: impl Into<String>, roles: RoleCache<C>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            roles,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Current user's role, served from cache while fresh.
    pub fn role<D>(&mut self, directory: &D) -> Result<Role, AccessError>
    where
        D: RoleDirectory + ?Sized,
    {
        let user_id = self.user_id.as_deref().ok_or(AccessError::SignedOut)?;
        if let Some(role) = self.roles.get(user_id) {
            return Ok(role);
        }

        let role = directory.role_for(user_id)?;
        debug!(user_id, role = role.label(), "role refreshed from directory");
        self.roles.insert(user_id, role);
        Ok(role)
    }

    pub fn sign_out(&mut self) {
        self.user_id = None;
        self.roles.clear();
    }

    pub fn cached_roles(&self) -> usize {
        self.roles.len()
    }
}
