//! User and account ports over the in-memory tables.

use async_trait::async_trait;

use super::{InMemoryStore, State};
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    ActivityId, ActivityLogEntry, EmailAddress, Insertion, NewActivity, NewSession, NewUser,
    SessionId, User, UserId, UserPreference, UserSession, Username,
};

impl State {
    fn insert_user(&mut self, user: &NewUser, privileged: bool) -> Result<User, UserPersistenceError> {
        if self.users.iter().any(|u| u.username == user.username) {
            return Err(UserPersistenceError::duplicate_username(
                user.username.as_ref(),
            ));
        }
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        let now = self.now();
        let stored = User {
            id: UserId::random(),
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            is_active: true,
            is_staff: privileged,
            is_superuser: privileged,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.users.push(stored.clone());
        Ok(stored)
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut UserSession, AccountRepositoryError> {
        self.sessions
            .iter_mut()
            .find(|session| session.id == id)
            .ok_or_else(|| AccountRepositoryError::session_not_found(id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        self.lock().insert_user(user, false)
    }

    async fn create_superuser(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        if !user.password.is_usable() {
            return Err(UserPersistenceError::password_required());
        }
        self.lock().insert_user(user, true)
    }

    async fn get_or_create(
        &self,
        user: &NewUser,
    ) -> Result<Insertion<User>, UserPersistenceError> {
        let mut state = self.lock();
        if let Some(existing) = state.users.iter().find(|u| u.username == user.username) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state.insert_user(user, false).map(Insertion::Created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.iter().find(|u| &u.email == email).cloned())
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<User, UserPersistenceError> {
        let mut state = self.lock();
        let now = state.now();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| UserPersistenceError::not_found(id))?;
        user.is_active = active;
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.lock().remove_user(id))
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn open_session(
        &self,
        session: &NewSession,
    ) -> Result<UserSession, AccountRepositoryError> {
        let mut state = self.lock();
        if !state.user_exists(session.user) {
            return Err(AccountRepositoryError::user_not_found(session.user));
        }
        if state.sessions.iter().any(|s| s.token == session.token) {
            return Err(AccountRepositoryError::duplicate_token());
        }
        let now = state.now();
        let stored = UserSession {
            id: SessionId::random(),
            user: session.user,
            token: session.token.clone(),
            ip_address: session.ip_address.clone(),
            user_agent: session.user_agent.clone(),
            is_active: true,
            created_at: now,
            last_activity: now,
            expires_at: session.expires_at,
        };
        state.sessions.push(stored.clone());
        Ok(stored)
    }

    async fn touch_session(&self, id: SessionId) -> Result<UserSession, AccountRepositoryError> {
        let mut state = self.lock();
        let now = state.now();
        let session = state.session_mut(id)?;
        session.last_activity = now;
        Ok(session.clone())
    }

    async fn close_session(&self, id: SessionId) -> Result<UserSession, AccountRepositoryError> {
        let mut state = self.lock();
        let session = state.session_mut(id)?;
        session.is_active = false;
        Ok(session.clone())
    }

    async fn active_sessions(
        &self,
        user: UserId,
    ) -> Result<Vec<UserSession>, AccountRepositoryError> {
        let state = self.lock();
        let mut sessions: Vec<UserSession> = state
            .sessions
            .iter()
            .filter(|s| s.user == user && s.is_active)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(sessions)
    }

    async fn record_activity(
        &self,
        activity: &NewActivity,
    ) -> Result<ActivityLogEntry, AccountRepositoryError> {
        let mut state = self.lock();
        if !state.user_exists(activity.user) {
            return Err(AccountRepositoryError::user_not_found(activity.user));
        }
        let entry = ActivityLogEntry {
            id: ActivityId::random(),
            user: activity.user,
            kind: activity.kind,
            description: activity.description.clone(),
            ip_address: activity.ip_address.clone(),
            metadata: activity.metadata.clone(),
            created_at: state.now(),
        };
        state.activities.push(entry.clone());
        Ok(entry)
    }

    async fn recent_activity(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<ActivityLogEntry>, AccountRepositoryError> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .lock()
            .activities
            .iter()
            .rev()
            .filter(|entry| entry.user == user)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn preferences(&self, user: UserId) -> Result<UserPreference, AccountRepositoryError> {
        let mut state = self.lock();
        if !state.user_exists(user) {
            return Err(AccountRepositoryError::user_not_found(user));
        }
        Ok(state
            .preferences
            .entry(user)
            .or_insert_with(|| UserPreference::defaults_for(user))
            .clone())
    }

    async fn save_preferences(
        &self,
        preferences: &UserPreference,
    ) -> Result<UserPreference, AccountRepositoryError> {
        let mut state = self.lock();
        if !state.user_exists(preferences.user) {
            return Err(AccountRepositoryError::user_not_found(preferences.user));
        }
        state
            .preferences
            .insert(preferences.user, preferences.clone());
        Ok(preferences.clone())
    }
}
