//! Session Store
//!
//! Token, user profile and small UI flags kept in browser storage.
//! "Remember me" writes to `localStorage`, otherwise `sessionStorage`;
//! a write to one area always clears the same key in the other so the
//! two never disagree.

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::models::{Role, UserInfo};
use crate::storage::KeyValueStore;

// ========================
// Storage Keys
// ========================

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_INFO_KEY: &str = "user_info";
pub const REMEMBERED_USERNAME_KEY: &str = "remembered_username";
pub const TEACHER_BOARD_COLLAPSED_KEY: &str = "teacher_board_collapsed";
pub const OPS_SIDEBAR_COLLAPSED_KEY: &str = "ops_sidebar_collapsed";

#[derive(Clone)]
pub struct SessionStore {
    local: Rc<dyn KeyValueStore>,
    session: Rc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(local: Rc<dyn KeyValueStore>, session: Rc<dyn KeyValueStore>) -> Self {
        Self { local, session }
    }

    fn write(&self, key: &str, value: &str, persist: bool) {
        let (target, other) = if persist {
            (&self.local, &self.session)
        } else {
            (&self.session, &self.local)
        };
        target.set_item(key, value);
        other.remove_item(key);
    }

    fn read(&self, key: &str) -> Option<String> {
        self.session
            .get_item(key)
            .or_else(|| self.local.get_item(key))
    }

    fn remove(&self, key: &str) {
        self.local.remove_item(key);
        self.session.remove_item(key);
    }

    // ========================
    // Token
    // ========================

    pub fn set_token(&self, token: &str, remember: bool) {
        self.write(TOKEN_KEY, token, remember);
    }

    pub fn get_token(&self) -> Option<String> {
        self.read(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn remove_token(&self) {
        self.remove(TOKEN_KEY);
    }

    /// True when the token currently lives in `localStorage`
    pub fn is_remembered(&self) -> bool {
        self.local
            .get_item(TOKEN_KEY)
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }

    // ========================
    // User Info
    // ========================

    pub fn set_user_info(&self, user: &UserInfo, remember: bool) {
        match serde_json::to_string(user) {
            Ok(json) => self.write(USER_INFO_KEY, &json, remember),
            Err(e) => log::error!("[SESSION] failed to encode user info: {}", e),
        }
    }

    /// Stored profile; an unparseable entry reads as absent
    pub fn get_user_info(&self) -> Option<UserInfo> {
        let raw = self.read(USER_INFO_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("[SESSION] discarding unreadable user info: {}", e);
                None
            }
        }
    }

    pub fn remove_user_info(&self) {
        self.remove(USER_INFO_KEY);
    }

    pub fn current_role(&self) -> Option<Role> {
        self.get_user_info().map(|u| u.role)
    }

    /// Drop token and profile from both areas
    pub fn clear(&self) {
        self.remove_token();
        self.remove_user_info();
    }

    // ========================
    // Generic Values
    // ========================

    /// Store any serializable value; strings are stored as-is
    pub fn set_storage<T: Serialize + ?Sized>(&self, key: &str, value: &T, persist: bool) {
        let raw = match serde_json::to_value(value) {
            Ok(Value::String(s)) => s,
            Ok(other) => other.to_string(),
            Err(e) => {
                log::error!("[SESSION] failed to encode {}: {}", key, e);
                return;
            }
        };
        self.write(key, &raw, persist);
    }

    /// JSON-parsed value, or the raw string when it isn't JSON
    pub fn get_storage(&self, key: &str) -> Option<Value> {
        let raw = self.read(key)?;
        Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }

    pub fn get_flag(&self, key: &str) -> bool {
        matches!(self.get_storage(key), Some(Value::Bool(true)))
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get_storage(key)? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn remove_storage(&self, key: &str) {
        self.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;
    use crate::storage::MemoryStorage;

    fn make_store() -> (SessionStore, Rc<MemoryStorage>, Rc<MemoryStorage>) {
        let local = Rc::new(MemoryStorage::new());
        let session = Rc::new(MemoryStorage::new());
        let store = SessionStore::new(local.clone(), session.clone());
        (store, local, session)
    }

    fn make_user(role: Role) -> UserInfo {
        UserInfo {
            id: None,
            username: "amy".to_string(),
            role,
            person_id: Some(EntityId::new("12")),
            name: None,
        }
    }

    #[test]
    fn test_token_follows_remember_flag() {
        let (store, local, session) = make_store();

        store.set_token("abc", true);
        assert_eq!(local.get_item(TOKEN_KEY).as_deref(), Some("abc"));
        assert!(session.get_item(TOKEN_KEY).is_none());
        assert!(store.is_remembered());
        assert_eq!(store.get_token().as_deref(), Some("abc"));

        store.set_token("def", false);
        assert!(local.get_item(TOKEN_KEY).is_none());
        assert_eq!(session.get_item(TOKEN_KEY).as_deref(), Some("def"));
        assert!(!store.is_remembered());
        assert_eq!(store.get_token().as_deref(), Some("def"));
    }

    #[test]
    fn test_session_area_wins_on_read() {
        let (store, local, session) = make_store();
        local.set_item(TOKEN_KEY, "old");
        session.set_item(TOKEN_KEY, "new");
        assert_eq!(store.get_token().as_deref(), Some("new"));
    }

    #[test]
    fn test_remove_token_clears_both_areas() {
        let (store, local, session) = make_store();
        local.set_item(TOKEN_KEY, "a");
        session.set_item(TOKEN_KEY, "b");
        store.remove_token();
        assert!(store.get_token().is_none());
        assert!(local.is_empty());
        assert!(session.is_empty());
    }

    #[test]
    fn test_user_info_roundtrip_and_corruption() {
        let (store, _local, session) = make_store();
        store.set_user_info(&make_user(Role::Operator), false);
        assert_eq!(store.current_role(), Some(Role::Operator));

        session.set_item(USER_INFO_KEY, "{not json");
        assert!(store.get_user_info().is_none());
    }

    #[test]
    fn test_generic_storage_values() {
        let (store, _local, _session) = make_store();
        store.set_storage(TEACHER_BOARD_COLLAPSED_KEY, &true, true);
        assert!(store.get_flag(TEACHER_BOARD_COLLAPSED_KEY));

        store.set_storage(REMEMBERED_USERNAME_KEY, "amy", true);
        assert_eq!(store.get_string(REMEMBERED_USERNAME_KEY).as_deref(), Some("amy"));

        store.remove_storage(TEACHER_BOARD_COLLAPSED_KEY);
        assert!(!store.get_flag(TEACHER_BOARD_COLLAPSED_KEY));
    }
}
