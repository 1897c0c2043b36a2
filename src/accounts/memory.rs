use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::AccountStore;
use super::repo_types::{IdentityFilter, NewPrincipal, Principal, PrincipalChanges, Role};
use crate::db::{StoreError, StoreResult, UniqueKey};

/// Account store kept in process memory. Enforces the same uniqueness
/// constraints as the `users` table.
#[derive(Default)]
pub struct MemoryAccountStore {
    rows: RwLock<HashMap<Uuid, Principal>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_unique(rows: &HashMap<Uuid, Principal>, candidate: &Principal) -> StoreResult<()> {
    for other in rows.values().filter(|p| p.id != candidate.id) {
        if other.username == candidate.username {
            return Err(StoreError::UniqueViolation(UniqueKey::Username));
        }
        if other.email == candidate.email {
            return Err(StoreError::UniqueViolation(UniqueKey::Email));
        }
        if candidate.phone.is_some() && other.phone == candidate.phone {
            return Err(StoreError::UniqueViolation(UniqueKey::Phone));
        }
    }
    Ok(())
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_one(&self, filter: &IdentityFilter<'_>) -> StoreResult<Option<Principal>> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|p| filter.matches(p)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Principal>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<Principal>> {
        let rows = self.rows.read().await;
        let mut out: Vec<Principal> = rows.values().filter(|p| p.role == role).cloned().collect();
        out.sort_by_key(|p| p.created_at);
        Ok(out)
    }

    async fn insert(&self, new: NewPrincipal) -> StoreResult<Principal> {
        let principal = Principal {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            phone: new.phone,
            date_of_birth: new.date_of_birth,
            role: new.role,
            password_hash: new.password_hash,
            image: None,
            specialty: None,
            experience: None,
            location: None,
            description: None,
            prices: None,
            is_premium: false,
            premium_expired_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let mut rows = self.rows.write().await;
        check_unique(&rows, &principal)?;
        rows.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn update_by_id(&self, id: Uuid, changes: PrincipalChanges) -> StoreResult<Principal> {
        let mut rows = self.rows.write().await;
        let mut updated = rows.get(&id).cloned().ok_or(StoreError::NotFound)?;
        changes.apply_to(&mut updated);
        check_unique(&rows, &updated)?;
        rows.insert(id, updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_principal(username: &str, email: &str, phone: Option<&str>) -> NewPrincipal {
        NewPrincipal {
            username: username.into(),
            email: email.into(),
            phone: phone.map(Into::into),
            date_of_birth: None,
            role: Role::User,
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn insert_enforces_unique_email() {
        let store = MemoryAccountStore::new();
        store.insert(new_principal("alice", "a@x.com", None)).await.unwrap();
        let err = store
            .insert(new_principal("bob", "a@x.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(UniqueKey::Email)));
    }

    #[tokio::test]
    async fn missing_phones_never_collide() {
        let store = MemoryAccountStore::new();
        store.insert(new_principal("alice", "a@x.com", None)).await.unwrap();
        store.insert(new_principal("bob", "b@x.com", None)).await.unwrap();
    }

    #[tokio::test]
    async fn update_rejects_taken_username_and_keeps_row() {
        let store = MemoryAccountStore::new();
        store.insert(new_principal("alice", "a@x.com", None)).await.unwrap();
        let bob = store.insert(new_principal("bob", "b@x.com", None)).await.unwrap();

        let err = store
            .update_by_id(
                bob.id,
                PrincipalChanges {
                    username: Some("alice".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(UniqueKey::Username)));
        let stored = store.find_by_id(bob.id).await.unwrap().unwrap();
        assert_eq!(stored.username, "bob");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = MemoryAccountStore::new();
        let err = store
            .update_by_id(Uuid::new_v4(), PrincipalChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
