use tracing::warn;

use super::repo::AccountStore;
use super::repo_types::{IdentityFilter, Principal};
use crate::db::UniqueKey;
use crate::error::{AppError, AppResult};

/// Another principal already holding one of the supplied identity values.
///
/// Only fields present in `candidate` are compared, and `candidate.exclude_id`
/// never counts as a conflict. Values are compared exactly as given.
pub async fn find_conflict(
    accounts: &dyn AccountStore,
    candidate: &IdentityFilter<'_>,
) -> AppResult<Option<Principal>> {
    if candidate.is_empty() {
        return Ok(None);
    }
    Ok(accounts.find_one(candidate).await?)
}

/// Fails with [`AppError::Conflict`] naming the first field that collides.
pub async fn ensure_available(
    accounts: &dyn AccountStore,
    candidate: &IdentityFilter<'_>,
) -> AppResult<()> {
    match find_conflict(accounts, candidate).await? {
        None => Ok(()),
        Some(existing) => {
            let key = conflicting_key(candidate, &existing);
            warn!(field = %key, holder = %existing.id, "identity value already taken");
            Err(AppError::Conflict(key))
        }
    }
}

fn conflicting_key(candidate: &IdentityFilter<'_>, existing: &Principal) -> UniqueKey {
    if candidate.username == Some(existing.username.as_str()) {
        UniqueKey::Username
    } else if candidate.email == Some(existing.email.as_str()) {
        UniqueKey::Email
    } else {
        UniqueKey::Phone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{memory::MemoryAccountStore, NewPrincipal, Role};

    async fn seeded() -> (MemoryAccountStore, Principal, Principal) {
        let store = MemoryAccountStore::new();
        let alice = store
            .insert(NewPrincipal {
                username: "alice".into(),
                email: "a@x.com".into(),
                phone: Some("0901".into()),
                date_of_birth: None,
                role: Role::User,
                password_hash: "h".into(),
            })
            .await
            .unwrap();
        let bob = store
            .insert(NewPrincipal {
                username: "bob".into(),
                email: "b@x.com".into(),
                phone: None,
                date_of_birth: None,
                role: Role::Pt,
                password_hash: "h".into(),
            })
            .await
            .unwrap();
        (store, alice, bob)
    }

    #[tokio::test]
    async fn reports_holder_of_taken_email() {
        let (store, alice, _) = seeded().await;
        let found = find_conflict(&store, &IdentityFilter::by_email("a@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, alice.id);
    }

    #[tokio::test]
    async fn self_match_is_not_a_conflict() {
        let (store, alice, _) = seeded().await;
        let candidate = IdentityFilter {
            username: Some("alice"),
            email: Some("a@x.com"),
            phone: Some("0901"),
            exclude_id: None,
        }
        .excluding(alice.id);
        assert!(find_conflict(&store, &candidate).await.unwrap().is_none());
        ensure_available(&store, &candidate).await.unwrap();
    }

    #[tokio::test]
    async fn absent_fields_are_not_checked() {
        let (store, _, bob) = seeded().await;
        // bob changes only his phone; his username matching alice's is not supplied
        let candidate = IdentityFilter {
            phone: Some("0999"),
            ..Default::default()
        }
        .excluding(bob.id);
        assert!(find_conflict(&store, &candidate).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conflict_names_the_colliding_field() {
        let (store, _, bob) = seeded().await;
        let candidate = IdentityFilter {
            username: Some("bobby"),
            phone: Some("0901"),
            ..Default::default()
        }
        .excluding(bob.id);
        let err = ensure_available(&store, &candidate).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(UniqueKey::Phone)));
    }

    #[tokio::test]
    async fn no_exact_match_without_normalization() {
        let (store, _, _) = seeded().await;
        let candidate = IdentityFilter::by_email("A@X.COM");
        assert!(find_conflict(&store, &candidate).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_candidate_never_conflicts() {
        let (store, _, _) = seeded().await;
        assert!(find_conflict(&store, &IdentityFilter::default())
            .await
            .unwrap()
            .is_none());
    }
}
