use bytes::Bytes;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::accounts::{Principal, PrincipalChanges};
use crate::db::StoreError;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Public prefix under which stored avatars are served.
const UPLOADS_PREFIX: &str = "/uploads";

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn validate(item: &UploadItem) -> AppResult<&'static str> {
    if item.body.is_empty() {
        return Err(AppError::validation("no file uploaded"));
    }
    if item.body.len() > MAX_AVATAR_BYTES {
        return Err(AppError::validation("file exceeds 5 MB"));
    }
    ext_from_mime(&item.content_type)
        .ok_or_else(|| AppError::validation("only jpeg, png and webp images are accepted"))
}

/// Stores the image and points the principal's `image` at it.
pub async fn upload_avatar(
    st: &AppState,
    principal_id: Uuid,
    item: UploadItem,
) -> AppResult<Principal> {
    let ext = validate(&item)?;
    let key = format!("avatars/{}/{}.{}", principal_id, Uuid::new_v4(), ext);

    st.storage
        .put_object(&key, item.body, &item.content_type)
        .await
        .map_err(|e| {
            error!(error = %format!("{e:#}"), %key, "avatar upload failed");
            AppError::StoreUnavailable("blob storage unavailable".into())
        })?;

    let changes = PrincipalChanges {
        image: Some(format!("{UPLOADS_PREFIX}/{key}")),
        ..Default::default()
    };
    match st.accounts.update_by_id(principal_id, changes).await {
        Ok(updated) => {
            info!(user_id = %principal_id, %key, "avatar updated");
            Ok(updated)
        }
        Err(e) => {
            // the object is orphaned otherwise
            if let Err(del) = st.storage.delete_object(&key).await {
                warn!(error = %format!("{del:#}"), %key, "orphaned avatar not removed");
            }
            Err(match e {
                StoreError::NotFound => AppError::NotFound("user"),
                other => other.into(),
            })
        }
    }
}

#[cfg(test)]
mod image_tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::accounts::{memory::MemoryAccountStore, AccountStore, NewPrincipal, Role};
    use crate::auth::JwtKeys;
    use crate::health::memory::MemoryHealthStore;
    use crate::storage::StorageClient;

    #[derive(Default)]
    struct RecordingStorage {
        puts: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StorageClient for RecordingStorage {
        async fn put_object(&self, k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            self.puts.lock().unwrap().push(k.to_string());
            Ok(())
        }
        async fn delete_object(&self, k: &str) -> anyhow::Result<()> {
            self.deletes.lock().unwrap().push(k.to_string());
            Ok(())
        }
    }

    fn state_with(storage: Arc<RecordingStorage>) -> (AppState, Arc<MemoryAccountStore>) {
        let accounts = Arc::new(MemoryAccountStore::new());
        let st = AppState::from_parts(
            accounts.clone(),
            Arc::new(MemoryHealthStore::new()),
            storage,
            JwtKeys::from_secret(b"img-secret"),
        );
        (st, accounts)
    }

    fn png(len: usize) -> UploadItem {
        UploadItem {
            body: Bytes::from(vec![0u8; len]),
            content_type: "image/png".into(),
        }
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), None);
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn oversized_and_empty_files_are_rejected() {
        assert!(matches!(validate(&png(0)), Err(AppError::Validation(_))));
        assert!(matches!(
            validate(&png(MAX_AVATAR_BYTES + 1)),
            Err(AppError::Validation(_))
        ));
        assert_eq!(validate(&png(MAX_AVATAR_BYTES)).unwrap(), "png");
    }

    #[tokio::test]
    async fn upload_links_stored_path_to_principal() {
        let storage = Arc::new(RecordingStorage::default());
        let (st, accounts) = state_with(storage.clone());
        let p = accounts
            .insert(NewPrincipal {
                username: "alice".into(),
                email: "a@x.com".into(),
                phone: None,
                date_of_birth: None,
                role: Role::User,
                password_hash: "h".into(),
            })
            .await
            .unwrap();

        let updated = upload_avatar(&st, p.id, png(16)).await.unwrap();
        let image = updated.image.unwrap();
        assert!(image.starts_with(&format!("/uploads/avatars/{}/", p.id)));
        assert!(image.ends_with(".png"));
        assert_eq!(storage.puts.lock().unwrap().len(), 1);
        assert!(storage.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_link_removes_uploaded_object() {
        let storage = Arc::new(RecordingStorage::default());
        let (st, _) = state_with(storage.clone());

        let err = upload_avatar(&st, Uuid::new_v4(), png(16)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("user")));
        let puts = storage.puts.lock().unwrap().clone();
        assert_eq!(*storage.deletes.lock().unwrap(), puts);
    }

    #[tokio::test]
    async fn rejected_type_never_reaches_storage() {
        let storage = Arc::new(RecordingStorage::default());
        let (st, _) = state_with(storage.clone());
        let gif = UploadItem {
            body: Bytes::from_static(b"GIF89a"),
            content_type: "image/gif".into(),
        };
        assert!(matches!(
            upload_avatar(&st, Uuid::new_v4(), gif).await,
            Err(AppError::Validation(_))
        ));
        assert!(storage.puts.lock().unwrap().is_empty());
    }
}
