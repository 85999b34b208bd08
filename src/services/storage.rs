use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

/// Binary blob storage keyed by string. The catalog only ever needs
/// put/delete plus an existence probe for the health endpoint.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// S3-compatible backend (AWS, MinIO, R2).
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(service_error))
                }
            }
        }
    }
}

/// In-process backend for development and tests, selected with
/// `STORAGE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (String, Bytes)>>,
}

impl MemoryObjectStore {
    pub fn len(&self) -> usize {
        self.objects.lock().expect("storage lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.objects
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), (content_type.to_string(), data));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects
            .lock()
            .expect("storage lock poisoned")
            .remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self
            .objects
            .lock()
            .expect("storage lock poisoned")
            .contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_put_delete_cycle() {
        let store = MemoryObjectStore::default();
        store
            .put("uploads/a/b/c.jpg", Bytes::from_static(b"img"), "image/jpeg")
            .await
            .unwrap();
        assert!(store.exists("uploads/a/b/c.jpg").await.unwrap());
        assert_eq!(store.len(), 1);

        store.delete("uploads/a/b/c.jpg").await.unwrap();
        assert!(!store.exists("uploads/a/b/c.jpg").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn memory_store_delete_is_a_noop_for_unknown_keys() {
        let store = MemoryObjectStore::default();
        store.delete("uploads/missing.jpg").await.unwrap();
        assert!(store.is_empty());
    }
}
