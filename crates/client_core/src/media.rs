use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError, Weak},
};

use uuid::Uuid;

pub const DEFAULT_PROFILE_PICTURE: &str = "assets/default-profile.png";
const OBJECT_URL_PREFIX: &str = "blob:cyberhire/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl Blob {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

type Entries = Mutex<HashMap<String, Arc<Blob>>>;

#[derive(Clone, Default)]
pub struct ObjectUrlRegistry {
    entries: Arc<Entries>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, blob: Blob) -> ObjectUrl {
        let url = format!("{OBJECT_URL_PREFIX}{}", Uuid::new_v4());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), Arc::new(blob));
        ObjectUrl {
            inner: Arc::new(ObjectUrlInner {
                url,
                entries: Arc::downgrade(&self.entries),
            }),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<Blob>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn live_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for ObjectUrlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

struct ObjectUrlInner {
    url: String,
    entries: Weak<Entries>,
}

impl Drop for ObjectUrlInner {
    fn drop(&mut self) {
        if let Some(entries) = self.entries.upgrade() {
            entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.url);
        }
    }
}

#[derive(Clone)]
pub struct ObjectUrl {
    inner: Arc<ObjectUrlInner>,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.inner.url
    }
}

impl PartialEq for ObjectUrl {
    fn eq(&self, other: &Self) -> bool {
        self.inner.url == other.inner.url
    }
}

impl Eq for ObjectUrl {}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.inner.url).finish()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PictureRef {
    Placeholder(String),
    Object(ObjectUrl),
}

impl PictureRef {
    pub fn as_str(&self) -> &str {
        match self {
            PictureRef::Placeholder(path) => path,
            PictureRef::Object(url) => url.as_str(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PictureRef::Placeholder(_))
    }
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
