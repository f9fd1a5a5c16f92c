//! Non-blocking image resolution
//!
//! Images load asynchronously on the host. The cache asks the provider once per
//! key, polls on every resolve, and hands back a placeholder until the image is
//! ready. A key that fails stays a placeholder for the rest of the session and
//! is only reported once.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::settings::SleighVariant;
use crate::sim::object::ObjectKind;

/// Host-side identifier of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Ready(ImageHandle),
    Failed(String),
}

/// Host image loader
pub trait AssetProvider {
    /// Start loading `key`; called at most once per key
    fn request(&mut self, key: &str);

    fn poll(&mut self, key: &str) -> AssetStatus;
}

/// What to draw for an asset key this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drawable {
    Image(ImageHandle),
    Placeholder,
}

pub const BOSS_KEY: &str = "boss";

/// Every key the drawing pass may resolve
pub fn asset_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = ObjectKind::ALL.iter().map(|kind| kind.as_str()).collect();
    keys.extend(SleighVariant::ALL.iter().map(|variant| variant.as_str()));
    keys.push(BOSS_KEY);
    keys
}

pub struct AssetCache {
    provider: Box<dyn AssetProvider>,
    /// `None` marks a key that failed to load
    resolved: HashMap<String, Option<ImageHandle>>,
    requested: HashSet<String>,
    warned_failed_keys: HashSet<String>,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("resolved", &self.resolved)
            .field("requested", &self.requested.len())
            .finish()
    }
}

impl AssetCache {
    pub fn new(provider: impl AssetProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            resolved: HashMap::new(),
            requested: HashSet::new(),
            warned_failed_keys: HashSet::new(),
        }
    }

    /// Request every key up front so the first frames resolve sooner
    pub fn preload<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) {
        for key in keys {
            self.request_once(key);
        }
    }

    pub fn resolve(&mut self, key: &str) -> Drawable {
        if let Some(entry) = self.resolved.get(key) {
            return entry.map_or(Drawable::Placeholder, Drawable::Image);
        }
        self.request_once(key);

        match self.provider.poll(key) {
            AssetStatus::Pending => Drawable::Placeholder,
            AssetStatus::Ready(handle) => {
                log::debug!("Asset ready: {}", key);
                self.resolved.insert(key.to_owned(), Some(handle));
                Drawable::Image(handle)
            }
            AssetStatus::Failed(reason) => {
                if self.warned_failed_keys.insert(key.to_owned()) {
                    log::warn!("Asset '{}' failed to load ({}), drawing placeholder", key, reason);
                }
                self.resolved.insert(key.to_owned(), None);
                Drawable::Placeholder
            }
        }
    }

    pub fn is_ready(&self, key: &str) -> bool {
        matches!(self.resolved.get(key), Some(Some(_)))
    }

    pub fn is_failed(&self, key: &str) -> bool {
        matches!(self.resolved.get(key), Some(None))
    }

    /// Keys still waiting on the provider
    pub fn pending_count(&self) -> usize {
        self.requested
            .iter()
            .filter(|key| !self.resolved.contains_key(key.as_str()))
            .count()
    }

    fn request_once(&mut self, key: &str) {
        if self.requested.insert(key.to_owned()) {
            self.provider.request(key);
        }
    }
}

/// Provider backed by a fixed key → handle table
///
/// Keys outside the table fail. Used by headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAssets {
    handles: HashMap<String, ImageHandle>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known key, numbered in `asset_keys` order
    pub fn complete() -> Self {
        let mut assets = Self::new();
        for (index, key) in asset_keys().into_iter().enumerate() {
            assets.insert(key, ImageHandle(index as u32));
        }
        assets
    }

    pub fn insert(&mut self, key: &str, handle: ImageHandle) {
        self.handles.insert(key.to_owned(), handle);
    }
}

impl AssetProvider for StaticAssets {
    fn request(&mut self, _key: &str) {}

    fn poll(&mut self, key: &str) -> AssetStatus {
        match self.handles.get(key) {
            Some(&handle) => AssetStatus::Ready(handle),
            None => AssetStatus::Failed(format!("no image registered for '{key}'")),
        }
    }
}
