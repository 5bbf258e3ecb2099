//! User preferences (favorites and star ratings) over a small key-value store.

use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

pub const FAVORITES_KEY: &str = "recipe-favorites";
pub const RATINGS_KEY: &str = "recipe-ratings";

/// JSON values by string key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    /// Replaces the value at `key` with `f(current)` as one atomic step.
    fn update(&self, key: &str, f: impl FnOnce(Option<Value>) -> Value);
}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value);
    }

    fn update(&self, key: &str, f: impl FnOnce(Option<Value>) -> Value) {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = f(entries.remove(key));
        entries.insert(key.to_string(), next);
    }
}

fn decode_or_default<T: serde::de::DeserializeOwned + Default>(value: Option<Value>) -> T {
    value
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

/// Favorites are an ordered id list; ratings map id to 1..=5 stars.
/// Stored values that fail to decode read as empty.
#[derive(Debug, Default)]
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn favorites(&self) -> Vec<u32> {
        decode_or_default(self.store.get(FAVORITES_KEY))
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.favorites().contains(&id)
    }

    /// Adds or removes `id`, returning whether it is now a favorite.
    pub fn toggle_favorite(&self, id: u32) -> bool {
        let mut now_favorite = false;
        self.store.update(FAVORITES_KEY, |current| {
            let mut favorites: Vec<u32> = decode_or_default(current);
            match favorites.iter().position(|&f| f == id) {
                Some(index) => {
                    favorites.remove(index);
                }
                None => {
                    favorites.push(id);
                    now_favorite = true;
                }
            }
            json!(favorites)
        });
        now_favorite
    }

    pub fn rating(&self, id: u32) -> Option<u8> {
        let ratings: BTreeMap<String, u8> = decode_or_default(self.store.get(RATINGS_KEY));
        ratings.get(&id.to_string()).copied()
    }

    /// Records a rating; last write wins. Returns `false` (and stores nothing)
    /// when `stars` is outside 1..=5.
    pub fn rate(&self, id: u32, stars: u8) -> bool {
        if !(1..=5).contains(&stars) {
            return false;
        }
        self.store.update(RATINGS_KEY, |current| {
            let mut ratings: BTreeMap<String, u8> = decode_or_default(current);
            ratings.insert(id.to_string(), stars);
            json!(ratings)
        });
        true
    }
}
