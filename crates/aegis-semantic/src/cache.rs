//! TTL-bounded, size-bounded LRU cache of semantic lookup results.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;

use aegis_models::{PromptCacheEntry, SemanticDetection};

pub type CacheKey = (String, String);

/// Consulted by `SemanticTrigger` before submitting a job to the executor;
/// written only by the pipeline thread (workers never touch it directly).
#[derive(Debug)]
pub struct PromptManager {
    entries: HashMap<CacheKey, PromptCacheEntry>,
    order: VecDeque<CacheKey>,
    ttl_seconds: u64,
    max_size: usize,
}

impl PromptManager {
    pub fn new(ttl_seconds: u64, max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl_seconds,
            max_size,
        }
    }

    /// Fresh hit for `(prompt_text, image_hash)`, or `None` if absent/expired.
    /// An expired entry is evicted on lookup.
    pub fn get(&mut self, prompt_text: &str, image_hash: &str) -> Option<Vec<SemanticDetection>> {
        let key = (prompt_text.to_string(), image_hash.to_string());
        let expired = self
            .entries
            .get(&key)
            .map(|entry| self.is_expired(entry))
            .unwrap_or(false);
        if expired {
            self.remove(&key);
            return None;
        }

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.hits += 1;
            self.touch(&key);
            return Some(entry.detections.clone());
        }
        None
    }

    pub fn put(&mut self, prompt_text: &str, image_hash: &str, detections: Vec<SemanticDetection>) {
        let key = (prompt_text.to_string(), image_hash.to_string());
        let entry = PromptCacheEntry {
            prompt_text: prompt_text.to_string(),
            image_hash: image_hash.to_string(),
            detections,
            inserted_at: Utc::now(),
            hits: 0,
        };

        if !self.entries.contains_key(&key) {
            if self.entries.len() >= self.max_size {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
            self.order.push_back(key.clone());
        } else {
            self.touch(&key);
        }
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &PromptCacheEntry) -> bool {
        let age = Utc::now().signed_duration_since(entry.inserted_at);
        age.num_seconds() >= self.ttl_seconds as i64
    }

    fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    fn touch(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
        self.order.push_back(key.clone());
    }
}
