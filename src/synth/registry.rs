//! Genre registry
//!
//! Maps genre strings to synthesis variants. Adding a genre means adding a
//! `Genre` variant and one `register` call; callers never change.

use std::collections::HashMap;

use super::Genre;
use crate::error::{Result, SonoraError};

/// Lookup table from genre name to synthesizer
#[derive(Debug, Clone)]
pub struct SynthesizerRegistry {
    genres: HashMap<String, Genre>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl SynthesizerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            genres: HashMap::new(),
        }
    }

    /// Create registry with every built-in genre under its canonical id
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for genre in Genre::ALL {
            registry.register(genre.id(), genre);
        }
        registry
    }

    /// Register `genre` under `name` (case-insensitive), replacing any
    /// previous entry
    pub fn register(&mut self, name: &str, genre: Genre) {
        self.genres.insert(normalize(name), genre);
    }

    /// Resolve a requested genre string
    pub fn resolve(&self, name: &str) -> Result<Genre> {
        self.genres
            .get(&normalize(name))
            .copied()
            .ok_or_else(|| SonoraError::UnsupportedGenre {
                genre: name.to_string(),
            })
    }

    /// Check if a genre name is registered
    pub fn has_genre(&self, name: &str) -> bool {
        self.genres.contains_key(&normalize(name))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.genres.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SynthesizerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
