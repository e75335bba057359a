//! Weighted prompts
//!
//! The prompt set is owned by the UI; the controller only ever sees a copy.
//! What goes upstream is the [`WeightedPrompt`] snapshot: every prompt with a
//! positive weight whose text the remote service has not filtered.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::{Error, Result};

/// Upper bound for prompt weights
pub const MAX_WEIGHT: f32 = 2.0;

/// Stable prompt identifier, assigned at creation and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PromptId(pub u64);

impl std::fmt::Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "prompt-{}", self.0)
    }
}

/// A user prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Stable identifier
    pub id: PromptId,
    /// Display text, also the semantic key sent upstream
    pub text: String,
    /// Influence in [0, 2]; 0 means inactive
    pub weight: f32,
    /// Display-only color
    pub color: String,
}

impl Prompt {
    /// Whether this prompt is sent upstream (filtering aside)
    pub fn is_active(&self) -> bool {
        self.weight > 0.0
    }
}

/// One entry of the list sent to the remote model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPrompt {
    /// Prompt text
    pub text: String,
    /// Prompt weight
    pub weight: f32,
}

/// Ordered mapping of prompt id → prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "StoredPromptSet", try_from = "StoredPromptSet")]
pub struct PromptSet {
    prompts: BTreeMap<PromptId, Prompt>,
    next_id: u64,
}

impl PromptSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prompt at weight 0 and return its id
    pub fn add(&mut self, text: impl Into<String>, color: impl Into<String>) -> PromptId {
        self.add_weighted(text, 0.0, color)
    }

    /// Add a prompt with an initial weight and return its id
    pub fn add_weighted(
        &mut self,
        text: impl Into<String>,
        weight: f32,
        color: impl Into<String>,
    ) -> PromptId {
        let id = PromptId(self.next_id);
        self.next_id += 1;
        self.prompts.insert(
            id,
            Prompt {
                id,
                text: text.into(),
                weight: clamp_weight(weight),
                color: color.into(),
            },
        );
        id
    }

    /// Remove a prompt; its id is not handed out again
    pub fn remove(&mut self, id: PromptId) -> Option<Prompt> {
        self.prompts.remove(&id)
    }

    /// Set a prompt's weight, clamped to [0, 2]
    ///
    /// Returns false if the id is unknown.
    pub fn set_weight(&mut self, id: PromptId, weight: f32) -> bool {
        match self.prompts.get_mut(&id) {
            Some(prompt) => {
                prompt.weight = clamp_weight(weight);
                true
            }
            None => false,
        }
    }

    /// Replace a prompt's text
    ///
    /// Returns false if the id is unknown.
    pub fn set_text(&mut self, id: PromptId, text: impl Into<String>) -> bool {
        match self.prompts.get_mut(&id) {
            Some(prompt) => {
                prompt.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Look up a prompt
    pub fn get(&self, id: PromptId) -> Option<&Prompt> {
        self.prompts.get(&id)
    }

    /// Prompts in id order
    pub fn iter(&self) -> impl Iterator<Item = &Prompt> {
        self.prompts.values()
    }

    /// Number of prompts
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Texts of prompts with a positive weight
    pub fn active_texts(&self) -> HashSet<&str> {
        self.iter()
            .filter(|p| p.is_active())
            .map(|p| p.text.as_str())
            .collect()
    }

    /// The list to send upstream: active and not filtered
    pub fn active_snapshot(&self, filtered: &FilteredSet) -> Vec<WeightedPrompt> {
        self.iter()
            .filter(|p| p.is_active() && !filtered.contains(&p.text))
            .map(|p| WeightedPrompt {
                text: p.text.clone(),
                weight: p.weight,
            })
            .collect()
    }

    /// Serialize for the persistence collaborator
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a set saved with [`to_json`](Self::to_json)
    ///
    /// Weights are re-clamped and the id counter is moved past every stored id.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Persisted shape of a [`PromptSet`]
#[derive(Serialize, Deserialize)]
struct StoredPromptSet {
    prompts: Vec<Prompt>,
    #[serde(default)]
    next_id: u64,
}

impl From<PromptSet> for StoredPromptSet {
    fn from(set: PromptSet) -> Self {
        Self {
            prompts: set.prompts.into_values().collect(),
            next_id: set.next_id,
        }
    }
}

impl TryFrom<StoredPromptSet> for PromptSet {
    type Error = String;

    fn try_from(stored: StoredPromptSet) -> std::result::Result<Self, Self::Error> {
        let mut prompts = BTreeMap::new();
        for mut prompt in stored.prompts {
            prompt.weight = clamp_weight(prompt.weight);
            let id = prompt.id;
            if prompts.insert(id, prompt).is_some() {
                return Err(format!("duplicate prompt id {}", id));
            }
        }
        let past_last = prompts.keys().map(|id| id.0 + 1).max().unwrap_or(0);
        Ok(Self {
            prompts,
            next_id: stored.next_id.max(past_last),
        })
    }
}

fn clamp_weight(weight: f32) -> f32 {
    if weight.is_nan() {
        return 0.0;
    }
    weight.clamp(0.0, MAX_WEIGHT)
}

/// Prompt texts rejected by the remote service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredSet {
    texts: HashSet<String>,
}

impl FilteredSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a filtered text; returns false if it was already present
    pub fn insert(&mut self, text: impl Into<String>) -> bool {
        self.texts.insert(text.into())
    }

    /// Whether a text is filtered
    pub fn contains(&self, text: &str) -> bool {
        self.texts.contains(text)
    }

    /// Forget texts that are no longer active in `prompts`
    ///
    /// A prompt whose weight dropped to 0 or whose text changed gets a fresh
    /// chance the next time it becomes active.
    pub fn retain_active(&mut self, prompts: &PromptSet) {
        let active = prompts.active_texts();
        self.texts.retain(|text| active.contains(text.as_str()));
    }

    /// Number of filtered texts
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Check if nothing is filtered
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Filtered texts
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.texts.iter().map(String::as_str)
    }
}

/// One entry of the default prompt library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPrompt {
    /// Prompt text
    pub text: String,
    /// Display color
    pub color: String,
}

/// Default prompts, loaded once before the controller starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptLibrary {
    prompts: Vec<DefaultPrompt>,
}

const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    ("Bossa Nova", "#9900ff"),
    ("Chillwave", "#5200ff"),
    ("Drum and Bass", "#ff25f6"),
    ("Post Punk", "#2af6de"),
    ("Shoegaze", "#ffdd28"),
    ("Funk", "#2af6de"),
    ("Chiptune", "#9900ff"),
    ("Lush Strings", "#3dffab"),
    ("Sparkling Arpeggios", "#d8ff3e"),
    ("Staccato Rhythms", "#d9b2ff"),
    ("Punchy Kick", "#3dffab"),
    ("Dubstep", "#ffdd28"),
    ("K Pop", "#ff25f6"),
    ("Neo Soul", "#d8ff3e"),
    ("Trip Hop", "#5200ff"),
    ("Thrash", "#d9b2ff"),
];

impl PromptLibrary {
    /// Library from explicit entries
    pub fn new(prompts: Vec<DefaultPrompt>) -> Self {
        Self { prompts }
    }

    /// The built-in sixteen prompts
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_PROMPTS
                .iter()
                .map(|(text, color)| DefaultPrompt {
                    text: (*text).to_string(),
                    color: (*color).to_string(),
                })
                .collect(),
        )
    }

    /// Parse a JSON array of `{text, color}` entries
    pub fn from_json(json: &str) -> Result<Self> {
        let prompts: Vec<DefaultPrompt> = serde_json::from_str(json)?;
        if prompts.is_empty() {
            return Err(Error::Config("Prompt library is empty".to_string()));
        }
        Ok(Self::new(prompts))
    }

    /// Load a JSON prompt library from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Library entries
    pub fn entries(&self) -> &[DefaultPrompt] {
        &self.prompts
    }

    /// Build the initial prompt set
    ///
    /// Every entry becomes a prompt; `active_count` of them, picked at random,
    /// start at weight 1.0 and the rest at 0.
    pub fn build_prompt_set<R: Rng + ?Sized>(&self, active_count: usize, rng: &mut R) -> PromptSet {
        let active: HashSet<usize> = (0..self.prompts.len())
            .collect::<Vec<_>>()
            .choose_multiple(rng, active_count)
            .copied()
            .collect();

        let mut set = PromptSet::new();
        for (index, entry) in self.prompts.iter().enumerate() {
            let weight = if active.contains(&index) { 1.0 } else { 0.0 };
            set.add_weighted(entry.text.clone(), weight, entry.color.clone());
        }
        set
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
