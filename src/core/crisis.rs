// crisis detection - keyword scan over the latest user turn
// blunt on purpose: substring match, so it over-triggers rather than misses

use crate::Error;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisCategory {
    SuicidalIdeation,
    SelfHarm,
    DesireToDie,
}

impl CrisisCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuicidalIdeation => "suicidal_ideation",
            Self::SelfHarm => "self_harm",
            Self::DesireToDie => "desire_to_die",
        }
    }
}

// default phrase list, spanish
const DEFAULT_PHRASES: &[(&str, CrisisCategory)] = &[
    ("suicid", CrisisCategory::SuicidalIdeation),
    ("quitarme la vida", CrisisCategory::SuicidalIdeation),
    ("acabar con mi vida", CrisisCategory::SuicidalIdeation),
    ("terminar con mi vida", CrisisCategory::SuicidalIdeation),
    ("matarme", CrisisCategory::SuicidalIdeation),
    ("me voy a matar", CrisisCategory::SuicidalIdeation),
    ("lastimarme", CrisisCategory::SelfHarm),
    ("hacerme daño", CrisisCategory::SelfHarm),
    ("cortarme", CrisisCategory::SelfHarm),
    ("autolesion", CrisisCategory::SelfHarm),
    ("autolesión", CrisisCategory::SelfHarm),
    ("no quiero vivir", CrisisCategory::DesireToDie),
    ("quiero morir", CrisisCategory::DesireToDie),
    ("quiero morirme", CrisisCategory::DesireToDie),
    ("ya no quiero estar aquí", CrisisCategory::DesireToDie),
    ("no vale la pena vivir", CrisisCategory::DesireToDie),
];

pub struct CrisisDetector {
    // stored lower-cased
    phrases: Vec<(String, CrisisCategory)>,
}

impl CrisisDetector {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = (S, CrisisCategory)>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|(p, c)| (p.as_ref().trim().to_lowercase(), c))
            .filter(|(p, _)| !p.is_empty())
            .collect();

        Self { phrases }
    }

    /// Loads a `{ "phrase": "category" }` json file as the phrase list.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("can't read {}: {e}", path.display())))?;
        let map: BTreeMap<String, CrisisCategory> = serde_json::from_str(&raw)?;

        let detector = Self::new(map);
        if detector.is_empty() {
            return Err(Error::Config(format!(
                "{} has no usable phrases",
                path.display()
            )));
        }

        Ok(detector)
    }

    pub fn detect(&self, utterance: &str) -> Option<CrisisCategory> {
        if utterance.is_empty() {
            return None;
        }

        let folded = utterance.to_lowercase();
        self.phrases
            .iter()
            .find(|(phrase, _)| folded.contains(phrase.as_str()))
            .map(|(_, category)| *category)
    }

    pub fn classify(&self, utterance: &str) -> bool {
        self.detect(utterance).is_some()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PHRASES.iter().copied())
    }
}
