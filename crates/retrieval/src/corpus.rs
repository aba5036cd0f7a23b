use crate::error::{Result, RetrievalError};
use sense_taxonomy::Modality;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const METAPHOR_CORPUS_SCHEMA_VERSION: u32 = 1;

/// One corpus document: a culturally-tagged alternative expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaphorDoc {
    pub id: String,
    pub text: String,
    pub modality: Modality,
    /// Cultural provenance tags, e.g. `culture:A`.
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MetaphorCorpus {
    docs: Vec<MetaphorDoc>,
}

#[derive(Serialize, Deserialize)]
struct PersistedCorpus {
    schema_version: u32,
    docs: Vec<MetaphorDoc>,
}

impl MetaphorCorpus {
    #[must_use]
    pub fn from_docs(docs: Vec<MetaphorDoc>) -> Self {
        Self { docs }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let persisted: PersistedCorpus = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != METAPHOR_CORPUS_SCHEMA_VERSION {
            return Err(RetrievalError::UnsupportedSchema {
                found: persisted.schema_version,
                expected: METAPHOR_CORPUS_SCHEMA_VERSION,
            });
        }
        Ok(Self {
            docs: persisted.docs,
        })
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedCorpus {
            schema_version: METAPHOR_CORPUS_SCHEMA_VERSION,
            docs: self.docs.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    #[must_use]
    pub fn docs(&self) -> &[MetaphorDoc] {
        &self.docs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Small built-in corpus for tests and the CLI demo.
    #[must_use]
    pub fn builtin() -> Self {
        fn doc(id: &str, text: &str, modality: Modality, tags: &[&str]) -> MetaphorDoc {
            MetaphorDoc {
                id: id.to_string(),
                text: text.to_string(),
                modality,
                tags: tags.iter().map(|t| (*t).to_string()).collect(),
            }
        }

        Self::from_docs(vec![
            doc(
                "tact-river-stones",
                "smooth as river stones",
                Modality::Tactile,
                &["culture:A"],
            ),
            doc(
                "tact-hearth",
                "warm as a hearth stone",
                Modality::Tactile,
                &["culture:A"],
            ),
            doc(
                "tact-silk",
                "soft as worn silk",
                Modality::Tactile,
                &["culture:jp", "culture:global"],
            ),
            doc(
                "vis-dawn",
                "bright as a winter dawn",
                Modality::Visual,
                &["culture:global"],
            ),
            doc(
                "aud-temple-bell",
                "clear as a temple bell",
                Modality::Auditory,
                &["culture:jp"],
            ),
            doc(
                "aud-rain",
                "steady as rain on a tin roof",
                Modality::Auditory,
                &["culture:mx", "culture:global"],
            ),
            doc(
                "olf-rain-earth",
                "like the smell of rain on dry earth",
                Modality::Olfactory,
                &["culture:mx"],
            ),
            doc(
                "gust-mango",
                "sweet as ripe mango",
                Modality::Gustatory,
                &["culture:mx"],
            ),
            doc(
                "kin-leaf",
                "drifting like a falling leaf",
                Modality::Kinesthetic,
                &["culture:jp", "culture:global"],
            ),
        ])
    }
}
