//! Delta storage for blob versions
//!
//! A new version of a file is stored either in full or as a patch against the
//! previous version of the same path. The choice is made by [`DeltaEngine::plan`]:
//!
//! - no previous version, or the previous one is the same blob: full copy
//! - the two versions classify differently (text vs. binary): full copy
//! - the sizes differ by more than `max_size_ratio`, or either is empty: full copy
//! - the previous version already sits `max_chain_depth` patches away from a
//!   full copy: full copy
//! - the patch is not smaller than the content: full copy
//! - otherwise: a patch produced by the [`PatchStrategy`] registered for the
//!   content kind
//!
//! Blob ids always hash the full content, so a version reached through a
//! chain and the same bytes stored in full are the same object.
//!
//! - `classifier`: text/binary classification
//! - `text_patch`: line patches built from Myers' diff
//! - `binary_patch`: copy/insert block deltas
//! - `record`: on-disk form of a patched version

pub mod binary_patch;
pub mod classifier;
pub mod record;
pub mod text_patch;

use crate::areas::config::DeltaConfig;
use crate::areas::database::Database;
use crate::artifacts::delta::binary_patch::BinaryPatch;
use crate::artifacts::delta::classifier::{ContentClassifier, ContentKind, DefaultClassifier};
use crate::artifacts::delta::record::DeltaRecord;
use crate::artifacts::delta::text_patch::TextPatch;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GibleError;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::io::Read;

/// Hard bound on the links followed while materializing, whatever the config says
pub const MAX_CHAIN_TRAVERSAL: usize = 1024;

pub trait PatchStrategy: Debug + Send + Sync {
    /// Patch turning `base` into `target`
    fn diff(&self, base: &[u8], target: &[u8]) -> anyhow::Result<Bytes>;

    /// Replay `patch` on `base`; fails if the patch does not fit the base
    fn apply(&self, base: &[u8], patch: &[u8]) -> anyhow::Result<Bytes>;
}

/// How a blob ended up in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageDecision {
    /// The content was already stored; nothing was written
    Deduplicated,
    Full,
    Delta { base: ObjectId, depth: u32 },
}

/// Previous version of a path, the candidate base for a patch
#[derive(Debug, Clone, Copy)]
pub struct PriorVersion<'c> {
    pub oid: &'c ObjectId,
    pub content: &'c [u8],
    pub depth: u32,
}

#[derive(Debug)]
pub struct DeltaEngine {
    classifier: Box<dyn ContentClassifier>,
    strategies: HashMap<ContentKind, Box<dyn PatchStrategy>>,
    max_chain_depth: u32,
    max_size_ratio: f64,
}

impl DeltaEngine {
    pub fn new(config: &DeltaConfig) -> Self {
        let mut strategies: HashMap<ContentKind, Box<dyn PatchStrategy>> = HashMap::new();
        strategies.insert(ContentKind::Text, Box::new(TextPatch));
        strategies.insert(ContentKind::Binary, Box::new(BinaryPatch));

        DeltaEngine {
            classifier: Box::new(DefaultClassifier),
            strategies,
            max_chain_depth: config.max_chain_depth,
            max_size_ratio: config.max_size_ratio,
        }
    }

    pub fn with_classifier(mut self, classifier: impl ContentClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn register_strategy(&mut self, kind: ContentKind, strategy: Box<dyn PatchStrategy>) {
        self.strategies.insert(kind, strategy);
    }

    pub fn classify(&self, content: &[u8]) -> ContentKind {
        self.classifier.classify(content)
    }

    pub fn max_chain_depth(&self) -> u32 {
        self.max_chain_depth
    }

    fn strategy(&self, kind: ContentKind) -> anyhow::Result<&dyn PatchStrategy> {
        self.strategies
            .get(&kind)
            .map(|strategy| strategy.as_ref())
            .ok_or_else(|| anyhow::anyhow!("no patch strategy registered for {} content", kind))
    }

    /// Decide how `content` is stored given the previous version of its path;
    /// `None` means a full copy.
    pub fn plan(&self, prior: Option<PriorVersion<'_>>, content: &[u8]) -> anyhow::Result<Option<DeltaRecord>> {
        let Some(prior) = prior else {
            return Ok(None);
        };

        if prior.depth + 1 > self.max_chain_depth {
            tracing::debug!(base = %prior.oid, depth = prior.depth, "chain at its cap, storing full copy");
            return Ok(None);
        }

        let kind = self.classify(content);
        if kind != self.classify(prior.content) {
            tracing::debug!(base = %prior.oid, "content kind changed, storing full copy");
            return Ok(None);
        }

        let (smaller, larger) = if prior.content.len() < content.len() {
            (prior.content.len(), content.len())
        } else {
            (content.len(), prior.content.len())
        };
        if smaller == 0 || larger as f64 / smaller as f64 > self.max_size_ratio {
            tracing::debug!(base = %prior.oid, smaller, larger, "size ratio out of bounds, storing full copy");
            return Ok(None);
        }

        let patch = self.strategy(kind)?.diff(prior.content, content)?;
        if patch.len() >= content.len() {
            tracing::debug!(base = %prior.oid, patch = patch.len(), "patch not smaller than content, storing full copy");
            return Ok(None);
        }

        Ok(Some(DeltaRecord::new(prior.oid.clone(), prior.depth + 1, kind, patch)))
    }

    /// Store a new blob version, as a patch against `prior` when worthwhile
    pub fn store_blob(
        &self,
        database: &Database,
        content: Bytes,
        prior: Option<&ObjectId>,
    ) -> anyhow::Result<(ObjectId, StorageDecision)> {
        let blob = Blob::new(content);
        let oid = blob.object_id()?;

        if database.contains(&oid) {
            tracing::debug!(%oid, "blob already stored");
            return Ok((oid, StorageDecision::Deduplicated));
        }

        // a prior version that cannot be read back aborts the store
        let record = match prior {
            Some(prior_oid) => {
                let (prior_content, depth) = self.load_prior(database, prior_oid)?;
                let prior = PriorVersion {
                    oid: prior_oid,
                    content: &prior_content,
                    depth,
                };
                self.plan(Some(prior), blob.content())?
            }
            None => None,
        };

        match record {
            Some(record) => {
                database.store_raw(&oid, record.serialize()?)?;
                tracing::debug!(%oid, base = %record.base, depth = record.depth, kind = %record.kind, "stored blob as delta");

                Ok((
                    oid,
                    StorageDecision::Delta {
                        base: record.base,
                        depth: record.depth,
                    },
                ))
            }
            None => {
                database.store_raw(&oid, blob.serialize()?)?;
                tracing::debug!(%oid, "stored full blob");

                Ok((oid, StorageDecision::Full))
            }
        }
    }

    fn load_prior(&self, database: &Database, oid: &ObjectId) -> anyhow::Result<(Bytes, u32)> {
        Ok((self.materialize(database, oid)?, self.chain_depth(database, oid)?))
    }

    /// Patches between `oid` and the nearest full copy, 0 for a full blob
    pub fn chain_depth(&self, database: &Database, oid: &ObjectId) -> anyhow::Result<u32> {
        let (object_type, reader) = database.parse_object_as_bytes(oid)?;

        match object_type {
            ObjectType::Blob => Ok(0),
            ObjectType::Delta => Ok(DeltaRecord::deserialize(reader)?.depth),
            other => anyhow::bail!("object {} is a {}, not a blob", oid, other),
        }
    }

    /// Reconstruct the full content of a blob, replaying its patch chain
    pub fn materialize(&self, database: &Database, oid: &ObjectId) -> anyhow::Result<Bytes> {
        let corrupt = |reason: String| GibleError::CorruptChain {
            oid: oid.clone(),
            reason,
        };

        // newest first
        let mut chain: Vec<DeltaRecord> = Vec::new();
        let mut current = oid.clone();

        let mut content = loop {
            if chain.len() > MAX_CHAIN_TRAVERSAL {
                return Err(corrupt(format!("chain longer than {MAX_CHAIN_TRAVERSAL} links")).into());
            }

            let parsed = database.parse_object_as_bytes(&current);
            let (object_type, mut reader) = match parsed {
                Ok(parsed) => parsed,
                Err(error) if chain.is_empty() => return Err(error),
                Err(error) => return Err(corrupt(format!("base {current} unreadable: {error:#}")).into()),
            };

            match object_type {
                ObjectType::Blob => {
                    let mut content = Vec::new();
                    reader.read_to_end(&mut content)?;
                    if let Some(oldest) = chain.last()
                        && oldest.depth != 1
                    {
                        return Err(corrupt(format!(
                            "full copy {current} reached at depth {}",
                            oldest.depth
                        ))
                        .into());
                    }
                    break Bytes::from(content);
                }
                ObjectType::Delta => {
                    let record = DeltaRecord::deserialize(reader)
                        .map_err(|error| corrupt(format!("undecodable delta {current}: {error:#}")))?;
                    if let Some(newer) = chain.last()
                        && newer.depth != record.depth + 1
                    {
                        return Err(corrupt(format!(
                            "depth {} follows depth {}",
                            record.depth, newer.depth
                        ))
                        .into());
                    }
                    tracing::trace!(link = %current, base = %record.base, depth = record.depth, "following delta link");
                    current = record.base.clone();
                    chain.push(record);
                }
                other => {
                    return Err(corrupt(format!("{current} is a {other}, not a blob")).into());
                }
            }
        };

        for record in chain.iter().rev() {
            content = self
                .strategy(record.kind)?
                .apply(&content, &record.patch)
                .map_err(|error| corrupt(format!("patch against {} failed: {error:#}", record.base)))?;
        }

        let actual = Blob::new(content.clone()).object_id()?;
        if &actual != oid {
            return Err(corrupt(format!("content hashes to {actual}")).into());
        }

        Ok(content)
    }
}
