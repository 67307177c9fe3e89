use crate::areas::commits::CommitGraph;
use crate::areas::refs::{HEAD_REF_NAME, Refs};
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, HEAD_ALIAS, PARENT_REGEX};
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GibleError;
use anyhow::Context;

/// Shortest abbreviated commit id accepted
pub const MIN_PREFIX_LENGTH: usize = 4;

/// A way of naming a commit.
///
/// Supported formats:
/// - `HEAD` or its alias `@`: the active branch's commit
/// - Branch names: `master`, `feature/login`
/// - Full or abbreviated commit ids (at least 4 hex characters), used when no
///   branch has that name
/// - Parent notation: `<revision>^`
/// - Ancestor notation: `<revision>~<n>`, following first parents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Head,
    /// A branch name or a commit id prefix, decided at resolution time
    Name(String),
    Parent(Box<Revision>),
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        let parent_regex = regex::Regex::new(PARENT_REGEX)
            .with_context(|| format!("invalid parent regex: {PARENT_REGEX}"))?;
        let ancestor_regex = regex::Regex::new(ANCESTOR_REGEX)
            .with_context(|| format!("invalid ancestor regex: {ANCESTOR_REGEX}"))?;

        if let Some(caps) = parent_regex.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;
            Ok(Revision::Parent(Box::new(base_revision)))
        } else if let Some(caps) = ancestor_regex.captures(revision) {
            let generations: usize = caps[2]
                .parse()
                .with_context(|| format!("failed to parse generations in revision: {revision}"))?;
            let base_revision = Self::try_parse(&caps[1])?;
            Ok(Revision::Ancestor(Box::new(base_revision), generations))
        } else if revision == HEAD_REF_NAME || revision == HEAD_ALIAS {
            Ok(Revision::Head)
        } else if Self::looks_like_oid(revision) || BranchName::try_parse(revision).is_ok() {
            Ok(Revision::Name(revision.to_string()))
        } else {
            Err(GibleError::UnknownRevision(revision.to_string()).into())
        }
    }

    pub fn resolve(&self, refs: &Refs, commits: &CommitGraph) -> anyhow::Result<ObjectId> {
        match self {
            Revision::Head => {
                let branch = refs.current_branch()?;
                refs.read_head()?
                    .ok_or_else(|| GibleError::UnbornHead(branch.to_string()).into())
            }
            Revision::Name(name) => Self::resolve_name(name, refs, commits),
            Revision::Parent(base_revision) => {
                let oid = base_revision.resolve(refs, commits)?;
                Self::resolve_commit_parent(&oid, commits, self)
            }
            Revision::Ancestor(base_revision, generations) => {
                let mut oid = base_revision.resolve(refs, commits)?;
                for _ in 0..*generations {
                    oid = Self::resolve_commit_parent(&oid, commits, self)?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_name(name: &str, refs: &Refs, commits: &CommitGraph) -> anyhow::Result<ObjectId> {
        if let Ok(branch_name) = BranchName::try_parse(name)
            && refs.branch_exists(&branch_name)
        {
            return refs
                .read_branch(&branch_name)?
                .ok_or_else(|| GibleError::UnbornHead(branch_name.to_string()).into());
        }

        if !Self::looks_like_oid(name) {
            return Err(GibleError::UnknownRevision(name.to_string()).into());
        }

        let mut matches = commits.find_by_prefix(name)?;
        match matches.len() {
            0 => Err(GibleError::UnknownRevision(name.to_string()).into()),
            1 => Ok(matches.remove(0)),
            _ => Err(GibleError::AmbiguousRevision {
                prefix: name.to_string(),
                candidates: matches.iter().map(ObjectId::to_short_oid).collect(),
            }
            .into()),
        }
    }

    fn resolve_commit_parent(
        oid: &ObjectId,
        commits: &CommitGraph,
        revision: &Revision,
    ) -> anyhow::Result<ObjectId> {
        commits
            .load(oid)?
            .parent()
            .cloned()
            .ok_or_else(|| GibleError::UnknownRevision(revision.to_string()).into())
    }

    fn looks_like_oid(s: &str) -> bool {
        s.len() >= MIN_PREFIX_LENGTH
            && s.len() <= OBJECT_ID_LENGTH
            && s.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Head => write!(f, "{HEAD_REF_NAME}"),
            Revision::Name(name) => write!(f, "{name}"),
            Revision::Parent(base) => write!(f, "{base}^"),
            Revision::Ancestor(base, generations) => write!(f, "{base}~{generations}"),
        }
    }
}
