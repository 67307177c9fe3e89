//! Commit: an immutable node of the history graph
//!
//! ## Format
//!
//! ```text
//! commit <size>\0
//! tree <tree-id>
//! parent <parent-id>        (zero, one or two lines)
//! author <name> <<email>> <unix-millis> <timezone>
//!
//! <message>
//! ```
//!
//! The id hashes the whole record, so it covers the tree, the parents, the
//! author, the millisecond timestamp and the message.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::io::{BufRead, Read};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Author stamped with the current local time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// "Name <email>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Serialized form: "Name <email> millis timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp_millis(),
            self.timestamp.format("%z")
        )
    }

    /// Like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parts = value.rsplitn(3, ' ');
        let timezone = parts.next().context("invalid author: missing timezone")?;
        let millis = parts
            .next()
            .context("invalid author: missing timestamp")?
            .parse::<i64>()
            .context("invalid author: bad timestamp")?;
        let identity = parts.next().context("invalid author: missing identity")?;

        let email_start = identity
            .find('<')
            .context("invalid author: missing '<'")?;
        let email_end = identity
            .rfind('>')
            .context("invalid author: missing '>'")?;

        let offset = DateTime::parse_from_str(&format!("1970-01-01 00:00:00 {timezone}"), "%Y-%m-%d %H:%M:%S %z")
            .context("invalid author: bad timezone")?
            .offset()
            .to_owned();
        let timestamp = DateTime::from_timestamp_millis(millis)
            .context("invalid author: timestamp out of range")?
            .with_timezone(&offset);

        Ok(Author {
            name: identity[..email_start].trim().to_string(),
            email: identity[email_start + 1..email_end].to_string(),
            timestamp,
        })
    }
}

/// The part of a commit the graph algorithms need
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Empty for a root commit, two entries for a merge commit
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    message: String,
}

impl Commit {
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            author,
            message,
        }
    }

    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    /// First parent, the one history follows
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.author.timestamp()
    }

    pub fn to_slim(&self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            oid,
            parents: self.parents.clone(),
            timestamp: self.timestamp(),
        }
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        lines.extend(self.parents.iter().map(|parent| format!("parent {parent}")));
        lines.push(format!("author {}", self.author.display()));
        lines.push(String::new());
        lines.push(self.message.clone());

        frame(self.object_type(), lines.join("\n").as_bytes())
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let (headers, message) = content
            .split_once("\n\n")
            .context("invalid commit: missing message separator")?;
        let mut headers = headers.lines();

        let tree_oid = headers
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .context("invalid commit: missing tree line")?
            .parse::<ObjectId>()?;

        let mut parents = Vec::new();
        let mut author = None;
        for line in headers {
            if let Some(parent) = line.strip_prefix("parent ") {
                parents.push(parent.parse::<ObjectId>()?);
            } else if let Some(value) = line.strip_prefix("author ") {
                author = Some(Author::try_from(value)?);
            } else {
                anyhow::bail!("invalid commit: unexpected header '{}'", line);
            }
        }
        let author = author.context("invalid commit: missing author line")?;

        Ok(Self::new(parents, tree_oid, author, message.to_string()))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
