use std::fmt::Debug;

/// How content is diffed and merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Binary,
}

impl ContentKind {
    pub fn as_str(&self) -> &str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Binary => "binary",
        }
    }
}

impl TryFrom<&str> for ContentKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "text" => Ok(ContentKind::Text),
            "binary" => Ok(ContentKind::Binary),
            _ => Err(anyhow::anyhow!("invalid content kind '{}'", value)),
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub trait ContentClassifier: Debug + Send + Sync {
    fn classify(&self, content: &[u8]) -> ContentKind;
}

/// Text iff the content is valid UTF-8 and has no NUL byte
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl ContentClassifier for DefaultClassifier {
    fn classify(&self, content: &[u8]) -> ContentKind {
        if content.contains(&0) || std::str::from_utf8(content).is_err() {
            ContentKind::Binary
        } else {
            ContentKind::Text
        }
    }
}
