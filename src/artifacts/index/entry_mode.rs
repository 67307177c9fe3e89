use is_executable::IsExecutable;
use std::path::Path;

/// Mode recorded for a tracked file
#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

impl FileMode {
    /// Mode of a file in the working tree
    pub fn of_path(path: &Path) -> Self {
        if path.is_executable() {
            FileMode::Executable
        } else {
            FileMode::Regular
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileMode::Regular => "100644",
            FileMode::Executable => "100755",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            FileMode::Regular => 0o100644,
            FileMode::Executable => 0o100755,
        }
    }

    /// Unix permission bits applied when writing the file to the working tree
    pub fn permissions(&self) -> u32 {
        self.as_u32() & 0o777
    }
}

impl TryFrom<u32> for FileMode {
    type Error = anyhow::Error;

    fn try_from(mode: u32) -> anyhow::Result<Self> {
        match mode {
            0o100644 => Ok(FileMode::Regular),
            0o100755 => Ok(FileMode::Executable),
            _ => Err(anyhow::anyhow!("invalid file mode {:o}", mode)),
        }
    }
}

impl TryFrom<&str> for FileMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "100644" => Ok(FileMode::Regular),
            "100755" => Ok(FileMode::Executable),
            _ => Err(anyhow::anyhow!("invalid file mode '{}'", value)),
        }
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
