use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A scratch directory owned by one worker. Aligners write their input and
/// output files only inside it, so concurrent workers never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Creates (if needed) and claims `root` as a workspace.
    pub fn create<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Creates a workspace named after `label` under `parent`, replacing any
    /// character that is not safe in a file name.
    pub fn create_in<P: AsRef<Path>>(parent: P, label: &str) -> io::Result<Self> {
        let name: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        Self::create(parent.as_ref().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
