//! Atomic file operations shared by several processes.
//!
//! Writers serialize on a sibling `.lock` file; readers never lock and rely
//! on whole-file replacement (tmp file + rename) or line-granular appends.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

/// A handle to a text file that is replaced or appended to atomically.
///
/// Provides:
/// - **Atomicity**: Replacements go through a tmp file + rename
/// - **Isolation**: [`AtomicFile::lock`] serializes writers across processes
/// - **Durability**: Explicit fsync before rename and after append
#[derive(Debug, Clone)]
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file. `Ok(None)` if it does not exist yet.
    pub fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replaces the file content in one step.
    pub fn replace(&self, content: &str) -> io::Result<()> {
        self.ensure_parent()?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)
    }

    /// Appends one line (a trailing newline is added).
    ///
    /// The line is written with a single `write_all`; callers hold the
    /// [`FileLock`] so appends from different processes never interleave.
    pub fn append_line(&self, line: &str) -> io::Result<()> {
        self.ensure_parent()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        file.write_all(buf.as_bytes())?;
        file.sync_data()
    }

    /// Acquires the writer lock for this file.
    pub fn lock(&self) -> io::Result<FileLock> {
        FileLock::acquire(&self.path)
    }

    fn ensure_parent(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn temp_path(&self) -> io::Result<PathBuf> {
        let parent = self.path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory")
        })?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// An exclusive lock guard, released when dropped.
///
/// The lock file itself is left in place; removing it while another process
/// waits on the same inode would let two writers in at once.
pub struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> io::Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive()?;

        Ok(FileLock { file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("missing.jsonl"));
        assert!(file.read().unwrap().is_none());
    }

    #[test]
    fn test_replace_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("box.jsonl");
        let file = AtomicFile::new(path.clone());

        file.replace("first\n").unwrap();
        file.replace("second\n").unwrap();

        assert_eq!(file.read().unwrap().unwrap(), "second\n");
        assert!(!temp_dir.path().join("nested").join(".box.jsonl.tmp").exists());
    }

    #[test]
    fn test_append_under_lock() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("log.jsonl"));

        {
            let _lock = file.lock().unwrap();
            file.append_line("a").unwrap();
            file.append_line("b").unwrap();
        }
        let _lock = file.lock().unwrap();

        assert_eq!(file.read().unwrap().unwrap(), "a\nb\n");
    }
}
