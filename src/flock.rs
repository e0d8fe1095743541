use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
    time::{Duration, Instant},
};

use fs4::fs_std::FileExt;
use log::debug;
use thiserror::Error;

/// Exclusive advisory lock on an existing file, released on drop.
///
/// Reads and writes go through the locked handle, as some platforms refuse
/// writes to a locked file from any other handle.
pub struct FileLock {
    file: File,
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] std::io::Error);

impl FileLock {
    pub fn new(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let start = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(_) => {
                    return Ok(Self { file });
                }
                Err(error)
                    if error.raw_os_error() == fs4::lock_contended_error().raw_os_error()
                        && start.elapsed().as_secs() < 300 =>
                {
                    debug!("Failed to acquire a lock on {}, retrying", path.display());
                    std::thread::sleep(Duration::from_secs(1));
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    pub fn read_to_string(&mut self) -> Result<String, Error> {
        let mut contents = String::new();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_to_string(&mut contents)?;
        Ok(contents)
    }

    pub fn replace_contents(&mut self, contents: &str) -> Result<(), Error> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(contents.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradle.lockfile");
        std::fs::write(&path, "empty=\n").unwrap();

        let mut lock = FileLock::new(&path).unwrap();
        assert_eq!(lock.read_to_string().unwrap(), "empty=\n");
        lock.replace_contents("a:b:1=api\nempty=\n").unwrap();
        assert_eq!(lock.read_to_string().unwrap(), "a:b:1=api\nempty=\n");
        drop(lock);

        let mut lock = FileLock::new(&path).unwrap();
        lock.replace_contents("empty=").unwrap();
        drop(lock);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "empty=");
    }

    #[test]
    fn lock_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileLock::new(&dir.path().join("missing.lockfile")).is_err());
    }
}
