//! On-disk fixture layout.
//!
//! Tools that read the STASHmaster expect a directory containing
//! `STASHmaster_A`; these helpers write the reference suite into a temporary
//! directory with that shape.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::fixtures::{SUITE_CONFIG, SUITE_RATIO_DB, SUITE_STASHMASTER};

/// File name of the atmosphere STASHmaster inside a metadata directory.
pub const STASHMASTER_FILE: &str = "STASHmaster_A";

/// A temporary directory holding a complete suite. Removed on drop.
pub struct SuiteFixture {
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub stash_dir: PathBuf,
    pub ratio_db_path: PathBuf,
}

impl SuiteFixture {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Write the reference suite to a fresh temporary directory.
pub fn write_suite_fixture() -> io::Result<SuiteFixture> {
    write_fixture(SUITE_CONFIG, SUITE_STASHMASTER, Some(SUITE_RATIO_DB))
}

/// Write arbitrary fixture content. `ratio_db = None` leaves the database absent.
pub fn write_fixture(
    config: &str,
    stashmaster: &str,
    ratio_db: Option<&str>,
) -> io::Result<SuiteFixture> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("rose-app.conf");
    fs::write(&config_path, config)?;

    let stash_dir = dir.path().join("STASHmaster");
    fs::create_dir_all(&stash_dir)?;
    fs::write(stash_dir.join(STASHMASTER_FILE), stashmaster)?;

    let ratio_db_path = dir.path().join("DB_ratio");
    if let Some(db) = ratio_db {
        fs::write(&ratio_db_path, db)?;
    }

    Ok(SuiteFixture {
        dir,
        config_path,
        stash_dir,
        ratio_db_path,
    })
}
