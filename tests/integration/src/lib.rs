//! Shared helpers for the Fides integration tests.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

static FILE_SEQ: AtomicU32 = AtomicU32::new(0);

/// Write a proof-schema template to a unique temp file and return its path.
///
/// Callers are responsible for removing the file when done.
pub fn write_template(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "fides-it-{}-{}.json",
        std::process::id(),
        FILE_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let mut file = std::fs::File::create(&path).expect("create template file");
    file.write_all(contents.as_bytes()).expect("write template");
    path
}
