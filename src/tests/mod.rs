use std::env;
use std::path::PathBuf;

pub(crate) fn testdata_dir() -> PathBuf {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir).join("testdata")
}

pub(crate) fn testdata(name: &str) -> PathBuf {
    testdata_dir().join(name)
}
