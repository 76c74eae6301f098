use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_mapping_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("failed to write mapping file");
    (temp_dir, path)
}

#[allow(dead_code)]
pub fn base_env() -> HashMap<String, String> {
    [("STREAMER_NAME", "KAFKA"), ("PORT_ORG_ID", "org_it")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
