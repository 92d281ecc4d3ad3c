use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// Copies the workspace config.toml next to the built binary, where
// `load_config` looks first.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let source = manifest_dir.join("../../config.toml");
    if !source.exists() {
        println!("cargo:warning=config.toml not found, the embedded defaults will be used");
        return;
    }

    let Some(target_dir) = profile_dir() else {
        println!("cargo:warning=could not locate target profile directory");
        return;
    };

    let dest = target_dir.join("config.toml");
    if let Err(e) = fs::copy(&source, &dest) {
        println!("cargo:warning=failed to copy config.toml to {}: {}", dest.display(), e);
    }
}

/// target/<profile>, found by walking up from OUT_DIR
fn profile_dir() -> Option<PathBuf> {
    let out_dir = env::var("OUT_DIR").ok()?;
    let profile = env::var("PROFILE").ok()?;
    Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}
