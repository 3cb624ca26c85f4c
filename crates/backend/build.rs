use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Copies the workspace config.toml next to the built binary, where `load_config` looks for it.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let (Ok(out_dir), Ok(profile)) = (env::var("OUT_DIR"), env::var("PROFILE")) else {
        println!("cargo:warning=OUT_DIR or PROFILE not set, config.toml not copied");
        return;
    };

    // OUT_DIR is target/<profile>/build/commission-backend-<hash>/out
    let Some(target_dir) = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
    else {
        println!("cargo:warning=target profile directory not found from {}", out_dir);
        return;
    };

    let source_config: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config.toml");
    let dest_config = target_dir.join("config.toml");

    if !source_config.exists() {
        println!(
            "cargo:warning=config.toml not found at {:?}, the embedded default will be used",
            source_config
        );
        return;
    }
    if let Err(e) = fs::copy(&source_config, &dest_config) {
        panic!("Failed to copy config.toml to {:?}: {}", dest_config, e);
    }
}
