//! Build script for the storefront crate.
//!
//! Hashes the static CSS and JS bundles into `ASSET_HASH` so templates can
//! link them with a cache-busting query string.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

const ASSETS: [&str; 2] = ["static/css/main.css", "static/js/storefront.js"];

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=ASSET_HASH=dev");
        return;
    };

    let mut hasher = Sha256::new();
    for asset in ASSETS {
        let path = Path::new(&manifest_dir).join(asset);
        println!("cargo:rerun-if-changed={}", path.display());
        match fs::read(&path) {
            Ok(content) => hasher.update(&content),
            Err(e) => {
                println!("cargo:warning=Could not read {asset}: {e}");
                println!("cargo:rustc-env=ASSET_HASH=dev");
                return;
            }
        }
    }

    let short_hash: String = hasher
        .finalize()
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect();
    println!("cargo:rustc-env=ASSET_HASH={short_hash}");
}
