use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=CNF_CACHE_PATH_HINT");

    let hint = env::var("CNF_CACHE_PATH_HINT").ok();

    if let Some(raw_hint) = hint {
        let candidate = PathBuf::from(raw_hint);
        if candidate.is_absolute() {
            println!("cargo:rustc-env=CNF_CACHE_PATH_HINT={}", candidate.display());
        }
    }
}
