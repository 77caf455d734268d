fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    // Allow packaged builds to pin the reported revision.
    println!("cargo:rerun-if-env-changed=CIVIC_GIT_HASH");
    if let Ok(hash) = std::env::var("CIVIC_GIT_HASH") {
        println!("cargo:rustc-env=CIVIC_GIT_HASH={}", hash);
    }
}
