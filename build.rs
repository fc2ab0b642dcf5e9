fn main() {
    // Stamp the binary with its assembly time for version reporting
    let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    println!("cargo:rustc-env=BUILD_DATE={stamp}");
}
