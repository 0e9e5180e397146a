fn main() {
    println!("cargo:rerun-if-changed=assets/icon.ico");

    // Embed icon resource into the Windows .exe (for both CLI and GUI binaries)
    #[cfg(target_os = "windows")]
    {
        if std::path::Path::new("assets/icon.ico").exists() {
            let mut res = winresource::WindowsResource::new();
            res.set_icon("assets/icon.ico");
            res.compile().expect("Failed to compile Windows resource");
        }
    }
}
