use std::env;
use std::path::PathBuf;

// ffmpeg-next finds FFmpeg through pkg-config everywhere except Windows,
// where builds usually come from vcpkg. Point the user at the install.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows"
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=stills needs the FFmpeg libraries: set FFMPEG_DIR, or install ffmpeg with vcpkg and set VCPKG_ROOT."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let install = PathBuf::from(vcpkg_root).join("installed").join(triplet);

    if !install.exists() {
        println!(
            "cargo:warning=No vcpkg FFmpeg found under {}; the build will likely fail to link.",
            install.display()
        );
        return;
    }

    println!(
        "cargo:warning=Using vcpkg FFmpeg at {0}. Set FFMPEG_DIR={0} to skip this lookup.",
        install.display()
    );
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        println!("cargo:warning=Set VCPKGRS_DYNAMIC=1 if the vcpkg FFmpeg build is dynamic.");
    }
}
