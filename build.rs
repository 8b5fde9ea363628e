//! Build script: embeds the git hash and pre-checks GPU feature flags
//! before whisper-rs-sys tries to compile against a missing toolkit.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        check_cuda();
    }
    if cfg!(feature = "vulkan") {
        check_vulkan();
    }
    if cfg!(feature = "openblas") {
        check_openblas();
    }
}

fn check_cuda() {
    let found = Command::new("nvcc")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success());
    if !found {
        panic!(
            "\n`nvcc` not found — CUDA toolkit is not installed.\n\
             Install: https://developer.nvidia.com/cuda-downloads\n\
             Or build without CUDA: cargo build --release\n",
        );
    }
}

fn check_vulkan() {
    if Command::new("vulkaninfo")
        .arg("--summary")
        .output()
        .is_err()
    {
        panic!(
            "\n`vulkaninfo` not found — Vulkan SDK is not installed.\n\
             Install: https://vulkan.lunarg.com/\n\
             Or build without Vulkan: cargo build --release\n",
        );
    }
}

fn check_openblas() {
    let pkg_config_ok = Command::new("pkg-config")
        .args(["--exists", "openblas"])
        .status()
        .is_ok_and(|s| s.success());

    if !pkg_config_ok {
        let lib_exists = std::path::Path::new("/usr/lib/x86_64-linux-gnu/libopenblas.so").exists()
            || std::path::Path::new("/usr/lib/libopenblas.so").exists()
            || std::path::Path::new("/usr/lib64/libopenblas.so").exists();

        if !lib_exists {
            panic!(
                "\nOpenBLAS not found.\n\
                 Install: sudo apt install libopenblas-dev\n\
                 Or build without OpenBLAS: cargo build --release\n",
            );
        }
    }
}
