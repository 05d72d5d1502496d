//! Binary files checked into the source tree

use crate::checker::{CheckError, CheckRequest};

/// Extensions of compiled or packaged artifacts
pub const BINARY_EXTENSIONS: &[&str] = &[
    "a", "apk", "bin", "bundle", "class", "com", "crx", "deb", "dex", "dey", "dll", "drv", "dylib",
    "efi", "elf", "exe", "iso", "jar", "lib", "macho", "msi", "o", "ocx", "par", "pyc", "pyo",
    "rpm", "so", "war", "wasm", "whl",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryArtifactData {
    /// Repository-relative paths, sorted
    pub files: Vec<String>,
}

pub fn is_binary_artifact(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }
    let ext = ext.to_ascii_lowercase();
    BINARY_EXTENSIONS.contains(&ext.as_str())
}

pub fn collect(req: &CheckRequest) -> Result<BinaryArtifactData, CheckError> {
    let mut files = req.raw.files_matching(req, is_binary_artifact)?;
    files.sort();
    Ok(BinaryArtifactData { files })
}
