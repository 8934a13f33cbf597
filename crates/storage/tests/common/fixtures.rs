use std::fs;
use std::path::{Path, PathBuf};

/// Write a device directory with the given key product files.
///
/// Each entry is `(file name, contents)`; names may contain subdirectories.
pub fn write_device_dir(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (file, contents) in files {
        let path = dir.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    dir
}

/// Write a device directory with all three key products.
pub fn write_complete_device(root: &Path, serial: u64) -> PathBuf {
    write_device_dir(
        root,
        &serial.to_string(),
        &[
            (&format!("{serial}_pubkey.pem"), &format!("pubkey-{serial}")),
            (
                &format!("{serial}_device_cert.pem"),
                &format!("device-{serial}"),
            ),
            (&format!("{serial}_key_cert.pem"), &format!("key-{serial}")),
        ],
    )
}
