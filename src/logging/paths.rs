use std::fs;
use std::path::{Path, PathBuf};

/// Get the log directory, creating it if needed
///
/// Resolution order:
/// 1. Custom directory from parameter (`INTAKE_LOG_DIR`)
/// 2. Per-user data directory (`<data_local_dir>/intake-server/logs`)
/// 3. `./logs`
pub fn get_log_directory(custom_dir: Option<&str>) -> Result<PathBuf, std::io::Error> {
    if let Some(dir) = custom_dir {
        return ensure_directory_exists(PathBuf::from(dir));
    }

    if let Some(data_dir) = dirs::data_local_dir() {
        let path = data_dir.join("intake-server").join("logs");
        if can_create(&path) {
            return ensure_directory_exists(path);
        }
    }

    ensure_directory_exists(PathBuf::from("logs"))
}

/// Check if a directory is writable
fn is_writable(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    let test_file = path.join(".write_test");
    fs::write(&test_file, "test").is_ok() && {
        let _ = fs::remove_file(&test_file);
        true
    }
}

/// Check if the directory exists and is writable, or its nearest parent is
fn can_create(path: &Path) -> bool {
    if path.exists() {
        return is_writable(path);
    }

    path.ancestors()
        .skip(1)
        .find(|ancestor| ancestor.exists())
        .map(is_writable)
        .unwrap_or(false)
}

fn ensure_directory_exists(path: PathBuf) -> Result<PathBuf, std::io::Error> {
    if !path.exists() {
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}
