use std::path::{Path, PathBuf};

/// Extension the settings dialog filters on. Empty means "any file with an
/// execute bit".
#[cfg(windows)]
pub const EXECUTABLE_EXTENSION: &str = "exe";

#[cfg(unix)]
pub const EXECUTABLE_EXTENSION: &str = "";

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/kadse/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("kadse")
    }
    #[cfg(windows)]
    {
        // Portable install: a data/ directory next to the executable wins
        if let Some(dir) = exe_dir() {
            let portable_data = dir.join("data");
            if portable_data.exists() {
                return portable_data;
            }
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kadse")
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Some(dir) = exe_dir() {
            if dir.join("config.toml").exists() {
                return dir;
            }
        }
    }

    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("kadse")
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kadse")
    }
}

fn exe_dir() -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    current_exe.parent().map(Path::to_path_buf)
}

#[cfg(unix)]
fn binary_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

#[cfg(windows)]
fn binary_names(name: &str) -> Vec<String> {
    if name.to_ascii_lowercase().ends_with(".exe") {
        vec![name.to_string()]
    } else {
        vec![format!("{}.exe", name), name.to_string()]
    }
}

fn find_beside_exe(names: &[String]) -> Option<PathBuf> {
    let dir = exe_dir()?;
    for name in names {
        let p = dir.join(name);
        if p.exists() {
            return Some(p);
        }
        let p = dir.join("external").join(name);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

fn find_on_path(names: &[String]) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for name in names {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }
    None
}

/// Resolve the streaming tool binary.
///
/// Searches in order:
/// 1. `name` itself, when it already points at an existing file
/// 2. Beside the current executable (also `external/`)
/// 3. PATH
///
/// Falls back to the bare name so the OS gets the final say and a missing
/// tool surfaces as a launch failure.
pub fn resolve_tool_binary(name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.components().count() > 1 && direct.exists() {
        return direct;
    }

    let names = binary_names(name);
    if let Some(p) = find_beside_exe(&names) {
        return p;
    }
    if let Some(p) = find_on_path(&names) {
        return p;
    }
    direct
}

/// Whether `path` is something the player picker should offer.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case(EXECUTABLE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_are_namespaced() {
        assert!(data_dir().ends_with("kadse"));
        assert!(config_dir().ends_with("kadse"));
    }

    #[test]
    fn test_resolve_unknown_tool_falls_back_to_name() {
        let p = resolve_tool_binary("kadse-no-such-tool-xyz");
        assert_eq!(p, PathBuf::from("kadse-no-such-tool-xyz"));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("streamlink");
        std::fs::write(&tool, "").unwrap();
        let resolved = resolve_tool_binary(tool.to_str().unwrap());
        assert_eq!(resolved, tool);
    }

    #[cfg(unix)]
    #[test]
    fn test_is_executable_checks_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("notes.txt");
        let player = dir.path().join("mpv");
        std::fs::write(&plain, "x").unwrap();
        std::fs::write(&player, "x").unwrap();
        std::fs::set_permissions(&player, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(!is_executable(&plain));
        assert!(is_executable(&player));
        assert!(!is_executable(dir.path()));
    }
}
