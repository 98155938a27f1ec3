use std::{env, path::PathBuf};

use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");
const ASSET_DIR_ENV: &str = "NEWSFRAME_ASSET_DIR";

/// Directory holding brand fonts, logo and overlay.
///
/// `NEWSFRAME_ASSET_DIR` wins; debug builds fall back to the repo's
/// `assets/brand`, release builds to the platform data dir.
pub fn asset_dir() -> Option<PathBuf> {
    if let Ok(custom_dir) = env::var(ASSET_DIR_ENV) {
        return Some(PathBuf::from(custom_dir));
    }

    if cfg!(debug_assertions) {
        return Some(PathBuf::from(PROJECT_ROOT).join("../../assets/brand"));
    }

    installed_asset_dir()
}

// macOS → ~/Library/Application Support/media.newsframe.newsframe/brand
// Linux → ~/.local/share/newsframe/brand   (respects XDG_DATA_HOME)
// Windows → %APPDATA%\newsframe\newsframe\data\brand
fn installed_asset_dir() -> Option<PathBuf> {
    ProjectDirs::from("media", "newsframe", "newsframe").map(|dirs| dirs.data_dir().join("brand"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_dir_is_brand_under_project_data_dir() {
        // No home directory in some sandboxes
        let Some(dir) = installed_asset_dir() else {
            return;
        };
        assert!(dir.ends_with("brand"));
        let project = dir.parent().map(|p| p.to_string_lossy().to_lowercase());
        assert!(project.is_some_and(|p| p.contains("newsframe")), "{}", dir.display());
    }
}
