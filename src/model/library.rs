use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Weight file extensions, in lookup order.
pub const WEIGHT_EXTENSIONS: [&str; 3] = ["pth", "pt", "safetensors"];

/// A directory of pretrained style weights, one file per style, named after
/// the style (`styles/candy.pth`, `styles/mosaic.safetensors`).
#[derive(Debug, Clone)]
pub struct StyleLibrary {
    dir: PathBuf,
}

impl StyleLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> StyleLibrary {
        StyleLibrary { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the styles directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Returns the weight file for `style`.
    ///
    /// `.pth` wins over `.pt`, which wins over `.safetensors`.
    pub fn resolve(&self, style: &str) -> Result<PathBuf> {
        validate_style_name(style)?;
        WEIGHT_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", style, ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::UnknownStyle {
                name: style.to_owned(),
                dir: self.dir.clone(),
            })
    }

    /// Lists every style with a weight file, sorted and de-duplicated.
    /// A missing directory yields an empty list.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|e| {
                let path = e.path();
                let ext = path.extension().and_then(|s| s.to_str())?;
                if !path.is_file() || !WEIGHT_EXTENSIONS.contains(&ext) {
                    return None;
                }
                path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_owned())
            })
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Rejects empty names and anything that could escape the styles directory.
pub fn validate_style_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(Error::InvalidStyleName { name: name.to_owned() });
    }
    Ok(())
}
