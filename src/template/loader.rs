use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::template::BossTemplate;

/// Anything that can produce the ordered list of boss templates
pub trait TemplateSource: Send + Sync {
    fn load_templates(&self) -> Vec<BossTemplate>;
}

/// Template loading errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template directory {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed template {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads every `*.json` file in a directory, one template per file
#[derive(Debug, Clone)]
pub struct JsonTemplateSource {
    dir: PathBuf,
}

impl JsonTemplateSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parse a single template file. The identifier is the file stem.
    pub fn load_file(path: &Path) -> Result<BossTemplate, TemplateError> {
        let body = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut template: BossTemplate =
            serde_json::from_str(&body).map_err(|source| TemplateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        template.identifier = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(template)
    }

    /// List template files sorted by name so reload order is stable
    pub fn template_files(&self) -> Result<Vec<PathBuf>, TemplateError> {
        if !self.dir.is_dir() {
            return Err(TemplateError::NotADirectory(self.dir.clone()));
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| TemplateError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        Ok(files)
    }
}

impl TemplateSource for JsonTemplateSource {
    fn load_templates(&self) -> Vec<BossTemplate> {
        let files = match self.template_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot load boss templates: {}", e);
                return Vec::new();
            }
        };

        let mut templates = Vec::with_capacity(files.len());
        for path in files {
            match Self::load_file(&path) {
                Ok(template) => {
                    debug!("Loaded boss template '{}'", template.identifier);
                    templates.push(template);
                }
                Err(e) => warn!("Skipping boss template: {}", e),
            }
        }

        templates
    }
}

/// Fixed in-memory template list
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateSource {
    templates: Vec<BossTemplate>,
}

impl StaticTemplateSource {
    pub fn new(templates: Vec<BossTemplate>) -> Self {
        Self { templates }
    }
}

impl TemplateSource for StaticTemplateSource {
    fn load_templates(&self) -> Vec<BossTemplate> {
        self.templates.clone()
    }
}
