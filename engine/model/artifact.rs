use super::{FittedRegressor, FittedScaler, ModelError, Regressor, Transform};
use crate::features::schema::{FEATURE_COLUMNS, MODEL_WIDTH, encoded_index};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// The two applicant segments, each served by its own bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Young,
    Rest,
}

impl Segment {
    pub const ALL: [Segment; 2] = [Segment::Young, Segment::Rest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Young => "young",
            Segment::Rest => "rest",
        }
    }

    /// Artifact file name inside the models directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Segment::Young => "young.toml",
            Segment::Rest => "rest.toml",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading or saving an artifact bundle.
///
/// Any of these at startup means the service must not begin serving traffic.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read or write artifact file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML artifact '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize artifact to TOML format: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Artifact '{}' is unusable: {defect}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        defect: BundleDefect,
    },
}

/// Structural problems found by [`BundleFile::validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BundleDefect {
    #[error("model was trained on columns {found:?}, which do not match the feature schema")]
    FeatureSchema { found: Vec<String> },
    #[error("column '{0}' is listed for scaling but is not an encoded feature")]
    UnknownScaledColumn(String),
    #[error("column '{0}' is listed for scaling more than once")]
    DuplicateScaledColumn(String),
    #[error("scaler was fitted on {scaler} columns but {listed} are listed for scaling")]
    ScalerWidth { scaler: usize, listed: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// On-disk form of one segment's bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleFile {
    /// Model input columns in training order. Must equal the service schema.
    pub feature_names: Vec<String>,
    /// Columns fed to the scaler, in the order it was fitted on.
    pub columns_to_scale: Vec<String>,
    pub scaler: FittedScaler,
    pub model: FittedRegressor,
}

impl BundleFile {
    /// Reads and parses a bundle file without validating it.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let text = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the bundle in human-readable TOML.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let text = toml::to_string_pretty(self)?;
        let io_error = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = BufWriter::new(fs::File::create(path).map_err(io_error)?);
        file.write_all(text.as_bytes()).map_err(io_error)?;
        file.flush().map_err(io_error)?;
        Ok(())
    }

    /// Checks that the bundle agrees with the service's feature schema.
    pub fn validate(&self) -> Result<(), BundleDefect> {
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
            return Err(BundleDefect::FeatureSchema {
                found: self.feature_names.clone(),
            });
        }

        let mut seen = HashSet::new();
        for column in &self.columns_to_scale {
            if encoded_index(column).is_none() {
                return Err(BundleDefect::UnknownScaledColumn(column.clone()));
            }
            if !seen.insert(column.as_str()) {
                return Err(BundleDefect::DuplicateScaledColumn(column.clone()));
            }
        }

        self.scaler.validate()?;
        if self.scaler.width() != self.columns_to_scale.len() {
            return Err(BundleDefect::ScalerWidth {
                scaler: self.scaler.width(),
                listed: self.columns_to_scale.len(),
            });
        }

        self.model.validate(MODEL_WIDTH)?;
        Ok(())
    }
}

/// One segment's (model, scaler, scaled columns) triple.
///
/// Immutable after construction and cheap to clone; the fitted components sit behind
/// `Arc` so a single load can be shared by every concurrent request.
#[derive(Clone)]
pub struct ArtifactBundle {
    segment: Segment,
    model: Arc<dyn Regressor>,
    scaler: Arc<dyn Transform>,
    columns_to_scale: Vec<String>,
}

impl ArtifactBundle {
    pub fn new(
        segment: Segment,
        model: Arc<dyn Regressor>,
        scaler: Arc<dyn Transform>,
        columns_to_scale: Vec<String>,
    ) -> Self {
        Self {
            segment,
            model,
            scaler,
            columns_to_scale,
        }
    }

    /// Loads and validates `<dir>/<segment>.toml`.
    pub fn load(dir: &Path, segment: Segment) -> Result<Self, ArtifactError> {
        let path = dir.join(segment.file_name());
        let file = BundleFile::load(&path)?;
        file.validate().map_err(|defect| ArtifactError::Invalid {
            path: path.clone(),
            defect,
        })?;

        log::info!(
            "Loaded {} bundle from {}: {} model, {} scaled columns",
            segment,
            path.display(),
            file.model.describe(),
            file.columns_to_scale.len()
        );

        Ok(Self::new(
            segment,
            Arc::new(file.model),
            Arc::new(file.scaler),
            file.columns_to_scale,
        ))
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn model(&self) -> &dyn Regressor {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &dyn Transform {
        self.scaler.as_ref()
    }

    pub fn columns_to_scale(&self) -> &[String] {
        &self.columns_to_scale
    }
}

impl fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("segment", &self.segment)
            .field("columns_to_scale", &self.columns_to_scale)
            .finish_non_exhaustive()
    }
}
