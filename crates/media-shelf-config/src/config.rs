use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Thresholds and list sizes for the metrics view.
///
/// Every field is required when read from TOML: a missing threshold is a
/// configuration error, not something to default silently. `Default` carries
/// the documented values used by `config init`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MetricsConfig {
    pub top_genres: usize,
    pub top_actors: usize,
    pub top_directors: usize,
    pub top_production_companies: usize,
    pub top_collections: usize,
    pub top_years: usize,
    /// Length of each budget/revenue leaderboard.
    pub top_budget: usize,

    // Minimum number of titles before a key is ranked by average rating
    pub min_actor_samples: u32,
    pub min_director_samples: u32,
    pub min_company_samples: u32,
    pub min_collection_samples: u32,
    pub min_year_samples: u32,

    /// Rating at or above which a title counts as a blockbuster.
    pub blockbuster_threshold: f64,
    /// How many titles of one collection count toward an actor's sample size.
    pub max_movies_from_collection: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            top_genres: 5,
            top_actors: 5,
            top_directors: 5,
            top_production_companies: 5,
            top_collections: 5,
            top_years: 5,
            top_budget: 5,
            min_actor_samples: 7,
            min_director_samples: 3,
            min_company_samples: 7,
            min_collection_samples: 3,
            min_year_samples: 5,
            blockbuster_threshold: 4.5,
            max_movies_from_collection: 3,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let top_counts = [
            ("top_genres", self.top_genres),
            ("top_actors", self.top_actors),
            ("top_directors", self.top_directors),
            ("top_production_companies", self.top_production_companies),
            ("top_collections", self.top_collections),
            ("top_years", self.top_years),
            ("top_budget", self.top_budget),
        ];
        for (field, value) in top_counts {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be at least 1"));
            }
        }

        let min_samples = [
            ("min_actor_samples", self.min_actor_samples),
            ("min_director_samples", self.min_director_samples),
            ("min_company_samples", self.min_company_samples),
            ("min_collection_samples", self.min_collection_samples),
            ("min_year_samples", self.min_year_samples),
        ];
        for (field, value) in min_samples {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be at least 1"));
            }
        }

        if !self.blockbuster_threshold.is_finite()
            || !(0.0..=5.0).contains(&self.blockbuster_threshold)
        {
            return Err(ConfigError::invalid(
                "blockbuster_threshold",
                format!("{} is outside the 0-5 rating scale", self.blockbuster_threshold),
            ));
        }

        if self.max_movies_from_collection == 0 {
            return Err(ConfigError::invalid("max_movies_from_collection", "must be at least 1"));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LibraryConfig {
    /// Folder in the note store holding one note per title.
    #[serde(default = "default_notes_folder")]
    pub notes_folder: String,
    /// Languages pre-selected in the language filter, if present in the library.
    #[serde(default)]
    pub default_language_filters: Vec<String>,
    /// Frontmatter properties shown on each card by default.
    #[serde(default = "default_properties")]
    pub default_properties: Vec<String>,
}

fn default_notes_folder() -> String {
    "Movies".to_string()
}

fn default_properties() -> Vec<String> {
    vec!["Rating".to_string(), "Status".to_string()]
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            notes_folder: default_notes_folder(),
            default_language_filters: Vec::new(),
            default_properties: default_properties(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics: MetricsConfig::default(),
            library: LibraryConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(write_err)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.metrics.validate()?;

        if self.library.notes_folder.trim().is_empty() {
            return Err(ConfigError::invalid("notes_folder", "cannot be empty"));
        }

        Ok(())
    }

    /// Load the config at `path`, or fall back to defaults when the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            metrics: MetricsConfig {
                top_actors: 10,
                blockbuster_threshold: 4.0,
                ..MetricsConfig::default()
            },
            library: LibraryConfig {
                notes_folder: "Media/Films".to_string(),
                default_language_filters: vec!["en".to_string(), "fr".to_string()],
                default_properties: vec!["Rating".to_string()],
            },
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.metrics.top_actors, 10);
        assert_eq!(loaded.library.default_language_filters, vec!["en", "fr"]);
    }

    #[test]
    fn test_missing_threshold_fails_fast() {
        let toml = r#"
[metrics]
top_genres = 5
top_actors = 5
top_directors = 5
top_production_companies = 5
top_collections = 5
top_years = 5
top_budget = 5
min_actor_samples = 7
min_director_samples = 3
min_company_samples = 7
min_collection_samples = 3
min_year_samples = 5
max_movies_from_collection = 3
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_numeric_threshold_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let mut content = toml::to_string_pretty(&Config::default()).unwrap();
        content = content.replace("blockbuster_threshold = 4.5", "blockbuster_threshold = \"high\"");
        std::fs::write(file.path(), content).unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_metrics_config_validate() {
        assert!(MetricsConfig::default().validate().is_ok());

        let zero_top = MetricsConfig {
            top_genres: 0,
            ..MetricsConfig::default()
        };
        assert!(matches!(
            zero_top.validate(),
            Err(ConfigError::Invalid { field: "top_genres", .. })
        ));

        let bad_threshold = MetricsConfig {
            blockbuster_threshold: 7.5,
            ..MetricsConfig::default()
        };
        assert!(bad_threshold.validate().is_err());

        let nan_threshold = MetricsConfig {
            blockbuster_threshold: f64::NAN,
            ..MetricsConfig::default()
        };
        assert!(nan_threshold.validate().is_err());

        let zero_cap = MetricsConfig {
            max_movies_from_collection: 0,
            ..MetricsConfig::default()
        };
        assert!(zero_cap.validate().is_err());
    }

    #[test]
    fn test_library_section_is_optional() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        let metrics_only: String = content
            .split("[library]")
            .next()
            .unwrap_or_default()
            .to_string();
        let loaded: Config = toml::from_str(&metrics_only).unwrap();
        assert_eq!(loaded.library, LibraryConfig::default());
    }
}
