use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;

use crate::error::LassaError;
use crate::filter::{GenomeMode, HostMode, MetadataMode, PipelineOptions};
use crate::metadata;

/// Raw configuration surface as gathered from the command line. All
/// interactive or flag resolution happens before the pipeline; the core
/// never prompts.
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    pub outdir: Utf8PathBuf,
    pub genome_mode: GenomeMode,
    pub completeness_threshold: Option<f64>,
    pub host_mode: HostMode,
    pub metadata_mode: MetadataMode,
    pub countries: Option<Vec<String>>,
    pub exclusion_list: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub outdir: Utf8PathBuf,
    pub pipeline: PipelineOptions,
}

impl CuratorConfig {
    /// Validate and normalize into pipeline options. Threshold errors are
    /// rejected here, before any network traffic; a requested country name
    /// absent from the canonical table warns and then simply matches nothing.
    pub fn resolve(self) -> Result<ResolvedConfig, LassaError> {
        match (self.genome_mode, self.completeness_threshold) {
            (GenomeMode::MinPercent, None) => return Err(LassaError::MissingThreshold),
            (GenomeMode::MinPercent, Some(threshold)) => {
                if !threshold.is_finite() || threshold <= 0.0 || threshold > 100.0 {
                    return Err(LassaError::InvalidThreshold(threshold.to_string()));
                }
            }
            (_, Some(_)) => return Err(LassaError::UnexpectedThreshold),
            (_, None) => {}
        }

        let countries = match self.countries {
            Some(names) if !names.is_empty() => {
                let mut allowed = HashSet::new();
                for name in &names {
                    if !metadata::is_known_country(name) {
                        tracing::warn!(
                            country = %name,
                            "country not in the canonical table; it will match nothing"
                        );
                    }
                    allowed.insert(metadata::normalize_country(name));
                }
                Some(allowed)
            }
            _ => None,
        };

        let exclusions = match &self.exclusion_list {
            Some(path) => load_exclusions(path)?,
            None => HashSet::new(),
        };

        Ok(ResolvedConfig {
            outdir: self.outdir,
            pipeline: PipelineOptions {
                genome_mode: self.genome_mode,
                completeness_threshold: self.completeness_threshold,
                host_mode: self.host_mode,
                metadata_mode: self.metadata_mode,
                countries,
                exclusions,
            },
        })
    }
}

/// Line-oriented accession list; blank lines and `#` comments are ignored.
pub fn load_exclusions(path: &Path) -> Result<HashSet<String>, LassaError> {
    let content =
        fs::read_to_string(path).map_err(|_| LassaError::ExclusionRead(path.to_path_buf()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn base_config() -> CuratorConfig {
        CuratorConfig {
            outdir: Utf8PathBuf::from("out"),
            genome_mode: GenomeMode::None,
            completeness_threshold: None,
            host_mode: HostMode::None,
            metadata_mode: MetadataMode::None,
            countries: None,
            exclusion_list: None,
        }
    }

    #[test]
    fn min_percent_requires_threshold() {
        let config = CuratorConfig {
            genome_mode: GenomeMode::MinPercent,
            ..base_config()
        };
        assert_matches!(config.resolve(), Err(LassaError::MissingThreshold));
    }

    #[test]
    fn threshold_without_min_percent_rejected() {
        let config = CuratorConfig {
            genome_mode: GenomeMode::Complete,
            completeness_threshold: Some(80.0),
            ..base_config()
        };
        assert_matches!(config.resolve(), Err(LassaError::UnexpectedThreshold));
    }

    #[test]
    fn threshold_bounds() {
        for bad in [0.0, -5.0, 120.0, f64::NAN] {
            let config = CuratorConfig {
                genome_mode: GenomeMode::MinPercent,
                completeness_threshold: Some(bad),
                ..base_config()
            };
            assert_matches!(config.resolve(), Err(LassaError::InvalidThreshold(_)));
        }
    }

    #[test]
    fn countries_normalized() {
        let config = CuratorConfig {
            countries: Some(vec!["ivory-coast".to_string(), "Sierra Leone".to_string()]),
            ..base_config()
        };
        let resolved = config.resolve().unwrap();
        let allowed = resolved.pipeline.countries.unwrap();
        assert!(allowed.contains("IvoryCoast"));
        assert!(allowed.contains("SierraLeone"));
    }

    #[test]
    fn exclusion_file_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remove.txt");
        fs::write(&path, "# curated removals\nAB1.1\n\n  AB2.1  \n#AB3.1\n").unwrap();
        let set = load_exclusions(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("AB1.1"));
        assert!(set.contains("AB2.1"));
    }

    #[test]
    fn missing_exclusion_file_errors() {
        let config = CuratorConfig {
            exclusion_list: Some(PathBuf::from("/nonexistent/remove.txt")),
            ..base_config()
        };
        assert_matches!(config.resolve(), Err(LassaError::ExclusionRead(_)));
    }
}
