use std::{fs::File, io::BufReader, path::Path};

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum SondeError {
    #[error("failed to read the profile archive")]
    Io(#[from] std::io::Error),
    #[error("failed to decode the profile archive")]
    Json(#[from] serde_json::Error),
    #[error("the virtual radiosonde returned {actual} profiles for {expected} points")]
    ProfileCount { expected: usize, actual: usize },
    #[error("profile {index} carries {actual} levels where {expected} were requested")]
    LevelCount {
        index: usize,
        expected: usize,
        actual: usize,
    },
}
type Result<T> = std::result::Result<T, SondeError>;

/// One observation point handed to the virtual radiosonde.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessPoint {
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

/// An atmospheric profile returned by the virtual radiosonde, one per
/// requested point, on the requested pressure levels.
#[derive(Debug, Clone, Deserialize)]
pub struct SoundingProfile {
    pub temperature: Vec<f64>,
    pub pressure: Vec<f64>,
    #[serde(default)]
    pub dewpoint: Option<Vec<f64>>,
}

/// The external profile source: modeled soundings for given space-time
/// points on a caller-supplied descending pressure grid. Retrieval, caching
/// and interpolation all live behind this boundary.
pub trait VirtualRadiosonde {
    fn profiles(
        &self,
        points: &[GuessPoint],
        levels: &[f64],
        cache_dir: &Path,
    ) -> Result<Vec<SoundingProfile>>;
}

/// Consumes the collaborator's pre-fetched output: a `profiles.json` array
/// left in the cache directory by the sonde narrator, one entry per point in
/// point order.
#[derive(Debug, Default)]
pub struct ProfileArchive;

impl VirtualRadiosonde for ProfileArchive {
    fn profiles(
        &self,
        points: &[GuessPoint],
        levels: &[f64],
        cache_dir: &Path,
    ) -> Result<Vec<SoundingProfile>> {
        let path = cache_dir.join("profiles.json");
        log::info!("Loading {:?}...", path);
        let file = File::open(path)?;
        let profiles: Vec<SoundingProfile> = serde_json::from_reader(BufReader::new(file))?;
        if profiles.len() < points.len() {
            return Err(SondeError::ProfileCount {
                expected: points.len(),
                actual: profiles.len(),
            });
        }
        // the narrator may have cached more soundings than this run asks for
        let profiles: Vec<_> = profiles.into_iter().take(points.len()).collect();
        for (index, profile) in profiles.iter().enumerate() {
            for actual in [profile.temperature.len(), profile.pressure.len()] {
                if actual != levels.len() {
                    return Err(SondeError::LevelCount {
                        index,
                        expected: levels.len(),
                        actual,
                    });
                }
            }
        }
        Ok(profiles)
    }
}
