use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use ndarray::{Array2, Axis};

use crate::schema::ShisSchema;

#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("failed to access the input file")]
    NetCdf(#[from] netcdf::Error),
    #[error("variable `{0}` is missing from the input file")]
    MissingVariable(String),
    #[error("variable `{name}` has {actual} records where {expected} were expected")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("radiance layout does not factor into observations x channels")]
    RadianceShape(#[from] ndarray::ShapeError),
}
type Result<T> = std::result::Result<T, ScanError>;

/// One Scanning HIS granule: per-observation geolocation, viewing geometry
/// and timing, plus the radiance spectra (observations x channels). Record k
/// of every per-observation array belongs to the same physical observation.
#[derive(Debug, Clone)]
pub struct Scan {
    pub wavenumber: Vec<f64>,
    pub fov_angle: Vec<f64>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub base_time: f64,
    pub time_offset: Vec<f64>,
    pub radiance: Array2<f64>,
}
impl Scan {
    /// Number of scan records.
    pub fn len(&self) -> usize {
        self.fov_angle.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Number of spectral channels.
    pub fn channels(&self) -> usize {
        self.wavenumber.len()
    }

    /// Restrict the scan to the mask-true records and, for the selected
    /// radiances, to the channels listed in `channel_index`.
    ///
    /// Record k of every output array is the k-th accepted input record, in
    /// input order; column j of the selected radiances is the full-radiance
    /// column `channel_index[j]`, in the order the channels were requested.
    pub fn select(&self, mask: &[bool], channel_index: &[usize]) -> ScanSubset {
        assert_eq!(
            mask.len(),
            self.len(),
            "selection mask length differs from the record count"
        );
        let records: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(record, &keep)| keep.then_some(record))
            .collect();
        let pick = |values: &[f64]| -> Vec<f64> { records.iter().map(|&k| values[k]).collect() };
        let radiance = self.radiance.select(Axis(0), &records);
        let selected_radiance = radiance.select(Axis(1), channel_index);
        ScanSubset {
            longitude: pick(&self.longitude),
            latitude: pick(&self.latitude),
            fov_angle: pick(&self.fov_angle),
            time_offset: pick(&self.time_offset),
            radiance,
            selected_radiance,
        }
    }
}

/// The mask-selected records of a [`Scan`].
#[derive(Debug, Clone)]
pub struct ScanSubset {
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub fov_angle: Vec<f64>,
    pub time_offset: Vec<f64>,
    pub radiance: Array2<f64>,
    pub selected_radiance: Array2<f64>,
}
impl ScanSubset {
    pub fn len(&self) -> usize {
        self.fov_angle.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads a Scanning HIS granule from its netCDF file.
pub struct ScanLoader {
    path: PathBuf,
    schema: ShisSchema,
}
impl Default for ScanLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("shis.nc"),
            schema: ShisSchema::default(),
        }
    }
}
impl ScanLoader {
    pub fn data_path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn schema(self, schema: ShisSchema) -> Self {
        Self { schema, ..self }
    }
    /// Loads the granule, checking that every per-observation variable
    /// shares the viewing angle's record count.
    pub fn load(self) -> Result<Scan> {
        log::info!("Loading {:?}...", self.path);
        let now = Instant::now();
        let file = netcdf::open(&self.path)?;

        let wavenumber = load_vector(&file, self.schema.wavenumber)?;
        let fov_angle = load_vector(&file, self.schema.fov_angle)?;
        let longitude = load_vector(&file, self.schema.longitude)?;
        let latitude = load_vector(&file, self.schema.latitude)?;
        let time_offset = load_vector(&file, self.schema.time_offset)?;
        let base_time = load_scalar(&file, self.schema.base_time)?;

        let records = fov_angle.len();
        for (name, actual) in [
            (self.schema.longitude, longitude.len()),
            (self.schema.latitude, latitude.len()),
            (self.schema.time_offset, time_offset.len()),
        ] {
            if actual != records {
                return Err(ScanError::LengthMismatch {
                    name: name.to_string(),
                    expected: records,
                    actual,
                });
            }
        }

        let radiance = {
            let values = load_vector(&file, self.schema.radiance)?;
            Array2::from_shape_vec((records, wavenumber.len()), values)?
        };
        log::debug!("radiances shape:  {:?}", radiance.dim());
        log::info!("... loaded in {:}s", now.elapsed().as_secs());

        Ok(Scan {
            wavenumber,
            fov_angle,
            longitude,
            latitude,
            base_time,
            time_offset,
            radiance,
        })
    }
}

/// Loads a 1-D wavenumber list and sorts it ascending, ready for matching.
pub fn load_wavenumber_list(path: &Path, name: &str) -> Result<Vec<f64>> {
    let file = netcdf::open(path)?;
    let mut values = load_vector(&file, name)?;
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    Ok(values)
}

fn load_vector(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    let variable = file
        .variable(name)
        .ok_or_else(|| ScanError::MissingVariable(name.to_string()))?;
    Ok(variable.get_values::<f64, _>(..)?)
}

fn load_scalar(file: &netcdf::File, name: &str) -> Result<f64> {
    load_vector(file, name)?
        .first()
        .copied()
        .ok_or_else(|| ScanError::MissingVariable(name.to_string()))
}
