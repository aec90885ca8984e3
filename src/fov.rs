use std::path::{Path, PathBuf};

use itertools::izip;
use ndarray::Array2;

use crate::{
    channels,
    geometry::AngleWindow,
    scan::{self, Scan, ScanLoader},
    schema::{FovBaseSchema, FovSchema, ShisSchema},
    sonde::GuessPoint,
    time, Error,
};

#[derive(thiserror::Error, Debug)]
pub enum FovError {
    #[error("failed to access the fov file")]
    NetCdf(#[from] netcdf::Error),
    #[error("variable `{0}` is missing from the fov file")]
    MissingVariable(String),
}
type Result<T> = std::result::Result<T, FovError>;

/// The fov product: the accepted observations with their full and
/// channel-selected radiances, ready to be written out for Mirto.
#[derive(Debug, Clone)]
pub struct FovProduct {
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub fov_angle: Vec<f64>,
    pub base_time: f64,
    pub time_offset: Vec<f64>,
    /// Serial calendar date per observation (see [`time::datenum`]).
    pub obs_time: Vec<f64>,
    pub radiance: Array2<f64>,
    pub wavenumber: Vec<f64>,
    pub sel_wavenumber: Vec<f64>,
    pub channel_index: Vec<usize>,
    pub sel_radiance: Array2<f64>,
}

impl FovProduct {
    /// Match the requested wavenumbers against the instrument grid, mask the
    /// scan by viewing angle and gather the product arrays.
    ///
    /// An unmatched wavenumber aborts the whole assembly; an empty angle
    /// selection does not, it only shrinks the observation dimension to
    /// zero.
    pub fn assemble(
        scan: &Scan,
        desired: &[f64],
        window: &AngleWindow,
        tolerance: Option<f64>,
    ) -> std::result::Result<Self, Error> {
        let channel_index = channels::match_wavenumbers(&scan.wavenumber, desired, tolerance)?;
        let mask = window.mask(&scan.fov_angle);
        let subset = scan.select(&mask, &channel_index);
        log::debug!("num obs:          {}", subset.len());
        log::debug!("num channels:     {}", scan.channels());
        log::debug!("num sel channels: {}", channel_index.len());

        let obs_epoch = time::obs_epoch(scan.base_time, &subset.time_offset);
        let obs_time = time::datenums(&obs_epoch)?;

        Ok(Self {
            longitude: subset.longitude,
            latitude: subset.latitude,
            fov_angle: subset.fov_angle,
            base_time: scan.base_time,
            time_offset: subset.time_offset,
            obs_time,
            radiance: subset.radiance,
            sel_wavenumber: channel_index.iter().map(|&i| scan.wavenumber[i]).collect(),
            wavenumber: scan.wavenumber.clone(),
            channel_index,
            sel_radiance: subset.selected_radiance,
        })
    }

    /// Number of accepted observations.
    pub fn len(&self) -> usize {
        self.fov_angle.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the product into `dir` under the schema's file name, laid out
    /// flat (no groups, no chunking, no compression) the way Mirto reads it.
    /// A partially written file is removed before the error is returned, so
    /// no unusable product is left behind.
    pub fn write(&self, dir: &Path, schema: &FovSchema) -> Result<PathBuf> {
        let path = dir.join(schema.file_name);
        match self.write_into(&path, schema) {
            Ok(()) => {
                log::info!("Finished saving {} to {:?}", schema.file_name, dir);
                Ok(path)
            }
            Err(error) => {
                let _ = std::fs::remove_file(&path);
                Err(error)
            }
        }
    }

    fn write_into(&self, path: &Path, schema: &FovSchema) -> Result<()> {
        let obs = self.len();
        let channels = self.wavenumber.len();
        let selected = self.channel_index.len();
        for (name, actual) in [
            (schema.longitude, self.longitude.len()),
            (schema.latitude, self.latitude.len()),
            (schema.time_offset, self.time_offset.len()),
            (schema.obs_time, self.obs_time.len()),
        ] {
            assert_eq!(
                actual, obs,
                "variable `{name}` does not share the observation dimension"
            );
        }
        assert_eq!(self.radiance.dim(), (obs, channels));
        assert_eq!(self.sel_radiance.dim(), (obs, selected));
        assert_eq!(self.sel_wavenumber.len(), selected);

        let mut file = netcdf::create(path)?;
        file.add_dimension(schema.obs_dim, obs)?;
        file.add_dimension(schema.channels_dim, channels)?;
        file.add_dimension(schema.selected_dim, selected)?;

        put_vector(
            &mut file,
            schema.longitude,
            schema.obs_dim,
            &self.longitude,
            Some("degrees_east"),
        )?;
        put_vector(
            &mut file,
            schema.latitude,
            schema.obs_dim,
            &self.latitude,
            Some("degrees_north"),
        )?;
        put_vector(
            &mut file,
            schema.fov_angle,
            schema.obs_dim,
            &self.fov_angle,
            Some("degrees"),
        )?;
        let mut base_time = file.add_variable::<f64>(schema.base_time, &[])?;
        base_time.put_attribute("units", "seconds since 1970-01-01 00:00:00")?;
        base_time.put_values(&[self.base_time], ..)?;
        put_vector(
            &mut file,
            schema.time_offset,
            schema.obs_dim,
            &self.time_offset,
            Some("seconds"),
        )?;
        put_vector(
            &mut file,
            schema.obs_time,
            schema.obs_dim,
            &self.obs_time,
            Some("days since 0000-01-01 00:00:00"),
        )?;

        put_matrix(
            &mut file,
            schema.radiance,
            (schema.obs_dim, schema.channels_dim),
            &self.radiance,
        )?;
        put_vector(
            &mut file,
            schema.wavenumber,
            schema.channels_dim,
            &self.wavenumber,
            None,
        )?;
        put_vector(
            &mut file,
            schema.sel_wavenumber,
            schema.selected_dim,
            &self.sel_wavenumber,
            None,
        )?;
        let offset = schema.index_base.offset();
        let indexes: Vec<f64> = self
            .channel_index
            .iter()
            .map(|&i| (i + offset) as f64)
            .collect();
        put_vector(
            &mut file,
            schema.channel_index,
            schema.selected_dim,
            &indexes,
            None,
        )?;
        put_matrix(
            &mut file,
            schema.sel_radiance,
            (schema.obs_dim, schema.selected_dim),
            &self.sel_radiance,
        )?;
        Ok(())
    }
}

fn put_vector(
    file: &mut netcdf::FileMut,
    name: &str,
    dim: &str,
    values: &[f64],
    units: Option<&str>,
) -> Result<()> {
    let mut variable = file.add_variable::<f64>(name, &[dim])?;
    if let Some(units) = units {
        variable.put_attribute("units", units)?;
    }
    if !values.is_empty() {
        variable.put_values(values, ..)?;
    }
    Ok(())
}

fn put_matrix(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: (&str, &str),
    values: &Array2<f64>,
) -> Result<()> {
    let mut variable = file.add_variable::<f64>(name, &[dims.0, dims.1])?;
    let (rows, columns) = values.dim();
    if rows > 0 && columns > 0 {
        let flat: Vec<f64> = values.iter().copied().collect();
        variable.put_values(&flat, (&[0, 0], &[rows, columns]))?;
    }
    Ok(())
}

/// The geolocation and timing of an existing fov product, read back as the
/// input of the first-guess path.
#[derive(Debug, Clone)]
pub struct FovGeo {
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub base_time: f64,
    pub time_offset: Vec<f64>,
}
impl FovGeo {
    pub fn read(path: &Path, schema: &FovSchema) -> Result<Self> {
        log::info!("Loading {:?}...", path);
        let file = netcdf::open(path)?;
        let load = |name: &str| -> Result<Vec<f64>> {
            file.variable(name)
                .ok_or_else(|| FovError::MissingVariable(name.to_string()))?
                .get_values::<f64, _>(..)
                .map_err(FovError::from)
        };
        let base_time = load(schema.base_time)?
            .first()
            .copied()
            .ok_or_else(|| FovError::MissingVariable(schema.base_time.to_string()))?;
        Ok(Self {
            longitude: load(schema.longitude)?,
            latitude: load(schema.latitude)?,
            base_time,
            time_offset: load(schema.time_offset)?,
        })
    }

    pub fn len(&self) -> usize {
        self.time_offset.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One virtual radiosonde request point per observation, in product
    /// order.
    pub fn points(&self) -> std::result::Result<Vec<GuessPoint>, crate::time::TimeError> {
        izip!(&self.time_offset, &self.latitude, &self.longitude)
            .map(|(&offset, &latitude, &longitude)| {
                Ok(GuessPoint {
                    time: time::to_datetime(self.base_time + offset)?,
                    latitude,
                    longitude,
                })
            })
            .collect()
    }
}

/// Generate an fov file from an input Scanning HIS data file.
///
/// Runs the whole conversion: load the granule, match the wavenumbers
/// requested by the base fov file, mask by viewing angle, derive the
/// calendar times and write the product into `output_dir`.
pub fn create_fov_file(
    shis_path: &Path,
    fov_base: &Path,
    output_dir: &Path,
    window: &AngleWindow,
    tolerance: Option<f64>,
) -> std::result::Result<PathBuf, Error> {
    log::info!("Generating FOV file from SHIS data");
    let scan = ScanLoader::default()
        .data_path(shis_path)
        .schema(ShisSchema::default())
        .load()?;
    let desired = scan::load_wavenumber_list(fov_base, FovBaseSchema::default().wavenumber)?;
    log::debug!("desired wave numbers: {:?}", desired);
    let product = FovProduct::assemble(&scan, &desired, window, tolerance)?;
    product
        .write(output_dir, &FovSchema::default())
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn synthetic_scan() -> Scan {
        let records = 5;
        let channels = 4;
        Scan {
            wavenumber: vec![670.0, 670.625, 671.25, 671.875],
            fov_angle: vec![-2.0, -1.0, 0.0, 1.0, 2.0],
            longitude: (0..records).map(|k| -89.0 + k as f64 * 0.1).collect(),
            latitude: (0..records).map(|k| 43.0 + k as f64 * 0.1).collect(),
            base_time: 946_684_800.0,
            time_offset: (0..records).map(|k| k as f64).collect(),
            radiance: Array2::from_shape_fn((records, channels), |(k, c)| {
                k as f64 * 10.0 + c as f64
            }),
        }
    }

    #[test]
    fn assemble_keeps_row_and_column_correspondence() {
        let scan = synthetic_scan();
        let product = FovProduct::assemble(
            &scan,
            &[670.9, 671.875],
            &AngleWindow::new(0.0, 1.5),
            None,
        )
        .unwrap();
        assert_eq!(product.len(), 3);
        assert_eq!(product.channel_index, vec![1, 3]);
        assert_eq!(product.sel_wavenumber, vec![670.625, 671.875]);
        // rows are the mask-true records 1..=3, columns the matched channels
        for (k, record) in (1usize..=3).enumerate() {
            assert_eq!(product.fov_angle[k], scan.fov_angle[record]);
            for (j, &channel) in product.channel_index.iter().enumerate() {
                assert_eq!(
                    product.sel_radiance[[k, j]],
                    scan.radiance[[record, channel]]
                );
            }
        }
        // serial dates line up with base + offset
        assert_eq!(product.obs_time[0], 730_486.0 + 1.0 / 86_400.0);
    }

    #[test]
    fn unmatched_wavenumber_aborts_the_assembly() {
        let scan = synthetic_scan();
        assert!(FovProduct::assemble(
            &scan,
            &[670.625, 900.0],
            &AngleWindow::default(),
            None
        )
        .is_err());
    }

    #[test]
    fn write_read_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let scan = synthetic_scan();
        let schema = FovSchema::default();
        let product =
            FovProduct::assemble(&scan, &[670.9], &AngleWindow::new(0.0, 1.5), None).unwrap();
        let path = product.write(dir.path(), &schema)?;

        let file = netcdf::open(&path)?;
        assert_eq!(file.dimension(schema.obs_dim).unwrap().len(), 3);
        assert_eq!(file.dimension(schema.channels_dim).unwrap().len(), 4);
        assert_eq!(file.dimension(schema.selected_dim).unwrap().len(), 1);
        let sel = file
            .variable(schema.sel_radiance)
            .unwrap()
            .get_values::<f64, _>(..)?;
        assert_eq!(sel, vec![11.0, 21.0, 31.0]);
        // default schema numbers the selected channels from one
        let indexes = file
            .variable(schema.channel_index)
            .unwrap()
            .get_values::<f64, _>(..)?;
        assert_eq!(indexes, vec![2.0]);
        drop(file);

        let geo = FovGeo::read(&path, &schema)?;
        assert_eq!(geo.len(), 3);
        assert_eq!(geo.base_time, scan.base_time);
        let points = geo.points()?;
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].latitude, scan.latitude[1]);
        Ok(())
    }

    #[test]
    fn empty_selection_still_writes_a_valid_product(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let scan = synthetic_scan();
        let schema = FovSchema::default();
        let product =
            FovProduct::assemble(&scan, &[670.625], &AngleWindow::new(30.0, 0.5), None).unwrap();
        assert!(product.is_empty());
        let path = product.write(dir.path(), &schema)?;

        let file = netcdf::open(&path)?;
        assert_eq!(file.dimension(schema.obs_dim).unwrap().len(), 0);
        assert_eq!(file.dimension(schema.channels_dim).unwrap().len(), 4);
        let wavenumber = file
            .variable(schema.wavenumber)
            .unwrap()
            .get_values::<f64, _>(..)?;
        assert_eq!(wavenumber, scan.wavenumber);
        Ok(())
    }
}
