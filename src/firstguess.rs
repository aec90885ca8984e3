use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

use ndarray::Array3;

use crate::{
    fov::FovGeo,
    schema::{FirstGuessSchema, FovSchema, LevelsSchema},
    sonde::{SoundingProfile, VirtualRadiosonde},
    Error,
};

#[derive(thiserror::Error, Debug)]
pub enum FirstGuessError {
    #[error("failed to access the first-guess file")]
    NetCdf(#[from] netcdf::Error),
    #[error("variable `{0}` is missing from the pressure levels file")]
    MissingVariable(String),
    #[error(
        "the profile field to state variable mapping has not been settled \
         upstream; refusing to assemble a first guess"
    )]
    StateMappingUndefined,
}
type Result<T> = std::result::Result<T, FirstGuessError>;

/// Pressure levels of the first-guess grid, sorted descending (surface
/// first) the way the virtual radiosonde expects them.
#[derive(Debug, Clone)]
pub struct PressureLevels(Vec<f64>);
impl Deref for PressureLevels {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl PressureLevels {
    /// Loads the level list and sorts it descending.
    pub fn load(path: &Path, schema: &LevelsSchema) -> Result<Self> {
        log::info!("Loading {:?}...", path);
        let file = netcdf::open(path)?;
        let variable = file
            .variable(schema.plevels)
            .ok_or_else(|| FirstGuessError::MissingVariable(schema.plevels.to_string()))?;
        let mut levels = variable.get_values::<f64, _>(..)?;
        levels.sort_by(|a, b| b.partial_cmp(a).unwrap());
        Ok(Self(levels))
    }
}

/// First-guess state on the (observation, level, state variable) grid.
#[derive(Debug, Clone)]
pub struct FirstGuessProduct {
    pub lin_point: Array3<f64>,
    pub first_guess: Array3<f64>,
    pub pressure_grid: Vec<f64>,
    pub sel_lin_point: Array3<f64>,
    pub sel_first_guess: Array3<f64>,
}

impl FirstGuessProduct {
    /// Map the collaborator profiles onto the state-variable slots.
    ///
    /// The slot assignment is still owned by the Mirto side and has not been
    /// settled; until it is, assembling a first guess is refused rather than
    /// guessed at.
    pub fn assemble(_profiles: &[SoundingProfile], _levels: &PressureLevels) -> Result<Self> {
        Err(FirstGuessError::StateMappingUndefined)
    }

    pub fn len(&self) -> usize {
        self.first_guess.dim().0
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the product into `dir` under the schema's file name. A
    /// partially written file is removed before the error is returned.
    pub fn write(&self, dir: &Path, schema: &FirstGuessSchema) -> Result<PathBuf> {
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

    fn write_into(&self, path: &Path, schema: &FirstGuessSchema) -> Result<()> {
        let (obs, levels, states) = self.first_guess.dim();
        let selected = self.sel_first_guess.dim().2;
        assert_eq!(self.lin_point.dim(), (obs, levels, states));
        assert_eq!(self.sel_lin_point.dim(), (obs, levels, selected));
        assert_eq!(self.sel_first_guess.dim(), (obs, levels, selected));
        assert_eq!(self.pressure_grid.len(), levels);

        let mut file = netcdf::create(path)?;
        file.add_dimension(schema.obs_dim, obs)?;
        file.add_dimension(schema.levels_dim, levels)?;
        file.add_dimension(schema.state_dim, states)?;
        file.add_dimension(schema.sel_state_dim, selected)?;

        let mut pressure = file.add_variable::<f64>(schema.pressure_grid, &[schema.levels_dim])?;
        pressure.put_attribute("units", "hPa")?;
        if !self.pressure_grid.is_empty() {
            pressure.put_values(&self.pressure_grid, ..)?;
        }
        put_cube(
            &mut file,
            schema.lin_point,
            (schema.obs_dim, schema.levels_dim, schema.state_dim),
            &self.lin_point,
        )?;
        put_cube(
            &mut file,
            schema.first_guess,
            (schema.obs_dim, schema.levels_dim, schema.state_dim),
            &self.first_guess,
        )?;
        put_cube(
            &mut file,
            schema.sel_lin_point,
            (schema.obs_dim, schema.levels_dim, schema.sel_state_dim),
            &self.sel_lin_point,
        )?;
        put_cube(
            &mut file,
            schema.sel_first_guess,
            (schema.obs_dim, schema.levels_dim, schema.sel_state_dim),
            &self.sel_first_guess,
        )?;
        Ok(())
    }
}

fn put_cube(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: (&str, &str, &str),
    values: &Array3<f64>,
) -> Result<()> {
    let mut variable = file.add_variable::<f64>(name, &[dims.0, dims.1, dims.2])?;
    let (n0, n1, n2) = values.dim();
    if n0 > 0 && n1 > 0 && n2 > 0 {
        let flat: Vec<f64> = values.iter().copied().collect();
        variable.put_values(&flat, (&[0, 0, 0], &[n0, n1, n2]))?;
    }
    Ok(())
}

/// Generate a first-guess file for an existing fov product.
///
/// Reads the product's geolocation and timing, asks the virtual radiosonde
/// for one profile per observation point on the requested pressure levels,
/// and hands the profiles to the assembler. The fov product is never
/// touched, whatever happens on this path.
pub fn create_first_guess(
    fov_path: &Path,
    levels_path: &Path,
    cache_dir: &Path,
    output_dir: &Path,
    sonde: &dyn VirtualRadiosonde,
) -> std::result::Result<PathBuf, Error> {
    log::info!("Generating first-guess file from FOV data");
    let geo = FovGeo::read(fov_path, &FovSchema::default())?;
    let points = geo.points()?;
    let levels = PressureLevels::load(levels_path, &LevelsSchema::default())?;
    let profiles = sonde.profiles(&points, &levels, cache_dir)?;
    let product = FirstGuessProduct::assemble(&profiles, &levels)?;
    product
        .write(output_dir, &FirstGuessSchema::default())
        .map_err(Error::from)
}
