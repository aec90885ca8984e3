//! Dimension and variable name tables for the files this crate reads and
//! writes. The tables are passed explicitly into the loaders and writers so
//! a pipeline with different conventions only has to swap a schema value.

/// Variable names of the input Scanning HIS radiance file.
#[derive(Debug, Clone)]
pub struct ShisSchema {
    pub wavenumber: &'static str,
    pub fov_angle: &'static str,
    pub radiance: &'static str,
    pub longitude: &'static str,
    pub latitude: &'static str,
    pub base_time: &'static str,
    pub time_offset: &'static str,
}
impl Default for ShisSchema {
    fn default() -> Self {
        Self {
            wavenumber: "wavenumber",
            fov_angle: "FOVangle",
            radiance: "radiance",
            longitude: "Longitude",
            latitude: "Latitude",
            base_time: "base_time",
            time_offset: "time_offset",
        }
    }
}

/// Variable name of the desired wavenumber list in the base fov file.
#[derive(Debug, Clone)]
pub struct FovBaseSchema {
    pub wavenumber: &'static str,
}
impl Default for FovBaseSchema {
    fn default() -> Self {
        Self {
            wavenumber: "wavenumber",
        }
    }
}

/// Numbering convention of the selected channel index variable. The Matlab
/// side of the Mirto pipeline indexes from one, the other consumers from
/// zero; readers of the product must know which one they were given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBase {
    Zero,
    One,
}
impl IndexBase {
    pub fn offset(self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// Dimension and variable names of the output fov file.
#[derive(Debug, Clone)]
pub struct FovSchema {
    pub file_name: &'static str,
    pub obs_dim: &'static str,
    pub channels_dim: &'static str,
    pub selected_dim: &'static str,
    pub longitude: &'static str,
    pub latitude: &'static str,
    pub fov_angle: &'static str,
    pub base_time: &'static str,
    pub time_offset: &'static str,
    pub obs_time: &'static str,
    pub radiance: &'static str,
    pub wavenumber: &'static str,
    pub sel_wavenumber: &'static str,
    pub channel_index: &'static str,
    pub sel_radiance: &'static str,
    pub index_base: IndexBase,
}
impl Default for FovSchema {
    fn default() -> Self {
        Self {
            file_name: "fov.nc",
            obs_dim: "obsnum",
            channels_dim: "channels",
            selected_dim: "selected_channels",
            longitude: "Longitude",
            latitude: "Latitude",
            fov_angle: "FOVangle",
            base_time: "base_time",
            time_offset: "time_offset",
            obs_time: "obstime",
            radiance: "Radiance",
            wavenumber: "Wavenumber",
            sel_wavenumber: "SelWavenumber",
            channel_index: "indxselchannel",
            sel_radiance: "selradiances",
            index_base: IndexBase::One,
        }
    }
}

/// Variable name of the pressure level list used by the first-guess path.
#[derive(Debug, Clone)]
pub struct LevelsSchema {
    pub plevels: &'static str,
}
impl Default for LevelsSchema {
    fn default() -> Self {
        Self { plevels: "plevels" }
    }
}

/// Dimension and variable names of the output first-guess file.
#[derive(Debug, Clone)]
pub struct FirstGuessSchema {
    pub file_name: &'static str,
    pub obs_dim: &'static str,
    pub levels_dim: &'static str,
    pub state_dim: &'static str,
    pub sel_state_dim: &'static str,
    pub lin_point: &'static str,
    pub first_guess: &'static str,
    pub pressure_grid: &'static str,
    pub sel_lin_point: &'static str,
    pub sel_first_guess: &'static str,
}
impl Default for FirstGuessSchema {
    fn default() -> Self {
        Self {
            file_name: "firstguess.nc",
            obs_dim: "obsnum",
            levels_dim: "levels",
            state_dim: "state_vars",
            sel_state_dim: "selected_state_vars",
            lin_point: "LinPoint",
            first_guess: "FirstGuess",
            pressure_grid: "PressureGrid",
            sel_lin_point: "SelLinPoint",
            sel_first_guess: "SelFirstGuess",
        }
    }
}
