pub mod channels;
mod error;
pub mod firstguess;
pub mod fov;
pub mod geometry;
pub mod scan;
pub mod schema;
pub mod sonde;
pub mod time;

pub use error::Error;
pub use firstguess::create_first_guess;
pub use fov::{create_fov_file, FovProduct};
pub use geometry::AngleWindow;
pub use scan::{Scan, ScanLoader};
