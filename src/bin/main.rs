use std::path::PathBuf;

use log::LevelFilter;
use shis2mirto::{create_first_guess, create_fov_file, sonde::ProfileArchive, AngleWindow};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "shis2mirto",
    about = "Converting Scanning HIS granules into Mirto retrieval inputs"
)]
struct Opt {
    /// Only error output
    #[structopt(short, long)]
    quiet: bool,
    /// Enable more informational output
    #[structopt(short, long)]
    verbose: bool,
    /// Enable debug output
    #[structopt(short = "w", long)]
    debug: bool,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Generate an fov.nc file from an input Scanning HIS data file
    CreateFovFile {
        /// An input Scanning HIS radiance file
        #[structopt(short = "s", long)]
        shis_in: PathBuf,
        /// The base fov file to take the desired wavenumbers from
        #[structopt(short = "f", long)]
        fov_base: PathBuf,
        /// Path to the output directory
        #[structopt(short = "p", long, default_value = "./")]
        output_path: PathBuf,
        /// The central fov angle considered when selecting observations
        #[structopt(short = "c", long, default_value = "0.0")]
        center_angle: f64,
        /// How far to either side of the central fov angle to look
        #[structopt(short = "r", long, default_value = "1.5")]
        angle_range: f64,
        /// Largest acceptable wavenumber mismatch; closest wins when unset
        #[structopt(short = "t", long)]
        tolerance: Option<f64>,
    },
    /// Generate a firstguess.nc file for an existing fov product
    CreateFirstGuess {
        /// An fov file written by create-fov-file
        #[structopt(short = "f", long)]
        fov_in: PathBuf,
        /// A file listing the first-guess pressure levels
        #[structopt(short = "l", long)]
        levels: PathBuf,
        /// Directory holding the virtual radiosonde output
        #[structopt(long, default_value = "./cache")]
        cache_dir: PathBuf,
        /// Path to the output directory
        #[structopt(short = "p", long, default_value = "./")]
        output_path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let level = if opt.debug {
        LevelFilter::Debug
    } else if opt.verbose {
        LevelFilter::Info
    } else if opt.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();

    match opt.command {
        Command::CreateFovFile {
            shis_in,
            fov_base,
            output_path,
            center_angle,
            angle_range,
            tolerance,
        } => {
            let window = AngleWindow::new(center_angle, angle_range);
            let path = create_fov_file(&shis_in, &fov_base, &output_path, &window, tolerance)?;
            println!("{}", path.display());
        }
        Command::CreateFirstGuess {
            fov_in,
            levels,
            cache_dir,
            output_path,
        } => {
            let path = create_first_guess(
                &fov_in,
                &levels,
                &cache_dir,
                &output_path,
                &ProfileArchive,
            )?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
