use crate::{
    channels::ChannelError, firstguess::FirstGuessError, fov::FovError, scan::ScanError,
    sonde::SondeError, time::TimeError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `channels` module")]
    Channels(#[from] ChannelError),
    #[error("Error in the `scan` module")]
    Scan(#[from] ScanError),
    #[error("Error in the `time` module")]
    Time(#[from] TimeError),
    #[error("Error in the `fov` module")]
    Fov(#[from] FovError),
    #[error("Error in the `sonde` module")]
    Sonde(#[from] SondeError),
    #[error("Error in the `firstguess` module")]
    FirstGuess(#[from] FirstGuessError),
}
