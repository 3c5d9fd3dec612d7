//! Top-level error for the bootgrid binary. Every variant is fatal.

use bootgrid_core::BootgridError;
use thiserror::Error;

use crate::render::RenderError;
use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BootgridError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Invalid argument {name}: {details}")]
    InvalidArgument { name: String, details: String },
}
