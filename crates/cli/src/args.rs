use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Convert PLY polygon files to POV-Ray RAW triangle format.
///
/// Polygonal faces are fan-triangulated; the output carries one triangle
/// per line as nine space-separated coordinates. The following PLY
/// declarations are supported:
///
///   element vertex
///     property float x / y / z
///   element face
///     property list uchar int vertex_indices
///
/// Other elements are skipped with a warning; other properties under
/// vertex or face fail the conversion.
#[derive(Parser, Debug)]
#[command(
    name = "ply2raw",
    version,
    about,
    verbatim_doc_comment,
    disable_version_flag = true
)]
pub struct Args {
    /// Input PLY file; `-` or absent reads standard input.
    pub input: Option<PathBuf>,

    /// Output RAW file; `-` or absent writes standard output.
    pub output: Option<PathBuf>,

    /// Print version information and exit.
    // Declared by hand to keep the short form lowercase.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}
