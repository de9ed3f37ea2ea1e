use crate::document::IfcDocument;
use crate::error::ConvertError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Python entry point handed to the interpreter; materialized to a temp dir per run.
const PATCH_SHIM_SOURCE: &str = include_str!("../shim/patch_shim.py");

const DEFAULT_PYTHON: &str = "python3";

/// Prefix of the shim's result line on stdout.
const OUTPUT_MARKER: &str = "OUTPUT:";

/// What the converter should emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOptions {
    /// Create every table of the IFC schema, not only the populated ones.
    pub full_schema: bool,
    pub geometry: bool,
    pub psets: bool,
    /// Store inverse relationships alongside the forward attributes.
    pub inverses: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            full_schema: true,
            geometry: true,
            psets: true,
            inverses: true,
        }
    }
}

/// A single-shot document converter.
pub trait Converter {
    /// Run the conversion. Partial output left behind on failure belongs to the
    /// converter and is not cleaned up here.
    fn patch(&mut self) -> Result<(), ConvertError>;

    /// Where the database was written, once `patch` succeeded and produced a file.
    fn output(&self) -> Option<&Path>;
}

/// Drives the `ifc2duckdb` Python package through an interpreter subprocess.
pub struct Patcher<'a> {
    document: &'a IfcDocument,
    destination: PathBuf,
    options: PatchOptions,
    python: PathBuf,
    output: Option<PathBuf>,
}

impl<'a> Patcher<'a> {
    pub fn new<P: Into<PathBuf>>(
        document: &'a IfcDocument,
        destination: P,
        options: PatchOptions,
    ) -> Self {
        Self {
            document,
            destination: destination.into(),
            options,
            python: PathBuf::from(DEFAULT_PYTHON),
            output: None,
        }
    }

    /// Use a specific interpreter, e.g. one from a virtualenv that has `ifc2duckdb` installed.
    pub fn set_python<P: AsRef<Path>>(mut self, python: P) -> Self {
        self.python = python.as_ref().to_path_buf();
        self
    }

    pub fn options(&self) -> PatchOptions {
        self.options
    }

    fn command(&self, shim: &Path) -> Command {
        let flag = |on: bool| if on { "1" } else { "0" };
        let mut cmd = Command::new(&self.python);
        cmd.arg(shim)
            .arg(self.document.path())
            .arg(&self.destination)
            .arg(flag(self.options.full_schema))
            .arg(flag(self.options.geometry))
            .arg(flag(self.options.psets))
            .arg(flag(self.options.inverses));
        cmd
    }
}

impl Converter for Patcher<'_> {
    fn patch(&mut self) -> Result<(), ConvertError> {
        self.output = None;

        let shim_dir = tempfile::tempdir()?;
        let shim = shim_dir.path().join("patch_shim.py");
        fs::write(&shim, PATCH_SHIM_SOURCE)?;

        info!(
            ifc = %self.document.path().display(),
            schema = self.document.schema(),
            database = %self.destination.display(),
            options = ?self.options,
            "starting conversion"
        );
        let start = Instant::now();
        let out = self
            .command(&shim)
            .output()
            .map_err(|source| ConvertError::Spawn {
                program: self.python.display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&out.stderr).trim_end().to_string();
        if !out.status.success() {
            return Err(ConvertError::Converter {
                status: out.status.code(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            debug!(stderr = %stderr, "converter stderr");
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        let reported = reported_output(&stdout);

        match reported {
            Some(path) if path.exists() => {
                info!(
                    database = %path.display(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "conversion finished"
                );
                self.output = Some(path);
            }
            Some(path) => warn!(path = %path.display(), "converter reported a missing output file"),
            None => warn!("converter reported no output"),
        }
        Ok(())
    }

    fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Path from the last `OUTPUT:` line. Other stdout lines are ignored, and an
/// empty path means the converter produced nothing.
fn reported_output(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| line.trim_end().strip_prefix(OUTPUT_MARKER))
        .last()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IFC: &str = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\n";

    #[test]
    fn command_passes_document_destination_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let ifc = dir.path().join("model.ifc");
        fs::write(&ifc, IFC).unwrap();
        let doc = IfcDocument::open(&ifc).unwrap();

        let options = PatchOptions {
            geometry: false,
            inverses: false,
            ..PatchOptions::default()
        };
        let patcher = Patcher::new(&doc, "out.duckdb", options).set_python("/opt/py/bin/python");
        let cmd = patcher.command(Path::new("shim.py"));

        assert_eq!(cmd.get_program(), "/opt/py/bin/python");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "shim.py".to_string(),
                ifc.display().to_string(),
                "out.duckdb".to_string(),
                "1".to_string(),
                "0".to_string(),
                "1".to_string(),
                "0".to_string(),
            ]
        );
    }

    #[test]
    fn shim_is_embedded() {
        assert!(PATCH_SHIM_SOURCE.contains("ifc2duckdb.Patcher"));
        assert!(PATCH_SHIM_SOURCE.contains(OUTPUT_MARKER));
    }

    #[test]
    fn only_marked_lines_report_output() {
        assert_eq!(reported_output("OUTPUT:/tmp/a.duckdb\n"), Some(PathBuf::from("/tmp/a.duckdb")));
        assert_eq!(
            reported_output("Creating tables...\nOUTPUT:out.duckdb\nbye\n"),
            Some(PathBuf::from("out.duckdb"))
        );
        assert_eq!(reported_output("Creating tables...\n/tmp/progress.log\nOUTPUT:\n"), None);
        assert_eq!(reported_output("/tmp/a.duckdb\n"), None);
        assert_eq!(reported_output(""), None);
    }
}
