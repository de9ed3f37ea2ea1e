use crate::error::ConvertError;
use ifcduck_parser::{StepHeader, parse_header};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Upper bound on how much of a file is read looking for the end of its header.
const MAX_HEADER_BYTES: usize = 1024 * 1024;

/// True for a line that starts with `ENDSEC;`, the end of the HEADER section.
fn closes_header(line: &str) -> bool {
    line.trim_start()
        .get(..7)
        .is_some_and(|word| word.eq_ignore_ascii_case("ENDSEC;"))
}

/// An IFC file that has been opened and whose header was read.
///
/// Only the HEADER section is loaded; entity data stays on disk for the
/// converter to read.
#[derive(Debug, Clone)]
pub struct IfcDocument {
    path: PathBuf,
    header: StepHeader,
}

impl IfcDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConvertError> {
        let path = path.as_ref().to_path_buf();
        let mut reader = BufReader::new(File::open(&path)?);

        let mut head = String::new();
        let mut buf = Vec::new();
        while head.len() < MAX_HEADER_BYTES {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            head.push_str(&line);
            if closes_header(&line) {
                break;
            }
        }

        let header = parse_header(&head).map_err(|source| ConvertError::Header {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), schema = ?header.schema(), "opened IFC document");
        Ok(Self { path, header })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema identifier, e.g. `IFC2X3` or `IFC4`.
    pub fn schema(&self) -> &str {
        // parse_header guarantees at least one schema
        self.header.schema().unwrap_or_default()
    }

    pub fn header(&self) -> &StepHeader {
        &self.header
    }
}
