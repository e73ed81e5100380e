use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Size tag written for every uploaded photo.
pub const SIZE_TAG: &str = "z";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub file_name: String,
    #[serde(rename = "size")]
    pub size_tag: String,
}

impl TransferRecord {
    pub fn new(file_name: String) -> TransferRecord {
        TransferRecord {
            file_name,
            size_tag: SIZE_TAG.to_string(),
        }
    }
}

/// Write all records as a JSON array, replacing whatever was at `path`.
pub fn write_manifest(path: &Path, records: &[TransferRecord]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records.serialize(&mut ser)?;
    writer.flush()
}
