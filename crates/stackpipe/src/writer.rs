use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use stackpipe_core::error::WriteError;
use stackpipe_core::record::Record;
use stackpipe_core::resource::ResourceType;
use stackpipe_core::table::write_csv;

/// Write a resource type's records to `<output_dir>/stackoverflow_<type>.csv`
///
/// The directory is created if needed. Rows go to a temporary sibling first
/// and are renamed into place, so a failure never leaves a partial file under
/// the final name. Returns the final path and the number of rows written.
pub fn write_resource(
    output_dir: &Path,
    resource: ResourceType,
    records: &[Record],
) -> Result<(PathBuf, usize), WriteError> {
    fs::create_dir_all(output_dir).map_err(|e| WriteError::new(resource, output_dir, e))?;

    let path = output_dir.join(resource.file_name());
    let tmp_path = path.with_extension("csv.tmp");

    let rows = File::create(&tmp_path)
        .map_err(|e| WriteError::new(resource, &tmp_path, e))
        .and_then(|file| {
            write_csv(BufWriter::new(file), resource, records)
                .map_err(|e| WriteError::new(resource, &tmp_path, e))
        });

    let rows = match rows {
        Ok(rows) => rows,
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
    };

    if let Err(e) = fs::rename(&tmp_path, &path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(WriteError::new(resource, &path, e));
    }

    Ok((path, rows))
}
