//! Local save: write an export under `<dir_root>/download` and derive its URL.

use std::fs::{self, File};
use std::path::Path;

use tabkit_io_table::{Result, TableError};

use crate::conf::C_DIR_DOWNLOAD;
use crate::spec::{EnumExportFormat, SpecSavedExport};

/// Create `<dir_root>/download` if needed, open `<millis><suffix>` in it and
/// hand the file to `write_fn`.
///
/// The returned URL is `<url_prefix>/<millis><suffix>` with `\` normalized
/// to `/`.
pub fn save_export<T, F>(
    dir_root: &Path,
    url_prefix: &str,
    format: EnumExportFormat,
    write_fn: F,
) -> Result<SpecSavedExport<T>>
where
    F: FnOnce(File) -> Result<T>,
{
    let path_dir = dir_root.join(C_DIR_DOWNLOAD);
    fs::create_dir_all(&path_dir)
        .map_err(|err| TableError::io(format!("create {}", path_dir.display()), err))?;

    let c_filename = format!(
        "{}{}",
        chrono::Utc::now().timestamp_millis(),
        format.suffix()
    );
    let path_file = path_dir.join(&c_filename);
    let file = File::create(&path_file)
        .map_err(|err| TableError::io(format!("create {}", path_file.display()), err))?;
    log::debug!("saving export to {}", path_file.display());

    let value = write_fn(file)?;
    let c_url = format!("{}/{c_filename}", url_prefix.trim_end_matches(['/', '\\']))
        .replace('\\', "/");

    Ok(SpecSavedExport {
        path_file,
        c_url,
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tabkit_io_table::{EnumCellValue, SpecHeader};
    use tabkit_io_xlsx::EnumWorkbookKind;

    use super::*;
    use crate::export::export_by_keyed_rows;
    use crate::spec::{EnumExportTarget, SpecExportOptions};

    #[test]
    fn test_save_export_creates_download_dir_and_url() {
        let dir_root = tempfile::tempdir().unwrap();

        let saved = save_export(
            dir_root.path(),
            "http:\\\\host\\files\\",
            EnumExportFormat::Csv,
            |mut file| {
                file.write_all(b"k\r\n")
                    .map_err(|err| TableError::io("write", err))?;
                Ok(3usize)
            },
        )
        .unwrap();

        assert_eq!(saved.value, 3);
        assert_eq!(saved.path_file.parent().unwrap(), dir_root.path().join("download"));
        assert_eq!(fs::read(&saved.path_file).unwrap(), b"k\r\n");

        let c_filename = saved.path_file.file_name().unwrap().to_str().unwrap();
        assert!(c_filename.ends_with(".csv"));
        assert!(c_filename.trim_end_matches(".csv").parse::<i64>().is_ok());
        assert_eq!(saved.c_url, format!("http://host/files/{c_filename}"));
    }

    #[test]
    fn test_save_export_hands_file_to_sheet_engine() {
        let dir_root = tempfile::tempdir().unwrap();
        let header = SpecHeader::from_field_keys(["k"]).unwrap();
        let rows = vec![vec![("k".to_string(), EnumCellValue::from("v"))]
            .into_iter()
            .collect::<std::collections::BTreeMap<_, _>>()];
        let target = EnumExportTarget::Workbook {
            kind: EnumWorkbookKind::Modern,
            sheet_name: "s".to_string(),
        };

        let saved = save_export(dir_root.path(), "/static", EnumExportFormat::Xlsx, |file| {
            export_by_keyed_rows(&header, &rows, &target, file, &SpecExportOptions::default())
        })
        .unwrap();

        assert_eq!(saved.value.n_rows_written(), 1);
        assert!(saved.c_url.starts_with("/static/"));
        assert!(saved.c_url.ends_with(".xlsx"));
        assert!(fs::metadata(&saved.path_file).unwrap().len() > 0);
    }

    #[test]
    fn test_save_export_propagates_writer_error() {
        let dir_root = tempfile::tempdir().unwrap();
        let err = save_export(dir_root.path(), "", EnumExportFormat::Xls, |_file| {
            Err::<(), _>(TableError::Config("nothing to write".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, TableError::Config(_)));
    }
}
