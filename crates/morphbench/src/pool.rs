use std::path::{Path, PathBuf};

use morphbench_image::Image;
use morphbench_io::{jpeg, IoError};

/// Errors raised while loading the image pool.
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    /// The pool directory does not exist or is not a directory.
    #[error(
        "Directory `{0}' does not exist. The directory should contain the testing images."
    )]
    MissingDirectory(PathBuf),

    /// Error while scanning the pool directory.
    #[error("Failed to scan the pool directory. {0}")]
    Io(#[from] std::io::Error),

    /// Error while decoding a pooled image.
    #[error(transparent)]
    Decode(#[from] IoError),
}

/// A pooled test image, decoded on demand.
#[derive(Debug, Clone)]
pub struct PoolRecord {
    path: PathBuf,
}

impl PoolRecord {
    /// The path of the pooled file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the pooled JPEG into an RGB8 image.
    pub fn load(&self) -> Result<Image<u8, 3>, PoolError> {
        Ok(jpeg::read_image_jpeg_rgb8(&self.path)?)
    }
}

/// Collect the testing images from a directory.
///
/// Only regular files with a `.jpg` or `.jpeg` extension
/// (case-insensitive) are pooled. The records are sorted by path so runs
/// are reproducible.
///
/// # Errors
///
/// Returns [`PoolError::MissingDirectory`] if the path does not exist or
/// is not a directory.
pub fn get_pool(pathname: impl AsRef<Path>) -> Result<Vec<PoolRecord>, PoolError> {
    let path = pathname.as_ref();

    if !path.is_dir() {
        return Err(PoolError::MissingDirectory(path.to_path_buf()));
    }

    let mut pool = Vec::new();

    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let entry_path = entry.path();
        let is_jpeg = entry_path.extension().is_some_and(|ext| {
            ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg")
        });

        if is_jpeg {
            log::info!("pool image: {}", entry_path.display());
            pool.push(PoolRecord { path: entry_path });
        }
    }

    pool.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphbench_image::ImageSize;

    fn write_fixture(dir: &Path, name: &str) {
        let size = ImageSize {
            width: 8,
            height: 8,
        };
        let image = Image::<u8, 3>::from_size_val(size, 128).unwrap();
        jpeg::write_image_jpeg_rgb8(dir.join(name), &image, 100).unwrap();
    }

    #[test]
    fn missing_directory() {
        let result = get_pool("no_such_pool_directory");
        assert!(matches!(result, Err(PoolError::MissingDirectory(_))));
    }

    #[test]
    fn not_a_directory() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let file_path = tmp_dir.path().join("file.txt");
        std::fs::write(&file_path, b"hello").unwrap();

        let result = get_pool(&file_path);
        assert!(matches!(result, Err(PoolError::MissingDirectory(_))));
    }

    #[test]
    fn pool_filters_extensions() {
        let tmp_dir = tempfile::tempdir().unwrap();
        write_fixture(tmp_dir.path(), "a.jpg");
        write_fixture(tmp_dir.path(), "b.JPEG");
        std::fs::write(tmp_dir.path().join("notes.txt"), b"skip me").unwrap();
        std::fs::write(tmp_dir.path().join("image.png"), b"skip me too").unwrap();

        let pool = get_pool(tmp_dir.path()).unwrap();
        assert_eq!(pool.len(), 2);

        let names = pool
            .iter()
            .map(|r| r.path().file_name().unwrap().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.jpg", "b.JPEG"]);
    }

    #[test]
    fn pool_record_loads_rgb8() {
        let tmp_dir = tempfile::tempdir().unwrap();
        write_fixture(tmp_dir.path(), "a.jpg");

        let pool = get_pool(tmp_dir.path()).unwrap();
        let image = pool[0].load().unwrap();
        assert_eq!(
            image.size(),
            ImageSize {
                width: 8,
                height: 8
            }
        );
        assert_eq!(image.num_channels(), 3);
    }
}
