use std::{
    fs,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};

use crate::{constants::DEFAULT_IMAGES_DIR, error::Error};

const CHECKSUM_PREFIX_LEN: usize = 12;

pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Copies `source` into `images_dir` and returns the path to store with the
/// recipe, relative to the parent of `images_dir` (e.g. `images/3fa1…-pie.jpg`).
pub fn store_image(source: &Path, images_dir: &Path) -> Result<String, Error> {
    if !source.is_file() {
        return Err(Error::NotFound(format!(
            "image file {}",
            source.display()
        )));
    }

    let file_name = source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::invalid_request("Image path has no file name"))?;

    let bytes = fs::read(source)?;
    let stored_name = format!("{}-{file_name}", &checksum(&bytes)[..CHECKSUM_PREFIX_LEN]);

    fs::create_dir_all(images_dir)?;
    let destination = images_dir.join(&stored_name);
    if destination.exists() {
        log::debug!("Image {stored_name} already stored");
    } else {
        fs::write(&destination, &bytes)?;
        log::info!("Stored image {}", destination.display());
    }

    let dir_name = images_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_IMAGES_DIR);

    Ok(format!("{dir_name}/{stored_name}"))
}

/// Maps a stored relative path back to a file inside `images_dir`.
pub fn resolve_image(stored: &str, images_dir: &Path) -> Result<PathBuf, Error> {
    let file_name = Path::new(stored)
        .file_name()
        .ok_or_else(|| Error::invalid_request("Stored image path has no file name"))?;

    let path = images_dir.join(file_name);
    if !path.is_file() {
        return Err(Error::NotFound(format!("image file {}", path.display())));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_are_stored_by_content() {
        let source_dir = tempfile::tempdir().unwrap();
        let library = tempfile::tempdir().unwrap();
        let images_dir = library.path().join("images");

        let pie = source_dir.path().join("pie.jpg");
        fs::write(&pie, b"not really a jpeg").unwrap();

        let stored = store_image(&pie, &images_dir).unwrap();
        assert!(stored.starts_with("images/"));
        assert!(stored.ends_with("-pie.jpg"));
        assert_eq!(store_image(&pie, &images_dir).unwrap(), stored);

        let resolved = resolve_image(&stored, &images_dir).unwrap();
        assert_eq!(fs::read(resolved).unwrap(), b"not really a jpeg");
    }

    #[test]
    fn same_name_different_content_does_not_overwrite() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let images_dir = tempfile::tempdir().unwrap();

        fs::write(a.path().join("cake.png"), b"first").unwrap();
        fs::write(b.path().join("cake.png"), b"second").unwrap();

        let first = store_image(&a.path().join("cake.png"), images_dir.path()).unwrap();
        let second = store_image(&b.path().join("cake.png"), images_dir.path()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn missing_files_are_not_found() {
        let images_dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            store_image(Path::new("/no/such/file.jpg"), images_dir.path()),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            resolve_image("images/gone.jpg", images_dir.path()),
            Err(Error::NotFound(_))
        ));
    }
}
