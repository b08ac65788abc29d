//! Распаковка архива изображений.
//!
//! Каждая папка верхнего уровня архива - группа изображений одного варианта.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::error::ImportError;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub file_name: String,
    pub order_index: i32,
}

/// Имя папки -> изображения в порядке (order_index, имя файла)
pub type ImageFolderMap = HashMap<String, Vec<ImageFile>>;

/// Порядковый номер из числового префикса имени ("2_back.jpg" -> 2).
/// Без префикса - 0
pub fn order_index_of(file_name: &str) -> i32 {
    let digits: String = file_name.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_ignored_folder(name: &str) -> bool {
    name == "__MACOSX" || name.starts_with('.')
}

fn collect_images(folder: &Path) -> Result<Vec<ImageFile>, ImportError> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || !is_image(&path) {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        images.push(ImageFile {
            order_index: order_index_of(&file_name),
            file_name,
            path,
        });
    }
    images.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    Ok(images)
}

/// Распаковать архив в `dest` и собрать группы изображений.
/// `dest` не должен существовать; удаляет его вызывающий код
pub fn extract_image_groups(bytes: Vec<u8>, dest: &Path) -> Result<ImageFolderMap, ImportError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ImportError::Archive(e.to_string()))?;

    std::fs::create_dir(dest)?;
    archive
        .extract(dest)
        .map_err(|e| ImportError::Archive(e.to_string()))?;

    let mut groups = ImageFolderMap::new();
    for entry in std::fs::read_dir(dest)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_ignored_folder(&name) {
            continue;
        }
        let images = collect_images(&entry.path())?;
        tracing::debug!("Image folder '{}': {} files", name, images.len());
        groups.insert(name, images);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::build_zip;
    use super::*;

    #[test]
    fn test_order_index_prefix() {
        assert_eq!(order_index_of("1.jpg"), 1);
        assert_eq!(order_index_of("12_front.png"), 12);
        assert_eq!(order_index_of("front.png"), 0);
    }

    #[test]
    fn test_extract_groups() {
        let bytes = build_zip(&[
            ("f1/2.JPG", Some(b"two".as_slice())),
            ("f1/1.jpg", Some(b"one".as_slice())),
            ("f1/notes.txt", Some(b"skip".as_slice())),
            ("f1/cover.png", Some(b"zero".as_slice())),
            ("f2/", None),
            ("__MACOSX/f1/._1.jpg", Some(b"junk".as_slice())),
            (".hidden/1.jpg", Some(b"junk".as_slice())),
            ("readme.jpg", Some(b"top".as_slice())),
        ]);
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("archive");

        let groups = extract_image_groups(bytes, &dest).unwrap();
        assert_eq!(groups.len(), 2);

        let names: Vec<&str> = groups["f1"].iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["cover.png", "1.jpg", "2.JPG"]);
        assert!(groups["f1"][1].path.exists());
        assert!(groups["f2"].is_empty());
    }

    #[test]
    fn test_destination_must_be_fresh() {
        let bytes = build_zip(&[("f1/1.jpg", Some(b"one".as_slice()))]);
        let tmp = tempfile::tempdir().unwrap();
        let err = extract_image_groups(bytes, tmp.path()).unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[test]
    fn test_invalid_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract_image_groups(b"not a zip".to_vec(), &tmp.path().join("a")).unwrap_err();
        assert!(matches!(err, ImportError::Archive(_)));
        assert!(!tmp.path().join("a").exists());
    }
}
