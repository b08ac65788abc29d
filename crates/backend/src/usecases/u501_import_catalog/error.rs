use thiserror::Error;

/// Ошибки конвейера импорта.
///
/// Фатальны для всего импорта только `Parse` и `Archive` (ответ rejected),
/// остальные гасятся на уровне файла, строки, варианта или товара и
/// попадают в отчет.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Error reading spreadsheet: {0}")]
    Parse(String),

    #[error("Error reading ZIP file: {0}")]
    Archive(String),

    #[error("Failed to resolve {entity} '{name}': {reason}")]
    Lookup {
        entity: &'static str,
        name: String,
        reason: String,
    },

    #[error("Failed to upload {file}: {reason}")]
    Upload { file: String, reason: String },

    #[error("Failed to write {entity}: {reason}")]
    Write {
        entity: &'static str,
        reason: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Ошибка во входных файлах (ответ rejected), а не на стороне сервера
    pub fn is_input_error(&self) -> bool {
        matches!(self, ImportError::Parse(_) | ImportError::Archive(_))
    }

    pub fn write(entity: &'static str, err: impl std::fmt::Display) -> Self {
        ImportError::Write {
            entity,
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ImportError::Archive("invalid Zip archive".into()).to_string(),
            "Error reading ZIP file: invalid Zip archive"
        );
        assert_eq!(
            ImportError::write("variant", "UNIQUE constraint failed").to_string(),
            "Failed to write variant: UNIQUE constraint failed"
        );
        let lookup = ImportError::Lookup {
            entity: "category",
            name: "Tops".into(),
            reason: "locked".into(),
        };
        assert_eq!(lookup.to_string(), "Failed to resolve category 'Tops': locked");
    }

    #[test]
    fn test_only_parse_and_archive_are_input_errors() {
        assert!(ImportError::Parse("bad".into()).is_input_error());
        assert!(ImportError::Archive("bad".into()).is_input_error());
        let io = ImportError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert!(!io.is_input_error());
    }
}
