/// Result of validating an uploaded PDF filename.
#[derive(Debug)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is exactly `..`.
    PathTraversal,
    /// Filename contains null bytes.
    NullByte,
    /// Filename starts with a dot (hidden file).
    Hidden,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
    /// Extension is not `.pdf`.
    NotPdf,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::NotPdf => "Invalid filename: only .pdf files are accepted",
        }
    }
}

/// Validates an uploaded escritura PDF filename (flat, no directories,
/// `.pdf` extension).
pub fn validate_pdf_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    // Reject ASCII control characters to prevent HTTP header injection
    // (e.g. CRLF in Content-Disposition).
    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    let is_pdf = trimmed
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(FilenameError::NotPdf);
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_pdf_names() {
        assert!(validate_pdf_filename("escritura_4128.pdf").is_ok());
        assert!(validate_pdf_filename("COMPRAVENTA.PDF").is_ok());
        assert!(validate_pdf_filename("  padded.pdf  ").is_ok());
    }

    #[test]
    fn rejects_empty_names() {
        assert!(matches!(
            validate_pdf_filename("   "),
            Err(FilenameError::Empty)
        ));
    }

    #[test]
    fn rejects_path_separators_and_traversal() {
        assert!(matches!(
            validate_pdf_filename("dir/escritura.pdf"),
            Err(FilenameError::ContainsPathSeparator)
        ));
        assert!(matches!(
            validate_pdf_filename("..\\escritura.pdf"),
            Err(FilenameError::ContainsPathSeparator)
        ));
        assert!(matches!(
            validate_pdf_filename(".."),
            Err(FilenameError::PathTraversal)
        ));
    }

    #[test]
    fn rejects_hidden_and_control_characters() {
        assert!(matches!(
            validate_pdf_filename(".escritura.pdf"),
            Err(FilenameError::Hidden)
        ));
        assert!(matches!(
            validate_pdf_filename("bad\r\nname.pdf"),
            Err(FilenameError::ControlCharacter)
        ));
    }

    #[test]
    fn rejects_non_pdf_extensions() {
        assert!(matches!(
            validate_pdf_filename("escritura.docx"),
            Err(FilenameError::NotPdf)
        ));
        assert!(matches!(
            validate_pdf_filename("escritura"),
            Err(FilenameError::NotPdf)
        ));
    }
}
