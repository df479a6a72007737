#![forbid(unsafe_code)]

use folio_gallery::ConfigError;

/// Why [`crate::listeners`] setup or page mounting failed.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("no window or document available")]
    NoDocument,
    /// A required element was not found. Holds the id or selector searched.
    #[error("required element `{0}` not found")]
    MissingElement(String),
    /// An element was found but is not the expected kind (e.g. not an `<img>`).
    #[error("element `{0}` is not a {1}")]
    WrongElementType(String, &'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A DOM call rejected the operation.
    #[error("DOM call failed: {0}")]
    Dom(String),
}

#[cfg(test)]
mod tests {
    use super::MountError;
    use folio_gallery::GalleryConfig;

    #[test]
    fn config_errors_pass_through_unchanged() {
        let config_err = GalleryConfig::from_json(r#"{"timing":{"load_timeout_ms":0}}"#)
            .expect_err("zero timeout");
        let expected = config_err.to_string();
        let err = MountError::from(config_err);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn element_errors_name_the_selector() {
        let err = MountError::WrongElementType(".modal-media img".to_owned(), "<img>");
        assert_eq!(err.to_string(), "element `.modal-media img` is not a <img>");
        assert_eq!(
            MountError::MissingElement("modal".to_owned()).to_string(),
            "required element `modal` not found"
        );
    }
}
