//! Request/response surface used by the graphical front-end.
//!
//! Each call runs the full synchronous procedure and folds the outcome into a
//! [`Response`], so a UI never has to handle [`IconError`](crate::error::IconError)
//! itself.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;

/// Label of the image picker filter.
pub const IMAGE_FILTER_NAME: &str = "Images";
/// Extensions offered by the image picker.
pub const IMAGE_FILTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "ico"];

/// Outcome of one install/uninstall request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }

    fn from_result<T, E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => {
                log::error!("{e}");
                Self::failed(e.to_string())
            }
        }
    }
}

/// Synchronous API over a [`Pipeline`], taking paths as plain strings.
///
/// # Example
///
/// ```rust,no_run
/// use folder_icon::api::FolderIconApi;
/// use folder_icon::config::Config;
/// use folder_icon::pipeline::Pipeline;
///
/// let api = FolderIconApi::new(Pipeline::builder().from_config(&Config::default()).build());
/// let response = api.install(r"C:\Photos", None, false);
/// if !response.success {
///     eprintln!("{}", response.error.unwrap_or_default());
/// }
/// ```
pub struct FolderIconApi {
    pipeline: Pipeline,
}

impl FolderIconApi {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Install an icon. An empty or blank `image_path` means "use the folder's default image".
    pub fn install(&self, folder_path: &str, image_path: Option<&str>, recursive: bool) -> Response {
        let image = image_path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Path::new);
        Response::from_result(
            self.pipeline
                .install(Path::new(folder_path.trim()), image, recursive),
        )
    }

    pub fn uninstall(&self, folder_path: &str, recursive: bool) -> Response {
        Response::from_result(self.pipeline.uninstall(Path::new(folder_path.trim()), recursive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::testing::RecordingConverter;
    use crate::fs::{FileSystem, MemoryFs};

    fn api(fs: &MemoryFs) -> FolderIconApi {
        FolderIconApi::new(
            Pipeline::builder()
                .file_system(fs.clone())
                .converter(RecordingConverter::new(fs))
                .build(),
        )
    }

    #[test]
    fn successful_install_has_no_error() {
        let fs = MemoryFs::new();
        fs.add_file("/photos/folder.ico", b"ico".to_vec());

        let response = api(&fs).install("/photos", None, false);
        assert_eq!(response, Response::ok());
        assert!(fs.exists(Path::new("/photos/desktop.ini")));
    }

    #[test]
    fn blank_image_path_means_default_image() {
        let fs = MemoryFs::new();
        fs.add_file("/photos/folder.png", b"png".to_vec());

        let response = api(&fs).install("/photos", Some("  "), false);
        assert!(response.success);
        assert!(fs.exists(Path::new("/photos/folder.ico")));
    }

    #[test]
    fn failures_carry_the_error_message() {
        let fs = MemoryFs::new();

        let response = api(&fs).install("/missing", None, true);
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Folder '/missing' does not exist."));

        let response = api(&fs).uninstall("/missing", false);
        assert!(!response.success);
    }

    #[test]
    fn uninstall_reports_success() {
        let fs = MemoryFs::new();
        fs.add_dir("/photos/sub");

        let response = api(&fs).uninstall("/photos", true);
        assert!(response.success);
    }

    #[test]
    fn response_serializes_like_the_ui_expects() {
        assert_eq!(
            serde_json::to_string(&Response::ok()).unwrap(),
            r#"{"success":true}"#
        );
        assert_eq!(
            serde_json::to_string(&Response::failed("boom")).unwrap(),
            r#"{"success":false,"error":"boom"}"#
        );
    }
}
