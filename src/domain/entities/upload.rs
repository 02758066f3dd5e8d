use std::path::PathBuf;

/// How a file is presented in the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Document,
    Photo,
}

impl UploadKind {
    /// Chat action shown to the operator while the upload runs.
    pub fn chat_action(self) -> &'static str {
        match self {
            UploadKind::Document => "upload_document",
            UploadKind::Photo => "upload_photo",
        }
    }
}

/// An outbound file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub path: PathBuf,
    pub caption: Option<String>,
    pub kind: UploadKind,
}

impl FileUpload {
    pub fn document(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            caption: None,
            kind: UploadKind::Document,
        }
    }

    pub fn photo(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            caption: None,
            kind: UploadKind::Photo,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string())
    }
}
