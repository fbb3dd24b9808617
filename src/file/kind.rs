//! File kind classification.

/// File kind, decided by extension at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Raster and vector images.
    Image,
    /// Text and office documents.
    Document,
    /// Video files.
    Video,
    /// Audio files.
    Audio,
    /// Everything else.
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "heic", "ico", "tiff",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "md", "rtf", "odt", "xls", "xlsx", "ods", "ppt", "pptx", "csv",
    "html", "epub",
];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv", "wmv", "m4v"];

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "opus"];

impl FileKind {
    /// Classify a file extension.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.to_lowercase();
        let ext = ext.as_str();

        if IMAGE_EXTENSIONS.contains(&ext) {
            FileKind::Image
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            FileKind::Document
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            FileKind::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            FileKind::Audio
        } else {
            FileKind::Other
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Document => "document",
            FileKind::Video => "video",
            FileKind::Audio => "audio",
            FileKind::Other => "other",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(FileKind::Image),
            "document" => Some(FileKind::Document),
            "video" => Some(FileKind::Video),
            "audio" => Some(FileKind::Audio),
            "other" => Some(FileKind::Other),
            _ => None,
        }
    }

    /// All kinds, in display order.
    pub fn all() -> [FileKind; 5] {
        [
            FileKind::Image,
            FileKind::Document,
            FileKind::Video,
            FileKind::Audio,
            FileKind::Other,
        ]
    }
}
