//! # Form Value Model
//!
//! `FormValues` is the single mutable record behind the wizard. Each input of
//! each step is a named field; `FormField` names them for error maps and
//! touched-field tracking.
//!
//! Text inputs are stored raw, exactly as typed. They become validated
//! newtypes (see [`crate::identity`]) only when a request is built.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::GHANA_COUNTRY_CODE;

// ─── File references ─────────────────────────────────────────────────

/// Identity of a selected file. Two selections of the same bytes are
/// still two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file:{}", self.0)
    }
}

/// An opaque reference to a user-selected binary file.
///
/// Cloning shares the underlying bytes; the bytes are never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct FileRef {
    id: FileId,
    name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl FileRef {
    /// Wrap raw bytes with their file name and media type.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id: FileId::new(),
            name: name.into(),
            content_type: content_type.into(),
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Wrap raw bytes, inferring the media type from the file extension.
    pub fn with_inferred_type(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let content_type = Self::content_type_for(&name);
        Self::new(name, content_type, bytes)
    }

    /// Media type for a file name, by extension. Unknown extensions map to
    /// `application/octet-stream`.
    pub fn content_type_for(name: &str) -> &'static str {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "heic" => "image/heic",
            "gif" => "image/gif",
            "pdf" => "application/pdf",
            _ => "application/octet-stream",
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the media type is an image type.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

impl std::fmt::Debug for FileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ─── Form fields ─────────────────────────────────────────────────────

/// Every input the wizard collects, in step order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormField {
    IdentityNumber,
    IdentityFrontImage,
    IdentityBackImage,
    MomoCountryCode,
    MomoNumber,
    SelfieImage,
}

impl FormField {
    /// All fields in step order.
    pub const ALL: [FormField; 6] = [
        Self::IdentityNumber,
        Self::IdentityFrontImage,
        Self::IdentityBackImage,
        Self::MomoCountryCode,
        Self::MomoNumber,
        Self::SelfieImage,
    ];

    /// Dotted path of the field within `FormValues`.
    pub fn path(&self) -> &'static str {
        match self {
            Self::IdentityNumber => "identity_number",
            Self::IdentityFrontImage => "identity_front_image",
            Self::IdentityBackImage => "identity_back_image",
            Self::MomoCountryCode => "momo.country_code",
            Self::MomoNumber => "momo.number",
            Self::SelfieImage => "selfie_image",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::IdentityNumber => "Ghana Card number",
            Self::IdentityFrontImage => "Ghana Card front image",
            Self::IdentityBackImage => "Ghana Card back image",
            Self::MomoCountryCode => "Country code",
            Self::MomoNumber => "Mobile money number",
            Self::SelfieImage => "Selfie",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

// ─── Form values ─────────────────────────────────────────────────────

/// Mobile money account details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomoDetails {
    /// Dialling prefix, fixed to `+233`.
    pub country_code: String,
    /// Subscriber number without the prefix.
    pub number: String,
}

impl Default for MomoDetails {
    fn default() -> Self {
        Self {
            country_code: GHANA_COUNTRY_CODE.to_string(),
            number: String::new(),
        }
    }
}

/// Everything the wizard collects.
///
/// `Clone` produces an independent snapshot: strings are copied and file
/// references share bytes that are never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub identity_number: String,
    pub identity_front_image: Option<FileRef>,
    pub identity_back_image: Option<FileRef>,
    pub momo: MomoDetails,
    pub selfie_image: Option<FileRef>,
}

impl FormValues {
    /// Empty form with the country code preset.
    pub fn new() -> Self {
        Self::default()
    }

    /// The file held by an image field. `None` for text fields.
    pub fn file(&self, field: FormField) -> Option<&FileRef> {
        match field {
            FormField::IdentityFrontImage => self.identity_front_image.as_ref(),
            FormField::IdentityBackImage => self.identity_back_image.as_ref(),
            FormField::SelfieImage => self.selfie_image.as_ref(),
            _ => None,
        }
    }
}
