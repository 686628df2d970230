//! # File Preview Manager
//!
//! Derives a display-only preview handle from each selected image and owns
//! its lifetime. There is one independent slot per image field. Assigning a
//! new file to a slot revokes the handle it previously held before the new
//! handle is issued; clearing the slot revokes it; teardown (explicit or on
//! drop) revokes every live handle.
//!
//! Revoked handle ids are logged so a host can release the matching display
//! resource and tests can assert that nothing leaked.

use std::collections::BTreeMap;

use kyc_core::{FileId, FileRef, FormField};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one issued preview handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PreviewId(Uuid);

impl PreviewId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for PreviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "preview://{}", self.0)
    }
}

/// The image fields that carry a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImageSlot {
    IdentityFront,
    IdentityBack,
    Selfie,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 3] = [Self::IdentityFront, Self::IdentityBack, Self::Selfie];

    /// The form field backing this slot.
    pub fn field(&self) -> FormField {
        match self {
            Self::IdentityFront => FormField::IdentityFrontImage,
            Self::IdentityBack => FormField::IdentityBackImage,
            Self::Selfie => FormField::SelfieImage,
        }
    }

    /// The slot for an image field; `None` for text fields.
    pub fn from_field(field: FormField) -> Option<Self> {
        match field {
            FormField::IdentityFrontImage => Some(Self::IdentityFront),
            FormField::IdentityBackImage => Some(Self::IdentityBack),
            FormField::SelfieImage => Some(Self::Selfie),
            _ => None,
        }
    }
}

/// A display-only reference to a selected image.
///
/// Valid until the owning slot is reassigned, cleared, or torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    id: PreviewId,
    file_id: FileId,
    file_name: String,
    content_type: String,
}

impl PreviewHandle {
    fn for_file(file: &FileRef) -> Self {
        Self {
            id: PreviewId::new(),
            file_id: file.id(),
            file_name: file.name().to_string(),
            content_type: file.content_type().to_string(),
        }
    }

    pub fn id(&self) -> PreviewId {
        self.id
    }

    /// The file this handle was derived from.
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    /// URI a renderer can display, e.g. `preview://<uuid>`.
    pub fn uri(&self) -> String {
        self.id.to_string()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Revocations kept by [`PreviewManager::revoked`]; older ones are dropped.
pub const REVOKED_LOG_LIMIT: usize = 32;

/// Owner of every live preview handle.
#[derive(Debug, Default)]
pub struct PreviewManager {
    slots: BTreeMap<ImageSlot, PreviewHandle>,
    revoked: Vec<PreviewId>,
}

impl PreviewManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point a slot at a file, or clear it with `None`.
    ///
    /// Reassigning the file a slot already previews keeps the current
    /// handle. Any other change revokes the old handle first.
    pub fn assign(&mut self, slot: ImageSlot, file: Option<&FileRef>) -> Option<&PreviewHandle> {
        match file {
            None => {
                self.release(slot);
                None
            }
            Some(file) => {
                let unchanged = self
                    .slots
                    .get(&slot)
                    .is_some_and(|h| h.file_id == file.id());
                if !unchanged {
                    self.release(slot);
                    let handle = PreviewHandle::for_file(file);
                    tracing::debug!(?slot, preview = %handle.id, file = file.name(), "preview issued");
                    self.slots.insert(slot, handle);
                }
                self.slots.get(&slot)
            }
        }
    }

    /// Revoke the handle held by a slot. Returns the revoked id.
    pub fn release(&mut self, slot: ImageSlot) -> Option<PreviewId> {
        let handle = self.slots.remove(&slot)?;
        tracing::debug!(?slot, preview = %handle.id, "preview revoked");
        if self.revoked.len() == REVOKED_LOG_LIMIT {
            self.revoked.remove(0);
        }
        self.revoked.push(handle.id);
        Some(handle.id)
    }

    /// The live handle for a slot.
    pub fn handle(&self, slot: ImageSlot) -> Option<&PreviewHandle> {
        self.slots.get(&slot)
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether a handle is still live in any slot.
    pub fn is_live(&self, id: PreviewId) -> bool {
        self.slots.values().any(|h| h.id == id)
    }

    /// The most recent revocations, oldest first, at most
    /// [`REVOKED_LOG_LIMIT`].
    pub fn revoked(&self) -> &[PreviewId] {
        &self.revoked
    }

    /// Revoke every live handle.
    pub fn teardown(&mut self) {
        for slot in ImageSlot::ALL {
            self.release(slot);
        }
    }
}

impl Drop for PreviewManager {
    fn drop(&mut self) {
        for (slot, handle) in std::mem::take(&mut self.slots) {
            tracing::debug!(?slot, preview = %handle.id, "preview revoked on drop");
        }
    }
}
