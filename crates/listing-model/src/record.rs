//! The listing form record.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::edit::FieldEdit;
use crate::id::OpaqueId;
use crate::snapshot::SelectionSnapshot;
use crate::tier::{CategoryTier, LocationTier};

/// Whether the property is offered for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingPurpose {
    #[default]
    Sale,
    Rent,
}

impl ListingPurpose {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sale => "For Sale",
            Self::Rent => "For Rent",
        }
    }
}

/// A binary file attached to the listing (photos, floor plans).
///
/// Attachments never enter the local cache; they are only sent to the
/// remote stores. The payload is reference-counted so that snapshotting a
/// record does not copy image data.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Arc<[u8]>,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The full mutable field set of a property listing.
///
/// Serialized field names are camelCase to match the backend. Attachments
/// are skipped by serde, so any JSON produced from a record is free of
/// binary payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormRecord {
    // Classification
    pub category_id: OpaqueId,
    pub sub_category_id: OpaqueId,
    pub purpose: ListingPurpose,

    // Description and pricing
    pub title: String,
    pub description: String,
    pub price: String,
    pub area: String,
    pub bedrooms: Option<u8>,
    pub bathrooms: Option<u8>,

    // Location
    pub country_id: OpaqueId,
    pub state_id: OpaqueId,
    pub city_id: OpaqueId,
    pub locality_id: OpaqueId,
    /// Locality as typed by the user; authoritative when `locality_id` is unset.
    pub locality_text: String,
    pub address: String,

    // Contact
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,

    // Flags
    pub negotiable: bool,
    pub furnished: bool,
    pub show_contact: bool,

    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl FormRecord {
    /// Apply a single edit in place.
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::CategoryId(id) => self.category_id = id,
            FieldEdit::SubCategoryId(id) => self.sub_category_id = id,
            FieldEdit::Purpose(purpose) => self.purpose = purpose,
            FieldEdit::Title(value) => self.title = value,
            FieldEdit::Description(value) => self.description = value,
            FieldEdit::Price(value) => self.price = value,
            FieldEdit::Area(value) => self.area = value,
            FieldEdit::Bedrooms(value) => self.bedrooms = value,
            FieldEdit::Bathrooms(value) => self.bathrooms = value,
            FieldEdit::CountryId(id) => self.country_id = id,
            FieldEdit::StateId(id) => self.state_id = id,
            FieldEdit::CityId(id) => self.city_id = id,
            FieldEdit::LocalityId(id) => self.locality_id = id,
            FieldEdit::LocalityText(value) => self.locality_text = value,
            FieldEdit::Address(value) => self.address = value,
            FieldEdit::ContactName(value) => self.contact_name = value,
            FieldEdit::ContactPhone(value) => self.contact_phone = value,
            FieldEdit::ContactEmail(value) => self.contact_email = value,
            FieldEdit::Negotiable(flag) => self.negotiable = flag,
            FieldEdit::Furnished(flag) => self.furnished = flag,
            FieldEdit::ShowContact(flag) => self.show_contact = flag,
            FieldEdit::AddAttachment(attachment) => self.attachments.push(attachment),
            FieldEdit::RemoveAttachment(index) => {
                if index < self.attachments.len() {
                    self.attachments.remove(index);
                }
            }
            FieldEdit::ClearAttachments => self.attachments.clear(),
        }
    }

    /// Produce a new record with all edits applied in order.
    #[must_use]
    pub fn with_edits(&self, edits: impl IntoIterator<Item = FieldEdit>) -> Self {
        let mut next = self.clone();
        for edit in edits {
            next.apply(edit);
        }
        next
    }

    /// Selected id of a location tier.
    pub fn location_id(&self, tier: LocationTier) -> OpaqueId {
        match tier {
            LocationTier::Country => self.country_id,
            LocationTier::State => self.state_id,
            LocationTier::City => self.city_id,
            LocationTier::Locality => self.locality_id,
        }
    }

    /// Selected id of a category tier.
    pub fn category_tier_id(&self, tier: CategoryTier) -> OpaqueId {
        match tier {
            CategoryTier::Category => self.category_id,
            CategoryTier::SubCategory => self.sub_category_id,
        }
    }

    /// Location selections for restoring the location selector.
    pub fn location_snapshot(&self) -> SelectionSnapshot<LocationTier> {
        let mut snapshot = SelectionSnapshot::new();
        for tier in [
            LocationTier::Country,
            LocationTier::State,
            LocationTier::City,
            LocationTier::Locality,
        ] {
            snapshot.set(tier, self.location_id(tier));
        }
        snapshot.set_leaf_text(self.locality_text.clone());
        snapshot
    }

    /// Category selections for restoring the category selector.
    pub fn category_snapshot(&self) -> SelectionSnapshot<CategoryTier> {
        SelectionSnapshot::new()
            .with(CategoryTier::Category, self.category_id)
            .with(CategoryTier::SubCategory, self.sub_category_id)
    }

    /// Total size of all attachment payloads.
    pub fn attachment_bytes(&self) -> usize {
        self.attachments.iter().map(Attachment::len).sum()
    }
}
