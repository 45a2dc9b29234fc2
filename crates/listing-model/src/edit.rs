//! Typed field mutations.

use crate::id::OpaqueId;
use crate::record::{Attachment, ListingPurpose};
use crate::tier::{CategoryTier, LocationTier};

/// A mutation of exactly one [`FormRecord`](crate::FormRecord) field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    CategoryId(OpaqueId),
    SubCategoryId(OpaqueId),
    Purpose(ListingPurpose),
    Title(String),
    Description(String),
    Price(String),
    Area(String),
    Bedrooms(Option<u8>),
    Bathrooms(Option<u8>),
    CountryId(OpaqueId),
    StateId(OpaqueId),
    CityId(OpaqueId),
    LocalityId(OpaqueId),
    LocalityText(String),
    Address(String),
    ContactName(String),
    ContactPhone(String),
    ContactEmail(String),
    Negotiable(bool),
    Furnished(bool),
    ShowContact(bool),
    AddAttachment(Attachment),
    /// Remove the attachment at the given position; out of range is a no-op.
    RemoveAttachment(usize),
    ClearAttachments,
}

impl FieldEdit {
    /// The id field backing a location tier.
    pub fn location(tier: LocationTier, id: OpaqueId) -> Self {
        match tier {
            LocationTier::Country => Self::CountryId(id),
            LocationTier::State => Self::StateId(id),
            LocationTier::City => Self::CityId(id),
            LocationTier::Locality => Self::LocalityId(id),
        }
    }

    /// The id field backing a category tier.
    pub fn category(tier: CategoryTier, id: OpaqueId) -> Self {
        match tier {
            CategoryTier::Category => Self::CategoryId(id),
            CategoryTier::SubCategory => Self::SubCategoryId(id),
        }
    }

    /// Wire name of the affected field, for logging.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::CategoryId(_) => "categoryId",
            Self::SubCategoryId(_) => "subCategoryId",
            Self::Purpose(_) => "purpose",
            Self::Title(_) => "title",
            Self::Description(_) => "description",
            Self::Price(_) => "price",
            Self::Area(_) => "area",
            Self::Bedrooms(_) => "bedrooms",
            Self::Bathrooms(_) => "bathrooms",
            Self::CountryId(_) => "countryId",
            Self::StateId(_) => "stateId",
            Self::CityId(_) => "cityId",
            Self::LocalityId(_) => "localityId",
            Self::LocalityText(_) => "localityText",
            Self::Address(_) => "address",
            Self::ContactName(_) => "contactName",
            Self::ContactPhone(_) => "contactPhone",
            Self::ContactEmail(_) => "contactEmail",
            Self::Negotiable(_) => "negotiable",
            Self::Furnished(_) => "furnished",
            Self::ShowContact(_) => "showContact",
            Self::AddAttachment(_) | Self::RemoveAttachment(_) | Self::ClearAttachments => {
                "attachments"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_edit_mapping() {
        let id = OpaqueId::new(9);
        assert_eq!(
            FieldEdit::location(LocationTier::City, id),
            FieldEdit::CityId(id)
        );
        assert_eq!(
            FieldEdit::location(LocationTier::Locality, id).field_name(),
            "localityId"
        );
    }

    #[test]
    fn test_category_edit_mapping() {
        let id = OpaqueId::new(3);
        assert_eq!(
            FieldEdit::category(CategoryTier::SubCategory, id),
            FieldEdit::SubCategoryId(id)
        );
    }
}
