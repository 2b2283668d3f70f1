use serde::Serialize;
use serde_json::Value;

use crate::catalog::FixedEntityType;
use crate::identity::Website;

/// Everything needed to insert a brand row: its identity plus descriptive fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandDraft {
    pub website: Website,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub entity_type: Option<String>,
    pub fixed_entity_type: Option<FixedEntityType>,
    pub apollo_enrichment: Option<Value>,
}

impl BrandDraft {
    /// A draft carrying only the required fields.
    #[must_use]
    pub fn new(website: Website, name: impl Into<String>) -> Self {
        Self {
            website,
            name: name.into(),
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            entity_type: None,
            fixed_entity_type: None,
            apollo_enrichment: None,
        }
    }
}

/// Scalar fields supplied by an update request.
///
/// `None` keeps the brand's current value; there is no way to clear a field
/// through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandPatch {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl BrandPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_name.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
    }

    /// Overlay the supplied fields onto `draft`.
    #[must_use]
    pub fn apply(&self, mut draft: BrandDraft) -> BrandDraft {
        if let Some(name) = &self.name {
            draft.name.clone_from(name);
        }
        if self.contact_name.is_some() {
            draft.contact_name.clone_from(&self.contact_name);
        }
        if self.contact_email.is_some() {
            draft.contact_email.clone_from(&self.contact_email);
        }
        if self.contact_phone.is_some() {
            draft.contact_phone.clone_from(&self.contact_phone);
        }
        draft
    }
}

#[cfg(test)]
#[path = "brands_test.rs"]
mod tests;
