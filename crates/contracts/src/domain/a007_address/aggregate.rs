use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};

crate::uuid_id!(
    /// Address identifier
    AddressId
);

/// Delivery address owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(flatten)]
    pub base: BaseAggregate<AddressId>,

    pub user_id: String,
    /// "Home", "Work", ...
    pub label: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub is_default: bool,
}

impl Address {
    pub fn new_for_insert(user_id: String, dto: &AddressDto) -> Self {
        let mut address = Self {
            base: BaseAggregate::new(AddressId::new_v4()),
            user_id,
            label: String::new(),
            line1: String::new(),
            line2: None,
            city: String::new(),
            postal_code: String::new(),
            phone: None,
            is_default: false,
        };
        address.update(dto);
        address
    }

    pub fn update(&mut self, dto: &AddressDto) {
        self.label = dto
            .label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("Home")
            .to_string();
        self.line1 = dto.line1.trim().to_string();
        self.line2 = dto.line2.clone();
        self.city = dto.city.trim().to_string();
        self.postal_code = dto.postal_code.trim().to_string();
        self.phone = dto.phone.clone();
        self.is_default = dto.is_default.unwrap_or(self.is_default);
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.line1.is_empty() {
            return Err("Address line is required".into());
        }
        if self.city.is_empty() {
            return Err("City is required".into());
        }
        let postal_ok = !self.postal_code.is_empty()
            && self
                .postal_code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == ' ');
        if !postal_ok {
            return Err("Postal code is invalid".into());
        }
        Ok(())
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id && !self.base.metadata.is_deleted
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Address {
    type Id = AddressId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a007"
    }

    fn collection_name() -> &'static str {
        "address"
    }

    fn element_name() -> &'static str {
        "Address"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub label: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub is_default: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> AddressDto {
        AddressDto {
            label: None,
            line1: "4 Lake Road".into(),
            line2: None,
            city: "Pune".into(),
            postal_code: "411001".into(),
            phone: None,
            is_default: None,
        }
    }

    #[test]
    fn test_defaults_label_to_home() {
        let address = Address::new_for_insert("u1".into(), &dto());
        assert_eq!(address.label, "Home");
        assert!(!address.is_default);
        assert!(address.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut bad = dto();
        bad.city = "".into();
        assert!(Address::new_for_insert("u1".into(), &bad).validate().is_err());

        let mut bad = dto();
        bad.postal_code = "41#001".into();
        assert!(Address::new_for_insert("u1".into(), &bad).validate().is_err());
    }

    #[test]
    fn test_ownership() {
        let mut address = Address::new_for_insert("u1".into(), &dto());
        assert!(address.is_owned_by("u1"));
        assert!(!address.is_owned_by("u2"));
        address.base.metadata.mark_deleted();
        assert!(!address.is_owned_by("u1"));
    }
}
