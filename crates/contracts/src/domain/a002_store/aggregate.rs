use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};

crate::uuid_id!(
    /// Store identifier
    StoreId
);

/// A seller's storefront. Products always belong to exactly one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(flatten)]
    pub base: BaseAggregate<StoreId>,

    /// Owning seller (sys_users.id)
    pub seller_id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
}

impl Store {
    pub fn new_for_insert(seller_id: String, dto: &StoreDto) -> Self {
        let mut store = Self {
            base: BaseAggregate::new(StoreId::new_v4()),
            seller_id,
            name: String::new(),
            description: None,
            address: String::new(),
            phone: None,
            logo_url: None,
            is_active: true,
        };
        store.update(dto);
        store
    }

    pub fn update(&mut self, dto: &StoreDto) {
        self.name = dto.name.trim().to_string();
        self.description = dto.description.clone();
        self.address = dto.address.trim().to_string();
        self.phone = dto.phone.clone();
        self.logo_url = dto.logo_url.clone();
        self.is_active = dto.is_active.unwrap_or(self.is_active);
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Store name is required".into());
        }
        if self.address.is_empty() {
            return Err("Store address is required".into());
        }
        Ok(())
    }

    /// Owner seller or any admin
    pub fn is_managed_by(&self, user_id: &str, is_admin: bool) -> bool {
        is_admin || self.seller_id == user_id
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Store {
    type Id = StoreId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "store"
    }

    fn element_name() -> &'static str {
        "Store"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoreDto {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: Option<bool>,
}
