use crate::domain::model::CollectionDescriptor;
use crate::utils::error::{Result, TapError};

const fn paged(name: &'static str, api_path: &'static str) -> CollectionDescriptor {
    CollectionDescriptor {
        name,
        api_path,
        paginated: true,
    }
}

const fn whole(name: &'static str, api_path: &'static str) -> CollectionDescriptor {
    CollectionDescriptor {
        name,
        api_path,
        paginated: false,
    }
}

/// Every collection the Bloomerang v2 API exposes to the tap, in sync order.
pub const BLOOMERANG_COLLECTIONS: &[CollectionDescriptor] = &[
    paged("addresses", "addresses"),
    paged("appeals", "appeals"),
    paged("campaigns", "campaigns"),
    paged("constituents", "constituents"),
    whole("customfields_constituent", "customfields/Constituent"),
    whole("customfields_transaction", "customfields/Transaction"),
    whole("customfields_interaction", "customfields/Interaction"),
    whole("customfields_note", "customfields/Note"),
    whole("customfields_benevon", "customfields/Benevon"),
    whole("customvalues_constituent", "customvalues/Constituent"),
    whole("customvalues_transaction", "customvalues/Transaction"),
    whole("customvalues_interaction", "customvalues/Interaction"),
    whole("customvalues_note", "customvalues/Note"),
    whole("customvalues_benevon", "customvalues/Benevon"),
    whole("customfieldcategories_constituent", "customfieldcategories/Constituent"),
    whole("customfieldcategories_transaction", "customfieldcategories/Transaction"),
    whole("customfieldcategories_interaction", "customfieldcategories/Interaction"),
    whole("customfieldcategories_note", "customfieldcategories/Note"),
    whole("customfieldcategories_benevon", "customfieldcategories/Benevon"),
    paged("emails", "emails"),
    paged("emailinterests", "emailinterests"),
    paged("funds", "funds"),
    paged("households", "households"),
    paged("interactions", "interactions"),
    paged("notes", "notes"),
    paged("phones", "phones"),
    paged("processors", "processors"),
    paged("refunds", "refunds"),
    paged("relationshiproles", "relationshiproles"),
    paged("softcredits", "softcredits"),
    paged("tasks", "tasks"),
    paged("transactions", "transactions"),
    paged("tributes", "tributes"),
    paged("walletitems", "walletitems"),
];

/// Immutable registry of collections, built once and handed to the tap.
#[derive(Debug, Clone)]
pub struct Catalog {
    collections: Vec<CollectionDescriptor>,
}

impl Catalog {
    pub fn new(collections: Vec<CollectionDescriptor>) -> Self {
        Self { collections }
    }

    pub fn bloomerang() -> Self {
        Self::new(BLOOMERANG_COLLECTIONS.to_vec())
    }

    pub fn get(&self, name: &str) -> Result<&CollectionDescriptor> {
        self.collections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TapError::UnknownCollection {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.collections.iter().map(|c| c.name).collect()
    }

    /// 依照 catalog 宣告順序回傳被選取的 collection；`None` 代表全部。
    /// 任何未知名稱都會在發出請求前失敗。
    pub fn select(&self, names: Option<&[String]>) -> Result<Vec<&CollectionDescriptor>> {
        let Some(names) = names else {
            return Ok(self.collections.iter().collect());
        };

        for name in names {
            self.get(name)?;
        }

        Ok(self
            .collections
            .iter()
            .filter(|c| names.iter().any(|n| n == c.name))
            .collect())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::bloomerang()
    }
}
