use serde::{Deserialize, Serialize};

/// Coarse material estimate derived from the take-off area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialEstimate {
    pub pieces: u64,
    pub weight_kg: u64,
    pub weight_tonnes: f64,
}

/// One article of the system catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub category: String,

    pub article_number: String,

    pub name: String,

    pub quantity: u32,

    #[serde(default)]
    pub unit_weight_kg: f64,
}

impl CatalogItem {
    pub fn total_weight_kg(&self) -> f64 {
        self.unit_weight_kg * f64::from(self.quantity)
    }
}

/// Catalog items sharing a category ("Rahmen", "Beläge", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCategory {
    pub name: String,
    pub items: Vec<CatalogItem>,
}

impl CatalogCategory {
    pub fn total_weight_kg(&self) -> f64 {
        self.items.iter().map(CatalogItem::total_weight_kg).sum()
    }

    pub fn total_pieces(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Itemized parts list for a scaffold system and area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEstimate {
    pub system_id: String,
    pub area_m2: f64,
    pub categories: Vec<CatalogCategory>,
    pub total_weight_kg: f64,
}

impl CatalogEstimate {
    /// Group a flat item list by category, keeping first-seen category order
    pub fn from_items(system_id: impl Into<String>, area_m2: f64, items: Vec<CatalogItem>) -> Self {
        let mut categories: Vec<CatalogCategory> = Vec::new();

        for item in items {
            let name = if item.category.trim().is_empty() {
                "Diverses".to_string()
            } else {
                item.category.clone()
            };

            match categories.iter_mut().find(|c| c.name == name) {
                Some(category) => category.items.push(item),
                None => categories.push(CatalogCategory { name, items: vec![item] }),
            }
        }

        let total_weight_kg = categories.iter().map(CatalogCategory::total_weight_kg).sum();

        Self { system_id: system_id.into(), area_m2, categories, total_weight_kg }
    }

    pub fn total_pieces(&self) -> u64 {
        self.categories.iter().map(CatalogCategory::total_pieces).sum()
    }
}
