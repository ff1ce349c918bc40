//! Content catalog: static reference data, loaded once per run.

use crate::types::ContentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    DailyDose,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub name: String,
    pub pool: Pool,
}

impl ContentItem {
    pub fn new(id: ContentId, name: &str, pool: Pool) -> Self {
        Self {
            id,
            name: name.to_string(),
            pool,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    items: Vec<ContentItem>,
}

#[derive(Debug, Clone)]
pub struct ContentCatalog {
    items: Vec<ContentItem>,
}

impl ContentCatalog {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    /// Load from a JSON file of the form `{ "items": [ { id, name, pool } ] }`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        anyhow::ensure!(!file.items.is_empty(), "catalog {path} has no items");
        Ok(Self::new(file.items))
    }

    /// The catalog shipped with the simulator.
    pub fn builtin() -> Self {
        let daily: [(ContentId, &str); 2] = [
            (2_033_875, "What's Hot For February"),
            (2_030_735, "January Training Product"),
        ];
        let general: [(ContentId, &str); 8] = [
            (2_021_630, "What's Hot For January"),
            (1_670_279, "3CX - How to Use the Language Services Line"),
            (1_670_278, "3CX - How to Transfer to the Escalation Line"),
            (2_020_001, "Lead NCR IR Process"),
            (2_033_002, "Nécessaire: Rosemary Mask"),
            (1_915_085, "Beauty Insider Community Overview"),
            (892_298, "Client Service Excellence Training"),
            (1_561_228, "Product Knowledge: Skincare Basics"),
        ];
        let items = daily
            .iter()
            .map(|&(id, name)| ContentItem::new(id, name, Pool::DailyDose))
            .chain(
                general
                    .iter()
                    .map(|&(id, name)| ContentItem::new(id, name, Pool::General)),
            )
            .collect();
        Self::new(items)
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn daily_dose(&self) -> Vec<&ContentItem> {
        self.in_pool(Pool::DailyDose)
    }

    pub fn general_pool(&self) -> Vec<&ContentItem> {
        self.in_pool(Pool::General)
    }

    fn in_pool(&self, pool: Pool) -> Vec<&ContentItem> {
        self.items.iter().filter(|i| i.pool == pool).collect()
    }

    pub fn get(&self, id: ContentId) -> Option<&ContentItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Display name, or a synthesized placeholder for unknown content.
    pub fn name_for(&self, id: ContentId) -> String {
        self.get(id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| format!("Training Content {id}"))
    }
}

// ── Content id rendering ──────────────────────────────────────────

/// `1915085` → `"1,915,085"`.
pub fn format_content_id(id: ContentId) -> String {
    let digits = id.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Inverse of `format_content_id`; also accepts ungrouped digits.
pub fn parse_content_id(raw: &str) -> Option<ContentId> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
