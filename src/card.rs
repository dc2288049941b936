//! Contact-card record and statistics models
//!
//! Field names mirror the remote API's JSON schema exactly, so the same
//! struct serves as the wire type, the SQLite row type, and the in-memory
//! record. All text fields default to the empty string — never null — both
//! at construction and after deserialization.

use serde::{Deserialize, Serialize};

/// Derived completeness classification of a card
///
/// Serialized as `"normal"` / `"incomplete"`, the values the remote API
/// and the local `health_status` column use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Completeness {
    #[serde(rename = "normal")]
    #[sqlx(rename = "normal")]
    Complete,
    #[default]
    Incomplete,
}

impl Completeness {
    /// Storage/wire representation of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Completeness::Complete => "normal",
            Completeness::Incomplete => "incomplete",
        }
    }
}

/// A contact-card record: 25 optional text fields plus system fields.
///
/// `id` of 0 means "not yet persisted remotely"; once a card has synced,
/// it carries the server-assigned identifier. `image_path` references a
/// locally cached image and is never sent over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    #[serde(default)]
    pub id: i64,

    // Identity
    #[serde(default)]
    pub name_zh: String,
    #[serde(default)]
    pub name_en: String,

    // Organization
    #[serde(default)]
    pub company_name_zh: String,
    #[serde(default)]
    pub company_name_en: String,
    #[serde(default)]
    pub position_zh: String,
    #[serde(default)]
    pub position_en: String,
    #[serde(default)]
    pub position1_zh: String,
    #[serde(default)]
    pub position1_en: String,
    #[serde(default)]
    pub department1_zh: String,
    #[serde(default)]
    pub department1_en: String,
    #[serde(default)]
    pub department2_zh: String,
    #[serde(default)]
    pub department2_en: String,
    #[serde(default)]
    pub department3_zh: String,
    #[serde(default)]
    pub department3_en: String,

    // Contact
    #[serde(default)]
    pub mobile_phone: String,
    #[serde(default)]
    pub company_phone1: String,
    #[serde(default)]
    pub company_phone2: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub line_id: String,

    // Address
    #[serde(default)]
    pub company_address1_zh: String,
    #[serde(default)]
    pub company_address1_en: String,
    #[serde(default)]
    pub company_address2_zh: String,
    #[serde(default)]
    pub company_address2_en: String,

    // Notes
    #[serde(default)]
    pub note1: String,
    #[serde(default)]
    pub note2: String,

    // System fields
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub health_status: Completeness,

    /// Local-only reference to a cached card image; never serialized
    #[serde(skip_serializing, default)]
    pub image_path: String,
}

impl Card {
    /// Empty card with no identifier (id 0 = not yet persisted remotely)
    pub fn new() -> Self {
        Self::default()
    }

    /// All 25 user-editable text fields, in declared order.
    ///
    /// Used by substring search and by the classifier tests; keep in sync
    /// with the struct definition.
    pub fn text_fields(&self) -> [&str; 25] {
        [
            &self.name_zh,
            &self.name_en,
            &self.company_name_zh,
            &self.company_name_en,
            &self.position_zh,
            &self.position_en,
            &self.position1_zh,
            &self.position1_en,
            &self.department1_zh,
            &self.department1_en,
            &self.department2_zh,
            &self.department2_en,
            &self.department3_zh,
            &self.department3_en,
            &self.mobile_phone,
            &self.company_phone1,
            &self.company_phone2,
            &self.email,
            &self.line_id,
            &self.company_address1_zh,
            &self.company_address1_en,
            &self.company_address2_zh,
            &self.company_address2_en,
            &self.note1,
            &self.note2,
        ]
    }

    /// Stamp `updated_at` (and `created_at` when still empty) with the
    /// current UTC time in RFC 3339. Timestamps are otherwise opaque and
    /// caller-assigned; this is a convenience for callers that have no
    /// authoritative clock of their own.
    pub fn touch(&mut self) {
        let now = chrono::Utc::now().to_rfc3339();
        if self.created_at.is_empty() {
            self.created_at = now.clone();
        }
        self.updated_at = now;
    }

    /// Display name: prefer the zh variant, fall back to en
    pub fn display_name(&self) -> &str {
        if !self.name_zh.is_empty() {
            &self.name_zh
        } else {
            &self.name_en
        }
    }

    /// Display company: prefer the zh variant, fall back to en
    pub fn display_company(&self) -> &str {
        if !self.company_name_zh.is_empty() {
            &self.company_name_zh
        } else {
            &self.company_name_en
        }
    }

    /// Display position: position then position1, zh before en
    pub fn display_position(&self) -> &str {
        [
            &self.position_zh,
            &self.position_en,
            &self.position1_zh,
            &self.position1_en,
        ]
        .into_iter()
        .find(|f| !f.is_empty())
        .map(String::as_str)
        .unwrap_or("")
    }

    /// Display department: department1 through department3, zh before en
    pub fn display_department(&self) -> &str {
        [
            &self.department1_zh,
            &self.department1_en,
            &self.department2_zh,
            &self.department2_en,
            &self.department3_zh,
            &self.department3_en,
        ]
        .into_iter()
        .find(|f| !f.is_empty())
        .map(String::as_str)
        .unwrap_or("")
    }
}

/// Aggregate completeness statistics, derived per request and never
/// persisted. `completion_rate` is a percentage (70.0 for 7 of 10).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_cards: u32,
    pub normal_cards: u32,
    pub incomplete_cards: u32,
    pub completion_rate: f64,
}

impl Statistics {
    /// Build a snapshot from raw counts, computing the completion rate
    pub fn from_counts(total: u32, complete: u32, incomplete: u32) -> Self {
        let completion_rate = if total > 0 {
            f64::from(complete) / f64::from(total) * 100.0
        } else {
            0.0
        };
        Self {
            total_cards: total,
            normal_cards: complete,
            incomplete_cards: incomplete,
            completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_has_empty_fields_and_zero_id() {
        let card = Card::new();
        assert_eq!(card.id, 0);
        assert!(card.text_fields().iter().all(|f| f.is_empty()));
        assert_eq!(card.health_status, Completeness::Incomplete);
    }

    #[test]
    fn display_helpers_prefer_zh_then_en() {
        let mut card = Card::new();
        card.name_en = "John".into();
        assert_eq!(card.display_name(), "John");
        card.name_zh = "张三".into();
        assert_eq!(card.display_name(), "张三");

        card.department2_en = "Engineering".into();
        assert_eq!(card.display_department(), "Engineering");
        card.department1_en = "R&D".into();
        assert_eq!(card.display_department(), "R&D");
        assert_eq!(card.display_position(), "");
    }

    #[test]
    fn image_path_is_not_serialized() {
        let mut card = Card::new();
        card.image_path = "/data/cards/1.jpg".into();
        let json = serde_json::to_value(&card).unwrap();
        assert!(json.get("image_path").is_none());
    }

    #[test]
    fn health_status_uses_wire_values() {
        let mut card = Card::new();
        card.health_status = Completeness::Complete;
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["health_status"], "normal");

        let parsed: Card =
            serde_json::from_str(r#"{"id": 3, "health_status": "incomplete"}"#).unwrap();
        assert_eq!(parsed.health_status, Completeness::Incomplete);
        assert_eq!(parsed.id, 3);
        assert_eq!(parsed.name_zh, "");
    }

    #[test]
    fn completion_rate_is_a_percentage() {
        let stats = Statistics::from_counts(10, 7, 3);
        assert_eq!(stats.completion_rate, 70.0);
        assert_eq!(Statistics::from_counts(0, 0, 0).completion_rate, 0.0);
    }

    #[test]
    fn touch_preserves_existing_created_at() {
        let mut card = Card::new();
        card.created_at = "2024-01-01T00:00:00Z".into();
        card.touch();
        assert_eq!(card.created_at, "2024-01-01T00:00:00Z");
        assert!(!card.updated_at.is_empty());
    }
}
