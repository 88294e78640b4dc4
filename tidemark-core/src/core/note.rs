use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub timestamp: u32,
    pub is_code: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_create_note() {
        let note = Note {
            id: 1700000000000,
            content: "let x = 5;".to_string(),
            timestamp: 125,
            is_code: true,
            created_at: Utc.timestamp_opt(1700000000, 0).unwrap(),
        };

        assert_eq!(note.timestamp, 125);
        assert!(note.is_code);
    }

    #[test]
    fn test_note_serializes_with_camel_case_keys() {
        let note = Note {
            id: 42,
            content: "intro".to_string(),
            timestamp: 0,
            is_code: false,
            created_at: Utc.timestamp_opt(1700000000, 0).unwrap(),
        };

        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"isCode\":false"));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("is_code"));
    }
}
