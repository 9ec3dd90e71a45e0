use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Label used when an entry has no resolvable emotion reference.
pub const UNKNOWN_EMOTION: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Emotion {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
}

/// Request-scoped id -> name lookup built from the small `emotions`
/// reference table. No process-wide cache; rebuilt per request so a
/// write to the table is visible immediately.
#[derive(Debug, Default)]
pub struct EmotionLookup {
    entries: std::collections::HashMap<i32, String>,
}

impl EmotionLookup {
    pub fn new(emotions: &[Emotion]) -> Self {
        Self {
            entries: emotions
                .iter()
                .map(|e| (e.id, e.name.clone()))
                .collect(),
        }
    }

    pub async fn load(db: &sqlx::PgPool) -> Result<Self, sqlx::Error> {
        let emotions = sqlx::query_as::<_, Emotion>("SELECT id, name, color FROM emotions")
            .fetch_all(db)
            .await?;
        Ok(Self::new(&emotions))
    }

    /// Resolve an optional emotion id to its display name, falling back
    /// to the `Unknown` sentinel.
    pub fn name_of(&self, emotion_id: Option<i32>) -> String {
        emotion_id
            .and_then(|id| self.entries.get(&id).cloned())
            .unwrap_or_else(|| UNKNOWN_EMOTION.to_string())
    }

    /// Reverse lookup by case-insensitive name, used when the sentiment
    /// analyzer returns a label instead of an id.
    pub fn id_of(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> EmotionLookup {
        EmotionLookup::new(&[
            Emotion {
                id: 1,
                name: "Joy".into(),
                color: Some("#fbbf24".into()),
            },
            Emotion {
                id: 2,
                name: "Sadness".into(),
                color: None,
            },
        ])
    }

    #[test]
    fn resolves_known_ids() {
        assert_eq!(lookup().name_of(Some(1)), "Joy");
        assert_eq!(lookup().name_of(Some(2)), "Sadness");
    }

    #[test]
    fn unknown_id_and_missing_id_yield_sentinel() {
        assert_eq!(lookup().name_of(Some(99)), UNKNOWN_EMOTION);
        assert_eq!(lookup().name_of(None), UNKNOWN_EMOTION);
    }

    #[test]
    fn reverse_lookup_is_case_insensitive() {
        assert_eq!(lookup().id_of("joy"), Some(1));
        assert_eq!(lookup().id_of("Confusion"), None);
    }
}
