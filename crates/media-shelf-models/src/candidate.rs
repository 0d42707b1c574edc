use serde::{Deserialize, Deserializer, Serialize};

/// A "similar item" returned by the external movie database for one seed.
///
/// Field names follow the external API payload so candidate lists can be
/// deserialized straight from a recommendations response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    #[serde(rename = "id", deserialize_with = "deserialize_external_id")]
    pub external_id: String,
    #[serde(rename = "vote_average", default)]
    pub rating: f64,
    #[serde(default)]
    pub popularity: f64,
    /// Movies carry `title`, series carry `name`.
    #[serde(alias = "name", default)]
    pub title: String,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub vote_count: u64,
}

/// A ranked recommendation produced from one or more candidates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// How many seeds suggested this item, plus the watchlist boost.
    pub occurrences: u32,
    /// Already in the library as a watchlist entry.
    pub already_tracked: bool,
}

fn deserialize_external_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_from_movie_payload() {
        let json = r#"{"id": 603, "vote_average": 8.2, "popularity": 80.5, "title": "The Matrix",
                       "backdrop_path": "/bg.jpg", "overview": "Neo.", "vote_count": 25000}"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.external_id, "603");
        assert_eq!(candidate.title, "The Matrix");
        assert_eq!(candidate.vote_count, 25000);
    }

    #[test]
    fn test_candidate_from_series_payload_uses_name() {
        let json = r#"{"id": "1399", "vote_average": 8.4, "name": "Game of Thrones"}"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.external_id, "1399");
        assert_eq!(candidate.title, "Game of Thrones");
        assert_eq!(candidate.backdrop_path, None);
        assert_eq!(candidate.popularity, 0.0);
    }
}
