use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One organic result position as returned by a search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub rank: u32,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMetrics {
    pub domain: String,
    pub domain_authority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_authority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spam_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backlinks: Option<u64>,
}

impl DomainMetrics {
    pub const DEFAULT_AUTHORITY: u8 = 25;

    /// Metrics substituted when no provider entry matches a result.
    pub fn fallback(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            domain_authority: Self::DEFAULT_AUTHORITY,
            page_authority: None,
            spam_score: None,
            backlinks: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Person,
    News,
    Social,
    Other,
}

/// Declared low-to-high so the derived ordering reads `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitiveStrength {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Immediate,
    MediumTerm,
    LongTerm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> anyhow::Result<Self> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => anyhow::bail!("Unknown {} value '{}'", stringify!($ty), other),
                }
            }
        }
    };
}

string_enum!(ContentType {
    Person => "person",
    News => "news",
    Social => "social",
    Other => "other",
});

string_enum!(CompetitiveStrength {
    High => "high",
    Medium => "medium",
    Low => "low",
});

string_enum!(RecommendationType {
    Immediate => "immediate",
    MediumTerm => "medium_term",
    LongTerm => "long_term",
});

string_enum!(AnalysisStatus {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
});

/// A search result joined with its domain metrics and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorScore {
    pub rank: u32,
    pub url: String,
    pub title: String,
    pub domain: String,
    pub domain_authority: u8,
    pub content_type: ContentType,
    pub competitive_strength: CompetitiveStrength,
    pub is_target_person: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub rank: u32,
    pub competitor_url: String,
    pub reason: String,
    pub action_suggestion: String,
    pub impact_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Empty until the caller assigns one.
    pub id: String,
    /// Empty until the caller assigns one.
    pub analysis_id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub description: String,
    pub priority_score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_competitors: usize,
    pub strong_competitors: usize,
    pub opportunities: usize,
    pub average_domain_authority: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub search_count: usize,
}

/// The full record of one analysis run, as persisted and as emitted by `--json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub analysis_id: String,
    pub search_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub search_count: usize,
    pub search_results: Vec<CompetitorScore>,
    pub analysis: AnalysisSummary,
    pub recommendations: Vec<Recommendation>,
    pub opportunities: Vec<Opportunity>,
    pub created_at: DateTime<Utc>,
    pub status: AnalysisStatus,
}

impl AnalysisData {
    /// An empty record in the given status, used before the pipeline has results.
    pub fn placeholder(analysis_id: &str, request: &AnalysisRequest, status: AnalysisStatus) -> Self {
        Self {
            analysis_id: analysis_id.to_string(),
            search_query: request.name.clone(),
            location: request.location.clone(),
            search_count: request.search_count,
            search_results: Vec::new(),
            analysis: AnalysisSummary::default(),
            recommendations: Vec::new(),
            opportunities: Vec::new(),
            created_at: Utc::now(),
            status,
        }
    }
}

/// Row of the analysis history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHistory {
    pub id: String,
    pub search_query: String,
    pub created_at: DateTime<Utc>,
    pub status: AnalysisStatus,
    pub total_competitors: usize,
    pub opportunities: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_orders_high_above_low() {
        assert!(CompetitiveStrength::High > CompetitiveStrength::Medium);
        assert!(CompetitiveStrength::Medium > CompetitiveStrength::Low);
    }

    #[test]
    fn enums_parse_their_own_names() {
        assert_eq!(
            "medium_term".parse::<RecommendationType>().unwrap(),
            RecommendationType::MediumTerm
        );
        assert_eq!("news".parse::<ContentType>().unwrap(), ContentType::News);
        assert!("urgent".parse::<AnalysisStatus>().is_err());
    }

    #[test]
    fn recommendation_serializes_type_field() {
        let rec = Recommendation {
            id: String::new(),
            analysis_id: String::new(),
            kind: RecommendationType::LongTerm,
            description: "x".into(),
            priority_score: 7,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "long_term");
        assert_eq!(json["priorityScore"], 7);
    }
}
