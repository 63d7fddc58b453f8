use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::models::{
    AnalysisData, AnalysisHistory, AnalysisStatus, AnalysisSummary, CompetitorScore, Opportunity,
    Recommendation,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS analyses (
    id TEXT PRIMARY KEY,
    search_query TEXT NOT NULL,
    location TEXT,
    search_count INTEGER NOT NULL,
    status TEXT NOT NULL,
    total_competitors INTEGER NOT NULL DEFAULT 0,
    strong_competitors INTEGER NOT NULL DEFAULT 0,
    opportunities INTEGER NOT NULL DEFAULT 0,
    average_domain_authority REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS search_results (
    analysis_id TEXT NOT NULL REFERENCES analyses(id) ON DELETE CASCADE,
    rank INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    domain TEXT NOT NULL,
    domain_authority INTEGER NOT NULL,
    content_type TEXT NOT NULL,
    competitive_strength TEXT NOT NULL,
    is_target_person INTEGER NOT NULL,
    last_updated TEXT,
    PRIMARY KEY (analysis_id, rank)
);
CREATE TABLE IF NOT EXISTS recommendations (
    id TEXT PRIMARY KEY,
    analysis_id TEXT NOT NULL REFERENCES analyses(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    description TEXT NOT NULL,
    priority_score INTEGER NOT NULL CHECK (priority_score BETWEEN 1 AND 10)
);
CREATE TABLE IF NOT EXISTS opportunities (
    analysis_id TEXT NOT NULL REFERENCES analyses(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    rank INTEGER NOT NULL,
    competitor_url TEXT NOT NULL,
    reason TEXT NOT NULL,
    action_suggestion TEXT NOT NULL,
    impact_score INTEGER NOT NULL,
    PRIMARY KEY (analysis_id, position)
);
";

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid stored timestamp '{}'", raw))?
        .with_timezone(&Utc))
}

/// SQLite-backed record of analyses and their child rows.
pub struct AnalysisStore {
    conn: Connection,
}

impl AnalysisStore {
    pub fn open(path: &Path) -> Result<Self> {
        info!(action = "open", component = "analysis_store", path = ?path, "Opening analysis database");
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to create analysis tables")?;
        Ok(Self { conn })
    }

    /// Inserts or replaces an analysis together with all of its child rows.
    pub fn save_analysis(&mut self, data: &AnalysisData) -> Result<()> {
        let start_time = Instant::now();
        let now = format_timestamp(&Utc::now());
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO analyses (id, search_query, location, search_count, status,
                total_competitors, strong_competitors, opportunities, average_domain_authority,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                search_query = excluded.search_query,
                location = excluded.location,
                search_count = excluded.search_count,
                status = excluded.status,
                total_competitors = excluded.total_competitors,
                strong_competitors = excluded.strong_competitors,
                opportunities = excluded.opportunities,
                average_domain_authority = excluded.average_domain_authority,
                updated_at = excluded.updated_at",
            params![
                data.analysis_id,
                data.search_query,
                data.location,
                data.search_count as i64,
                data.status.as_str(),
                data.analysis.total_competitors as i64,
                data.analysis.strong_competitors as i64,
                data.analysis.opportunities as i64,
                data.analysis.average_domain_authority,
                format_timestamp(&data.created_at),
                now,
            ],
        )
        .context("Failed to save analysis")?;

        for table in ["search_results", "recommendations", "opportunities"] {
            tx.execute(
                &format!("DELETE FROM {} WHERE analysis_id = ?1", table),
                params![data.analysis_id],
            )?;
        }

        {
            let mut insert = tx.prepare(
                "INSERT INTO search_results (analysis_id, rank, url, title, domain, domain_authority,
                    content_type, competitive_strength, is_target_person, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for score in &data.search_results {
                insert
                    .execute(params![
                        data.analysis_id,
                        score.rank,
                        score.url,
                        score.title,
                        score.domain,
                        score.domain_authority,
                        score.content_type.as_str(),
                        score.competitive_strength.as_str(),
                        score.is_target_person,
                        score.last_updated.as_ref().map(format_timestamp),
                    ])
                    .with_context(|| format!("Failed to save search result rank {}", score.rank))?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO recommendations (id, analysis_id, type, description, priority_score)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for rec in &data.recommendations {
                insert
                    .execute(params![
                        rec.id,
                        data.analysis_id,
                        rec.kind.as_str(),
                        rec.description,
                        rec.priority_score,
                    ])
                    .with_context(|| format!("Failed to save recommendation {}", rec.id))?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO opportunities (analysis_id, position, rank, competitor_url, reason,
                    action_suggestion, impact_score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, opportunity) in data.opportunities.iter().enumerate() {
                insert.execute(params![
                    data.analysis_id,
                    position as i64,
                    opportunity.rank,
                    opportunity.competitor_url,
                    opportunity.reason,
                    opportunity.action_suggestion,
                    opportunity.impact_score,
                ])?;
            }
        }

        tx.commit()?;
        info!(
            action = "save",
            component = "analysis_store",
            analysis_id = %data.analysis_id,
            status = %data.status,
            search_results = data.search_results.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Analysis saved"
        );
        Ok(())
    }

    /// Returns `false` when no analysis has the given id.
    pub fn update_status(&self, analysis_id: &str, status: AnalysisStatus) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE analyses SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), format_timestamp(&Utc::now()), analysis_id],
            )
            .context("Failed to update analysis status")?;
        info!(action = "update", component = "analysis_store", analysis_id, status = %status, "Analysis status updated");
        Ok(changed > 0)
    }

    pub fn get_analysis(&self, analysis_id: &str) -> Result<Option<AnalysisData>> {
        let row = self
            .conn
            .query_row(
                "SELECT search_query, location, search_count, status, total_competitors,
                    strong_competitors, opportunities, average_domain_authority, created_at
                 FROM analyses WHERE id = ?1",
                params![analysis_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, f64>(7)?,
                        row.get::<_, String>(8)?,
                    ))
                },
            )
            .optional()
            .context("Failed to query analysis")?;

        let Some((
            search_query,
            location,
            search_count,
            status,
            total_competitors,
            strong_competitors,
            opportunities,
            average_domain_authority,
            created_at,
        )) = row
        else {
            return Ok(None);
        };

        Ok(Some(AnalysisData {
            analysis_id: analysis_id.to_string(),
            search_query,
            location,
            search_count: search_count as usize,
            search_results: self.load_search_results(analysis_id)?,
            analysis: AnalysisSummary {
                total_competitors: total_competitors as usize,
                strong_competitors: strong_competitors as usize,
                opportunities: opportunities as usize,
                average_domain_authority,
            },
            recommendations: self.load_recommendations(analysis_id)?,
            opportunities: self.load_opportunities(analysis_id)?,
            created_at: parse_timestamp(&created_at)?,
            status: status.parse()?,
        }))
    }

    fn load_search_results(&self, analysis_id: &str) -> Result<Vec<CompetitorScore>> {
        let mut stmt = self.conn.prepare(
            "SELECT rank, url, title, domain, domain_authority, content_type,
                competitive_strength, is_target_person, last_updated
             FROM search_results WHERE analysis_id = ?1 ORDER BY rank",
        )?;
        let rows = stmt
            .query_map(params![analysis_id], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u8>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, bool>(7)?,
                    row.get::<_, Option<String>>(8)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(
                |(rank, url, title, domain, domain_authority, content_type, strength, is_target_person, last_updated)|
                 -> Result<CompetitorScore> {
                    Ok(CompetitorScore {
                        rank,
                        url,
                        title,
                        domain,
                        domain_authority,
                        content_type: content_type.parse()?,
                        competitive_strength: strength.parse()?,
                        is_target_person,
                        last_updated: last_updated.as_deref().map(parse_timestamp).transpose()?,
                    })
                },
            )
            .collect()
    }

    fn load_recommendations(&self, analysis_id: &str) -> Result<Vec<Recommendation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, description, priority_score FROM recommendations
             WHERE analysis_id = ?1 ORDER BY priority_score DESC, rowid",
        )?;
        let rows = stmt
            .query_map(params![analysis_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u8>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, kind, description, priority_score)| -> Result<Recommendation> {
                Ok(Recommendation {
                    id,
                    analysis_id: analysis_id.to_string(),
                    kind: kind.parse()?,
                    description,
                    priority_score,
                })
            })
            .collect()
    }

    fn load_opportunities(&self, analysis_id: &str) -> Result<Vec<Opportunity>> {
        let mut stmt = self.conn.prepare(
            "SELECT rank, competitor_url, reason, action_suggestion, impact_score
             FROM opportunities WHERE analysis_id = ?1 ORDER BY position",
        )?;
        let opportunities = stmt
            .query_map(params![analysis_id], |row| {
                Ok(Opportunity {
                    rank: row.get(0)?,
                    competitor_url: row.get(1)?,
                    reason: row.get(2)?,
                    action_suggestion: row.get(3)?,
                    impact_score: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(opportunities)
    }

    /// Most recent analyses first.
    pub fn recent_analyses(&self, limit: usize) -> Result<Vec<AnalysisHistory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, search_query, created_at, status, total_competitors, opportunities
             FROM analyses ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, search_query, created_at, status, total, opportunities)| -> Result<AnalysisHistory> {
                Ok(AnalysisHistory {
                    id,
                    search_query,
                    created_at: parse_timestamp(&created_at)?,
                    status: status.parse()?,
                    total_competitors: total as usize,
                    opportunities: opportunities as usize,
                })
            })
            .collect()
    }
}
