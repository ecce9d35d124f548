//! Lighthouse JSON report digests.

use std::{
    collections::HashMap,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::error;

use crate::error::ReleaseToolError;

pub const CATEGORY_KEYS: [&str; 5] = ["performance", "accessibility", "best-practices", "seo", "pwa"];

/// Average-diff band (in points) inside which a page counts as stable.
const STABLE_BAND: f64 = 2.0;
const SIGNIFICANT_CHANGE: f64 = 5.0;

const PWA_CHECKS: [(&str, &str); 8] = [
    ("service-worker", "Service worker"),
    ("installable-manifest", "Installable manifest"),
    ("splash-screen", "Splash screen"),
    ("themed-omnibox", "Themed address bar"),
    ("maskable-icon", "Maskable icon"),
    ("viewport", "Viewport configured"),
    ("apple-touch-icon", "Apple touch icon"),
    ("content-width", "Content width"),
];

const RULE: &str = "================================================================================";

#[derive(Debug, Clone, Deserialize)]
pub struct LighthouseReport {
    #[serde(rename = "requestedUrl", default)]
    pub requested_url: Option<String>,
    #[serde(default)]
    pub categories: HashMap<String, Category>,
    #[serde(default)]
    pub audits: HashMap<String, Audit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(rename = "auditRefs", default)]
    pub audit_refs: Vec<AuditRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Audit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(rename = "displayValue", default)]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    Missing,
}

impl LighthouseReport {
    pub fn from_path(path: &Path) -> Result<Self, ReleaseToolError> {
        let raw = fs::read_to_string(path).map_err(|err| ReleaseToolError::io(path, err))?;
        serde_json::from_str(&raw).map_err(|err| ReleaseToolError::json(path, err))
    }

    /// Category score on a 0–100 scale; absent or null scores count as 0.
    pub fn score(&self, category: &str) -> f64 {
        self.categories
            .get(category)
            .and_then(|category| category.score)
            .map_or(0.0, |score| score * 100.0)
    }

    pub fn scores(&self) -> CategoryScores {
        CategoryScores(CATEGORY_KEYS.map(|key| self.score(key)))
    }

    /// Scored audits of `category` that did not fully pass, in report order.
    pub fn failing_audits(&self, category: &str) -> Vec<&Audit> {
        let Some(category) = self.categories.get(category) else {
            return Vec::new();
        };
        category
            .audit_refs
            .iter()
            .filter_map(|audit_ref| self.audits.get(&audit_ref.id))
            .filter(|audit| audit.score.is_some_and(|score| score < 1.0))
            .collect()
    }

    pub fn pwa_checks(&self) -> Vec<(&'static str, CheckStatus)> {
        PWA_CHECKS
            .iter()
            .map(|(id, label)| {
                let status = match self.audits.get(*id).map(|audit| audit.score) {
                    None => CheckStatus::Missing,
                    Some(Some(score)) if score >= 1.0 => CheckStatus::Pass,
                    Some(_) => CheckStatus::Fail,
                };
                (*label, status)
            })
            .collect()
    }
}

/// Scores in [`CATEGORY_KEYS`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryScores(pub [f64; 5]);

impl CategoryScores {
    pub fn get(&self, category: &str) -> f64 {
        CATEGORY_KEYS
            .iter()
            .position(|key| *key == category)
            .map_or(0.0, |index| self.0[index])
    }

    pub fn diff(&self, earlier: &CategoryScores) -> CategoryScores {
        let mut out = [0.0; 5];
        for (index, slot) in out.iter_mut().enumerate() {
            *slot = self.0[index] - earlier.0[index];
        }
        CategoryScores(out)
    }

    pub fn mean(&self) -> f64 {
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }
}

pub fn render_summary(report: &LighthouseReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "LIGHTHOUSE SUMMARY");
    if let Some(url) = &report.requested_url {
        let _ = writeln!(out, "URL: {url}");
    }
    let _ = writeln!(out, "{RULE}");

    for key in CATEGORY_KEYS {
        let _ = writeln!(out, "{key:<20} {:>5.0}/100", report.score(key));
    }

    for key in ["accessibility", "best-practices"] {
        let _ = writeln!(out, "\n{RULE}");
        let _ = writeln!(out, "{} ({:.0}/100)\n", key.to_uppercase(), report.score(key));
        let failing = report.failing_audits(key);
        if failing.is_empty() {
            let _ = writeln!(out, "No failing audits.");
        }
        for (index, audit) in failing.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", index + 1, audit.title);
            if let Some(description) = &audit.description {
                let excerpt: String = description.chars().take(150).collect();
                let _ = writeln!(out, "   {excerpt}");
            }
            if let Some(value) = &audit.display_value {
                let _ = writeln!(out, "   value: {value}");
            }
        }
    }

    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "PWA CHECKS\n");
    for (label, status) in report.pwa_checks() {
        let marker = match status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Missing => "n/a",
        };
        let _ = writeln!(out, "[{marker:^4}] {label}");
    }
    out
}

/// One page audited before and after a change.
#[derive(Debug, Clone, Deserialize)]
pub struct PagePair {
    pub name: String,
    pub old: PathBuf,
    pub new: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageComparison {
    pub page: String,
    pub old: CategoryScores,
    pub new: CategoryScores,
    pub diff: CategoryScores,
    pub avg_diff: f64,
}

impl PageComparison {
    pub fn new(page: impl Into<String>, old: CategoryScores, new: CategoryScores) -> Self {
        let diff = new.diff(&old);
        Self {
            page: page.into(),
            old,
            new,
            avg_diff: diff.mean(),
            diff,
        }
    }
}

pub fn load_page_pairs(path: &Path) -> Result<Vec<PagePair>, ReleaseToolError> {
    let raw = fs::read_to_string(path).map_err(|err| ReleaseToolError::io(path, err))?;
    serde_json::from_str(&raw).map_err(|err| ReleaseToolError::json(path, err))
}

/// Loads each pair; pages whose reports cannot be read are logged and skipped.
pub fn compare_pages(pairs: &[PagePair]) -> Vec<PageComparison> {
    pairs
        .iter()
        .filter_map(|pair| {
            let loaded = LighthouseReport::from_path(&pair.old)
                .and_then(|old| LighthouseReport::from_path(&pair.new).map(|new| (old, new)));
            match loaded {
                Ok((old, new)) => Some(PageComparison::new(&pair.name, old.scores(), new.scores())),
                Err(err) => {
                    error!(page = %pair.name, %err, "skipping page");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    SignificantImprovement,
    ModestImprovement,
    ModestRegression,
    SignificantRegression,
}

impl Conclusion {
    pub fn from_average(avg: f64) -> Self {
        if avg > SIGNIFICANT_CHANGE {
            Self::SignificantImprovement
        } else if avg > 0.0 {
            Self::ModestImprovement
        } else if avg > -SIGNIFICANT_CHANGE {
            Self::ModestRegression
        } else {
            Self::SignificantRegression
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::SignificantImprovement => "Significant performance improvement detected",
            Self::ModestImprovement => "Modest performance improvement detected",
            Self::ModestRegression => "Modest performance regression detected",
            Self::SignificantRegression => "Significant performance regression detected",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    pub pages: usize,
    pub avg_diff: f64,
    pub improvements: usize,
    pub regressions: usize,
    pub stable: usize,
    pub perf_avg_diff: f64,
    pub perf_improvements: usize,
    pub perf_regressions: usize,
    pub conclusion: Conclusion,
}

impl ComparisonSummary {
    pub fn from_pages(pages: &[PageComparison]) -> Self {
        let count = pages.len();
        let mean = |values: &mut dyn Iterator<Item = f64>| {
            if count == 0 {
                0.0
            } else {
                values.sum::<f64>() / count as f64
            }
        };

        let avg_diff = mean(&mut pages.iter().map(|page| page.avg_diff));
        let perf_avg_diff = mean(&mut pages.iter().map(|page| page.diff.get("performance")));
        let improvements = pages.iter().filter(|p| p.avg_diff > STABLE_BAND).count();
        let regressions = pages.iter().filter(|p| p.avg_diff < -STABLE_BAND).count();

        Self {
            pages: count,
            avg_diff,
            improvements,
            regressions,
            stable: count - improvements - regressions,
            perf_avg_diff,
            perf_improvements: pages
                .iter()
                .filter(|p| p.diff.get("performance") > STABLE_BAND)
                .count(),
            perf_regressions: pages
                .iter()
                .filter(|p| p.diff.get("performance") < -STABLE_BAND)
                .count(),
            conclusion: Conclusion::from_average(perf_avg_diff),
        }
    }
}

pub fn render_comparison(pages: &[PageComparison]) -> String {
    let wide = "=".repeat(100);
    let thin = "-".repeat(100);
    let mut out = String::new();

    let _ = writeln!(out, "{wide}\nLIGHTHOUSE AUDIT COMPARISON\n{wide}\n");
    for page in pages {
        let _ = writeln!(out, "PAGE: {}\n{thin}", page.page);
        let _ = writeln!(
            out,
            "{:<20} {:<12} {:<12} {:<12} {:<12}\n{thin}",
            "Metric", "Old", "New", "Diff", "% Change"
        );
        for key in CATEGORY_KEYS {
            let (old, new, diff) = (page.old.get(key), page.new.get(key), page.diff.get(key));
            let pct = if old != 0.0 { diff / old * 100.0 } else { 0.0 };
            let _ = writeln!(
                out,
                "{key:<20} {old:<12.1} {new:<12.1} {diff:<12.1} {pct:<12.1}%"
            );
        }
        let _ = writeln!(out, "{:<20} {:<12} {:<12} {:<12.1}\n", "AVERAGE DIFF", "", "", page.avg_diff);
    }

    let summary = ComparisonSummary::from_pages(pages);
    let _ = writeln!(out, "{wide}\nOVERALL STATISTICS\n{wide}");
    let _ = writeln!(out, "Total pages analyzed: {}", summary.pages);
    let _ = writeln!(out, "Average change across all pages: {:.2} points", summary.avg_diff);
    let _ = writeln!(out, "Pages with improvements (>2): {}", summary.improvements);
    let _ = writeln!(out, "Pages with regressions (<-2): {}", summary.regressions);
    let _ = writeln!(out, "Pages with stable scores (±2): {}\n", summary.stable);
    let _ = writeln!(out, "PERFORMANCE ANALYSIS\n{thin}");
    let _ = writeln!(out, "Average performance change: {:.2} points", summary.perf_avg_diff);
    let _ = writeln!(out, "Pages with performance improvement: {}", summary.perf_improvements);
    let _ = writeln!(out, "Pages with performance regression: {}\n", summary.perf_regressions);
    let _ = writeln!(out, "CONCLUSION: {}", summary.conclusion.describe());
    out
}

#[cfg(test)]
#[path = "tests/lighthouse_tests.rs"]
mod tests;
