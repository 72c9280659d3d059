//! Payment link inspection
//!
//! Classifies a payment URL by domain reputation and lexical lure signals:
//! URL shorteners, bait keywords, and lookalike impersonation of known
//! brand/bank domains.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Maximum link risk score
pub const MAX_LINK_RISK: u8 = 30;

const SHORTENER_DOMAINS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "cutt.ly",
    "rb.gy",
    "shorturl.at",
];

const LURE_KEYWORDS: &[&str] = &[
    "win", "free", "cash", "earn", "lucky", "refund", "prize", "offer", "claim", "lottery",
    "invest", "recharge", "cashback",
];

const LEGITIMATE_DOMAINS: &[&str] = &[
    "paytm.com",
    "phonepe.com",
    "razorpay.com",
    "sbi.co.in",
    "onlinesbi.sbi",
    "hdfcbank.com",
    "icicibank.com",
    "axisbank.com",
    "amazon.in",
    "flipkart.com",
    "npci.org.in",
    "pay.google.com",
];

const TRUSTED_BRANDS: &[&str] = &[
    "razorpay", "paytm", "phonepe", "hdfcbank", "icicibank", "axisbank", "onlinesbi", "npci",
    "amazon", "flipkart", "google",
];

/// Simulated domain ages, in days
const SHORTENER_AGE_DAYS: u32 = 5;
const TRUSTED_AGE_DAYS: u32 = 2000;
const LURE_AGE_DAYS: u32 = 15;
const DEFAULT_AGE_DAYS: u32 = 90;

/// Result of inspecting a payment link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInspectionResult {
    pub domain: String,
    pub is_shortened: bool,
    pub has_suspicious_keywords: bool,
    /// Similarity to the closest non-identical legitimate domain (0.0-1.0)
    pub lookalike_similarity: f64,
    pub lookalike_target: Option<String>,
    pub domain_age_days: u32,
    /// Link risk score (0-30)
    pub risk_score: u8,
}

impl LinkInspectionResult {
    /// True when the domain closely imitates a legitimate domain
    pub fn is_lookalike(&self) -> bool {
        self.lookalike_similarity > 0.7 && self.lookalike_similarity < 1.0
    }

    /// True when the simulated domain age is under a month
    pub fn is_new_domain(&self) -> bool {
        self.domain_age_days < 30
    }
}

/// Coarse reputation tier of a payment link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkRiskTier {
    #[default]
    None,
    Trusted,
    Unknown,
    New,
}

impl LinkRiskTier {
    /// Classify an inspected link by its simulated domain age
    pub fn classify(result: &LinkInspectionResult) -> Self {
        if result.domain_age_days >= 365 {
            LinkRiskTier::Trusted
        } else if result.is_new_domain() {
            LinkRiskTier::New
        } else {
            LinkRiskTier::Unknown
        }
    }

    /// Flat risk contribution used when no inspection score is available
    pub fn fallback_contribution(&self) -> f64 {
        match self {
            LinkRiskTier::None => 0.0,
            LinkRiskTier::Trusted => 3.0,
            LinkRiskTier::Unknown => 15.0,
            LinkRiskTier::New => 20.0,
        }
    }
}

fn scheme_pattern() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| Regex::new(r"^[a-z][a-z0-9+.\-]*://").expect("valid scheme pattern"))
}

/// Extract the bare domain from a URL-like string
pub fn extract_domain(link: &str) -> String {
    let lowered = link.trim().to_lowercase();
    let without_scheme = scheme_pattern().replace(&lowered, "");
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Levenshtein edit distance over chars
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Normalized similarity: 1 - distance / max length
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Find the closest legitimate domain that is not an exact match
fn closest_lookalike(domain: &str) -> (f64, Option<String>) {
    let mut best: (f64, Option<String>) = (0.0, None);
    for candidate in LEGITIMATE_DOMAINS {
        let score = similarity(domain, candidate);
        if score < 1.0 && score > best.0 {
            best = (score, Some(candidate.to_string()));
        }
    }
    (round2(best.0), best.1)
}

/// Inspect a payment link. Returns `None` when no link is supplied.
pub fn inspect_link(link: Option<&str>) -> Option<LinkInspectionResult> {
    let link = link?.trim();
    if link.is_empty() {
        return None;
    }

    let domain = extract_domain(link);
    let lowered = link.to_lowercase();

    let is_shortened = SHORTENER_DOMAINS.contains(&domain.as_str());
    let has_suspicious_keywords = LURE_KEYWORDS.iter().any(|k| lowered.contains(k));
    let (lookalike_similarity, lookalike_target) = closest_lookalike(&domain);

    let domain_age_days = if is_shortened {
        SHORTENER_AGE_DAYS
    } else if TRUSTED_BRANDS.iter().any(|b| domain.contains(b)) {
        TRUSTED_AGE_DAYS
    } else if has_suspicious_keywords {
        LURE_AGE_DAYS
    } else {
        DEFAULT_AGE_DAYS
    };

    let mut score: u32 = 0;
    if is_shortened {
        score += 10;
    }
    if has_suspicious_keywords {
        score += 8;
    }
    if lookalike_similarity > 0.7 && lookalike_similarity < 1.0 {
        score += 7;
    }
    if domain_age_days < 30 {
        score += 5;
    }

    Some(LinkInspectionResult {
        domain,
        is_shortened,
        has_suspicious_keywords,
        lookalike_similarity,
        lookalike_target,
        domain_age_days,
        risk_score: score.min(MAX_LINK_RISK as u32) as u8,
    })
}
