//! Contradiction signal: a rule matcher over known medical-safety patterns.
//!
//! Three rule families, each with a fixed severity:
//! - unsafe absolute claims (regex over the whole answer)
//! - contraindication assertions: a sentence that names a drug and a
//!   condition it is contraindicated in, and calls the combination safe
//! - dose limits: an amount for a known drug above its single or daily
//!   maximum, after unit normalization (g, mg, mcg)
//!
//! Findings name the rule and the numbers involved, never the sentence.

use std::sync::LazyLock;

use regex::Regex;
use vigil_core::models::{Finding, Signal};

use super::SignalResult;
use crate::text;

static SAFETY_ASSERTION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(safe|safely|recommended|appropriate|preferred|first[- ]line|no (dose |dosage )?adjustment|can be (used|given|continued|taken|started)|is fine|well tolerated)\b",
    )
    .ok()
});

static NEGATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(not|never|avoid|avoided|contraindicated|unsafe|should not|must not|do not|don't|stop|discontinue|withhold)\b",
    )
    .ok()
});

/// Group 1: amount with thousands separators (`6,000`, `1,500.5`).
/// Group 2: plain amount, where a comma is a decimal mark (`1,5`).
/// Group 3: unit.
static DOSE_AMOUNT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(\d{1,3}(?:,\d{3})+(?:\.\d+)?)|(\d+(?:[.,]\d+)?))\s*(mcg|µg|ug|mg|g)\b",
    )
    .ok()
});

static DAILY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(per day|a day|each day|daily|/day|/24 ?h|in 24 hours)").ok()
});

/// A regex rule matched against the whole answer.
#[derive(Debug, Clone)]
pub struct ContradictionRule {
    pub id: String,
    pub description: String,
    pub pattern: Regex,
    pub severity: f64,
}

impl ContradictionRule {
    /// `None` if `pattern` does not compile.
    pub fn new(id: &str, description: &str, pattern: &str, severity: f64) -> Option<Self> {
        Some(Self {
            id: id.to_string(),
            description: description.to_string(),
            pattern: Regex::new(pattern).ok()?,
            severity: severity.clamp(0.0, 1.0),
        })
    }
}

/// A drug that must not be called safe alongside any of `conditions`.
#[derive(Debug, Clone)]
pub struct ContraindicationRule {
    pub id: String,
    pub drug: String,
    pub conditions: Vec<String>,
    pub severity: f64,
}

impl ContraindicationRule {
    pub fn new(id: &str, drug: &str, conditions: &[&str], severity: f64) -> Self {
        Self {
            id: id.to_string(),
            drug: drug.to_lowercase(),
            conditions: conditions.iter().map(|c| c.to_lowercase()).collect(),
            severity: severity.clamp(0.0, 1.0),
        }
    }
}

/// Maximum single and daily dose of a drug, in milligrams.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseLimit {
    pub drug: String,
    pub max_single_mg: f64,
    pub max_daily_mg: f64,
}

impl DoseLimit {
    pub fn new(drug: &str, max_single_mg: f64, max_daily_mg: f64) -> Self {
        Self {
            drug: drug.to_lowercase(),
            max_single_mg,
            max_daily_mg,
        }
    }
}

pub const DOSE_LIMIT_SEVERITY: f64 = 0.9;

/// Convert an amount to milligrams. `None` for an unknown unit.
pub fn to_mg(amount: f64, unit: &str) -> Option<f64> {
    match unit.to_lowercase().as_str() {
        "g" => Some(amount * 1000.0),
        "mg" => Some(amount),
        "mcg" | "µg" | "ug" => Some(amount / 1000.0),
        _ => None,
    }
}

/// The full rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub rules: Vec<ContradictionRule>,
    pub contraindications: Vec<ContraindicationRule>,
    pub dose_limits: Vec<DoseLimit>,
}

impl RuleSet {
    /// Built-in rules.
    pub fn builtin() -> Self {
        let rules = [
            (
                "absolute_safety_claim",
                "unqualified claim that a treatment is completely safe",
                r"(?i)\b(completely|totally|100%|absolutely|perfectly|entirely)\s+(safe|harmless|risk[- ]free)\b",
                0.6,
            ),
            (
                "no_side_effects_claim",
                "claim that a treatment has no side effects or risks",
                r"(?i)\b(has|have|with|causes?|carries)\s+no\s+(side[- ]effects|adverse effects|risks?|interactions)\b",
                0.6,
            ),
            (
                "guaranteed_outcome_claim",
                "claim of a guaranteed clinical outcome",
                r"(?i)\b(guaranteed to|will always|always) (cure|cures|work|works|resolve|resolves)\b",
                0.5,
            ),
            (
                "stop_without_supervision",
                "advice to stop a critical medication without supervision",
                r"(?i)\b(stop|discontinue)\s+(taking\s+)?(your\s+)?(insulin|anticoagulants?|warfarin|steroids?|prednisone|antiepileptics?)\s+(immediately|abruptly|at once)\b",
                0.8,
            ),
        ]
        .into_iter()
        .filter_map(|(id, desc, pattern, severity)| ContradictionRule::new(id, desc, pattern, severity))
        .collect();

        let kidney = ["ckd", "chronic kidney disease", "renal failure", "renal impairment", "kidney failure", "egfr below 30", "dialysis"];
        let pregnancy = ["pregnancy", "pregnant", "first trimester"];
        let contraindications = vec![
            ContraindicationRule::new("metformin_renal", "metformin", &kidney, 0.95),
            ContraindicationRule::new("nsaid_renal", "ibuprofen", &kidney, 0.85),
            ContraindicationRule::new("naproxen_renal", "naproxen", &kidney, 0.85),
            ContraindicationRule::new("isotretinoin_pregnancy", "isotretinoin", &pregnancy, 0.95),
            ContraindicationRule::new("warfarin_pregnancy", "warfarin", &pregnancy, 0.9),
            ContraindicationRule::new("ace_inhibitor_pregnancy", "lisinopril", &pregnancy, 0.9),
            ContraindicationRule::new("methotrexate_pregnancy", "methotrexate", &pregnancy, 0.95),
            ContraindicationRule::new("nitrate_pde5", "nitroglycerin", &["sildenafil", "tadalafil"], 0.95),
            ContraindicationRule::new("beta_blocker_asthma", "propranolol", &["asthma"], 0.8),
        ];

        let dose_limits = vec![
            DoseLimit::new("acetaminophen", 1000.0, 4000.0),
            DoseLimit::new("paracetamol", 1000.0, 4000.0),
            DoseLimit::new("ibuprofen", 800.0, 3200.0),
            DoseLimit::new("aspirin", 1000.0, 4000.0),
            DoseLimit::new("metformin", 1000.0, 2550.0),
            DoseLimit::new("lisinopril", 40.0, 80.0),
            DoseLimit::new("atorvastatin", 80.0, 80.0),
            DoseLimit::new("warfarin", 10.0, 10.0),
            DoseLimit::new("digoxin", 0.5, 0.5),
            DoseLimit::new("amoxicillin", 1000.0, 3000.0),
        ];

        Self {
            rules,
            contraindications,
            dose_limits,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len() + self.contraindications.len() + self.dose_limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Risk is the highest severity among matched rules.
    pub fn evaluate(&self, answer: &str) -> SignalResult {
        let mut findings = Vec::new();
        let mut score: f64 = 0.0;

        for rule in &self.rules {
            if rule.pattern.is_match(answer) {
                score = score.max(rule.severity);
                findings.push(finding(&rule.id, rule.description.clone()));
            }
        }

        for sentence in text::sentences(answer) {
            let lower = sentence.to_lowercase();
            for rule in &self.contraindications {
                if asserts_safe_combination(&lower, rule) {
                    score = score.max(rule.severity);
                    findings.push(finding(
                        &rule.id,
                        format!("{} asserted safe despite a listed contraindication", rule.drug),
                    ));
                }
            }
            for limit in &self.dose_limits {
                if let Some(description) = dose_violation(&lower, limit) {
                    score = score.max(DOSE_LIMIT_SEVERITY);
                    findings.push(finding(&format!("dose_limit_{}", limit.drug), description));
                }
            }
        }

        SignalResult::new(score, findings)
    }
}

fn finding(rule_id: &str, description: String) -> Finding {
    Finding {
        signal: Signal::Contradiction,
        rule_id: rule_id.to_string(),
        description,
    }
}

fn asserts_safe_combination(sentence: &str, rule: &ContraindicationRule) -> bool {
    if !sentence.contains(&rule.drug) || !rule.conditions.iter().any(|c| sentence.contains(c.as_str())) {
        return false;
    }
    let (Some(safe), Some(negation)) = (SAFETY_ASSERTION.as_ref(), NEGATION.as_ref()) else {
        return false;
    };
    safe.is_match(sentence) && !negation.is_match(sentence)
}

fn dose_violation(sentence: &str, limit: &DoseLimit) -> Option<String> {
    if !sentence.contains(&limit.drug) {
        return None;
    }
    let amounts = DOSE_AMOUNT.as_ref()?;
    let daily = DAILY.as_ref().is_some_and(|re| re.is_match(sentence));
    let max = if daily { limit.max_daily_mg } else { limit.max_single_mg };

    amounts.captures_iter(sentence).find_map(|cap| {
        let amount = match (cap.get(1), cap.get(2)) {
            (Some(grouped), _) => grouped.as_str().replace(',', ""),
            (None, Some(plain)) => plain.as_str().replace(',', "."),
            (None, None) => return None,
        };
        let mg = to_mg(amount.parse().ok()?, cap.get(3)?.as_str())?;
        (mg > max + f64::EPSILON).then(|| {
            format!(
                "{} {mg} mg exceeds {} limit of {max} mg",
                if daily { "daily dose" } else { "single dose" },
                limit.drug
            )
        })
    })
}
