//! Terminology signal: domain terms checked against a controlled vocabulary.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use vigil_core::errors::ConfigError;
use vigil_core::models::{Finding, Signal};

use super::SignalResult;

/// Words that look like clinical terms by their suffix.
static DOMAIN_TERM: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b[a-z]{3,}(?:itis|osis|emia|aemia|pathy|ectomy|ostomy|otomy|plasty|algia|uria|penia|formin|pril|sartan|olol|statin|mycin|cillin|floxacin|prazole|azole|parin|dipine|tidine|mab|tinib|ovir)\b",
    )
    .ok()
});

static BUILTIN_TERMS: &[&str] = &[
    // drugs
    "metformin", "lisinopril", "enalapril", "ramipril", "captopril", "perindopril", "losartan",
    "valsartan", "irbesartan", "candesartan", "telmisartan", "metoprolol", "atenolol",
    "propranolol", "bisoprolol", "carvedilol", "nebivolol", "atorvastatin", "simvastatin",
    "rosuvastatin", "pravastatin", "amoxicillin", "penicillin", "ampicillin", "dicloxacillin",
    "azithromycin", "erythromycin", "clarithromycin", "clindamycin", "vancomycin",
    "ciprofloxacin", "levofloxacin", "moxifloxacin", "fluconazole", "ketoconazole",
    "itraconazole", "metronidazole", "omeprazole", "pantoprazole", "esomeprazole",
    "lansoprazole", "heparin", "enoxaparin", "dalteparin", "amlodipine", "nifedipine",
    "felodipine", "famotidine", "ranitidine", "cimetidine", "rituximab", "trastuzumab",
    "adalimumab", "infliximab", "pembrolizumab", "nivolumab", "imatinib", "erlotinib",
    "gefitinib", "acyclovir", "valacyclovir", "oseltamivir", "tenofovir",
    // conditions and procedures
    "arthritis", "osteoarthritis", "hepatitis", "nephritis", "glomerulonephritis", "gastritis",
    "dermatitis", "bronchitis", "appendicitis", "meningitis", "pancreatitis", "colitis",
    "sinusitis", "tendinitis", "cellulitis", "conjunctivitis", "cirrhosis", "fibrosis",
    "thrombosis", "stenosis", "osteoporosis", "tuberculosis", "psoriasis", "ketoacidosis",
    "acidosis", "atherosclerosis", "diagnosis", "prognosis", "nephropathy", "neuropathy",
    "retinopathy", "cardiomyopathy", "encephalopathy", "anemia", "anaemia", "leukemia",
    "hyperkalemia", "hypokalemia", "hyperglycemia", "hypoglycemia", "septicemia", "ischemia",
    "hyperlipidemia", "hyponatremia", "hypernatremia", "bacteremia", "nephrectomy",
    "appendectomy", "cholecystectomy", "mastectomy", "hysterectomy", "tracheostomy",
    "colostomy", "tracheotomy", "angioplasty", "arthroplasty", "neuralgia", "myalgia",
    "arthralgia", "fibromyalgia", "proteinuria", "hematuria", "albuminuria", "neutropenia",
    "thrombocytopenia", "leukopenia",
];

/// Controlled vocabulary of accepted domain terms, lowercase.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: HashSet<String>,
}

impl Vocabulary {
    pub fn builtin() -> Self {
        let mut vocab = Self::default();
        vocab.extend(BUILTIN_TERMS.iter().copied());
        vocab
    }

    /// Newline-delimited terms; blank lines and `#` comments are skipped.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let before = self.terms.len();
        self.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        );
        Ok(self.terms.len() - before)
    }

    pub fn extend<'a>(&mut self, terms: impl IntoIterator<Item = &'a str>) {
        self.terms
            .extend(terms.into_iter().map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()));
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Distinct lowercase domain terms in `answer`.
pub fn domain_terms(answer: &str) -> HashSet<String> {
    let Some(re) = DOMAIN_TERM.as_ref() else {
        return HashSet::new();
    };
    re.find_iter(answer).map(|m| m.as_str().to_lowercase()).collect()
}

pub fn evaluate(answer: &str, vocabulary: &Vocabulary) -> SignalResult {
    let terms = domain_terms(answer);
    if terms.is_empty() {
        return SignalResult::clean();
    }
    let unknown = terms.iter().filter(|t| !vocabulary.contains(t)).count();
    let findings = if unknown > 0 {
        vec![Finding {
            signal: Signal::Terminology,
            rule_id: "unknown_terms".into(),
            description: format!("{unknown} of {} domain terms not in vocabulary", terms.len()),
        }]
    } else {
        Vec::new()
    };
    SignalResult::new(unknown as f64 / terms.len() as f64, findings)
}
