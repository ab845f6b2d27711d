use regex::Regex;
use std::sync::OnceLock;

pub const QUANTITATIVE_APTITUDE: &str = "Quantitative Aptitude";
pub const LOGICAL_REASONING: &str = "Logical Reasoning";
pub const VERBAL_READING: &str = "Verbal & Reading";
pub const PROGRAMMING_CODING: &str = "Programming/Coding";
pub const DATA_INTERPRETATION: &str = "Data Interpretation";
pub const GENERAL_REASONING: &str = "General Reasoning";
pub const GENERAL_KNOWLEDGE: &str = "General Knowledge";

/// Every match counts this much toward its category's aggregate score.
const KEYWORD_WEIGHT: usize = 2;

/// Below this length, unmatched text is treated as a short reasoning prompt.
const SHORT_TEXT_LIMIT: usize = 100;

static KEYWORD_TABLES: OnceLock<Vec<(&'static str, Vec<Regex>)>> = OnceLock::new();

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid category keyword pattern"))
        .collect()
}

/// Tables are built once and enumerated in a fixed order; ties resolve to the
/// earliest entry.
fn keyword_tables() -> &'static [(&'static str, Vec<Regex>)] {
    KEYWORD_TABLES.get_or_init(|| {
        vec![
            (
                QUANTITATIVE_APTITUDE,
                compile(&[
                    r"\bprofit\b",
                    r"\bloss\b",
                    r"\bpercentage\b",
                    r"\bpercent\b",
                    r"\bratio\b",
                    r"\binterest\b",
                    r"\baverage\b",
                    r"\bspeed\b",
                    r"\bdistance\b",
                    r"\bcost\b",
                    r"\bprice\b",
                    r"\bsell\b",
                    r"\bdiscount\b",
                    r"\bfraction\b",
                    r"\bdivisible\b",
                    r"\bequation\b",
                    r"\btrain\b",
                    r"\bmixture\b",
                ]),
            ),
            (
                LOGICAL_REASONING,
                compile(&[
                    r"\bseries\b",
                    r"\bsequence\b",
                    r"\bsyllogism\b",
                    r"\bblood relation",
                    r"\bdirection\b",
                    r"\barrangement\b",
                    r"\bpuzzle\b",
                    r"\banalogy\b",
                    r"\bodd one out\b",
                    r"\bstatement\b",
                    r"\bconclusion\b",
                ]),
            ),
            (
                VERBAL_READING,
                compile(&[
                    r"\bsynonym\b",
                    r"\bantonym\b",
                    r"\bgrammar\b",
                    r"\bsentence\b",
                    r"\bpassage\b",
                    r"\bcomprehension\b",
                    r"\bvocabulary\b",
                    r"\bidiom\b",
                    r"\bphrase\b",
                    r"\bparagraph\b",
                    r"\bfill in the blank",
                ]),
            ),
            (
                PROGRAMMING_CODING,
                compile(&[
                    r"\bprogram\b",
                    r"\bcode\b",
                    r"\bfunction\b",
                    r"\barray\b",
                    r"\bstring\b",
                    r"\bloop\b",
                    r"\brecursion\b",
                    r"\balgorithm\b",
                    r"\bcomplexity\b",
                    r"\boutput\b",
                    r"\bcompile\b",
                    r"\bpointer\b",
                    r"\bstack\b",
                    r"\bqueue\b",
                    r"\blinked list\b",
                    r"\bsql\b",
                    r"\bvariable\b",
                ]),
            ),
            (
                DATA_INTERPRETATION,
                compile(&[
                    r"\bgraph\b",
                    r"\bchart\b",
                    r"\btable\b",
                    r"\bpie\b",
                    r"\bbar\b",
                    r"\bhistogram\b",
                    r"\bdiagram\b",
                    r"\bdata\b",
                ]),
            ),
            (
                GENERAL_REASONING,
                compile(&[
                    r"\bassumption\b",
                    r"\binference\b",
                    r"\bcourse of action\b",
                    r"\bdecision\b",
                    r"\bjudgment\b",
                ]),
            ),
            (
                GENERAL_KNOWLEDGE,
                compile(&[
                    r"\bcapital\b",
                    r"\bcountry\b",
                    r"\bpresident\b",
                    r"\bcurrency\b",
                    r"\binvented\b",
                    r"\bhistory\b",
                    r"\baward\b",
                    r"\bfounded\b",
                ]),
            ),
        ]
    })
}

/// Buckets free question text into one subject label. Deterministic: the same
/// text always yields the same label.
pub fn categorize(text: Option<&str>) -> &'static str {
    let Some(raw) = text else {
        return GENERAL_KNOWLEDGE;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return GENERAL_KNOWLEDGE;
    }

    let lower = trimmed.to_lowercase();

    let mut best_label = keyword_tables()[0].0;
    let mut best_score = 0usize;
    for (label, patterns) in keyword_tables() {
        let score: usize = patterns
            .iter()
            .map(|re| re.find_iter(&lower).count() * KEYWORD_WEIGHT)
            .sum();
        if score > best_score {
            best_score = score;
            best_label = *label;
        }
    }

    if best_score > 0 {
        return best_label;
    }

    if lower.chars().count() < SHORT_TEXT_LIMIT {
        GENERAL_REASONING
    } else if lower.contains("passage") || lower.contains("read") {
        VERBAL_READING
    } else {
        GENERAL_KNOWLEDGE
    }
}
