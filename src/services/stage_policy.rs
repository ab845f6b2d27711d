pub const STAGE_COMPLETED: &str = "completed";
pub const STAGE_INTERVIEW: &str = "interview";

static TCS_STAGES: &[&str] = &["foundation", "advanced", "coding", "interview", "completed"];
static WIPRO_STAGES: &[&str] = &["aptitude", "essay", "coding", "voice", "interview", "completed"];

pub struct StagePolicy;

impl StagePolicy {
    /// Canonical stage order for a company, or None when the company is not
    /// configured. Company names match case-insensitively.
    pub fn stage_order(company: &str) -> Option<&'static [&'static str]> {
        match company.to_ascii_lowercase().as_str() {
            "tcs" => Some(TCS_STAGES),
            "wipro" => Some(WIPRO_STAGES),
            _ => None,
        }
    }

    pub fn is_known_stage(company: &str, stage: &str) -> bool {
        Self::stage_order(company)
            .map(|order| order.contains(&stage))
            .unwrap_or(false)
    }

    /// Company- and stage-specific pass rule. Objective stages gate on the
    /// rounded percentage; coding stages gate on problems solved. Anything
    /// not in the table fails closed.
    pub fn evaluate_pass(company: &str, stage: &str, percentage: u32, raw_score: u32) -> bool {
        match (company.to_ascii_lowercase().as_str(), stage) {
            ("tcs", "foundation") => percentage >= 60,
            ("tcs", "advanced") => percentage >= 65,
            ("tcs", "coding") => raw_score >= 2,
            ("wipro", "aptitude") => percentage >= 65,
            ("wipro", "essay") => percentage >= 70,
            ("wipro", "coding") => raw_score >= 1,
            ("wipro", "voice") => percentage >= 60,
            _ => false,
        }
    }

    /// Walks the fixed stage order. A failed stage stays put; a passed stage
    /// advances to its successor, or to "completed" past the end. An unknown
    /// company degenerates to "completed" — callers are expected to have
    /// rejected it before getting here.
    pub fn next_stage(company: &str, current_stage: &str, passed: bool) -> String {
        if !passed {
            return current_stage.to_string();
        }
        let Some(order) = Self::stage_order(company) else {
            return STAGE_COMPLETED.to_string();
        };
        match order.iter().position(|s| *s == current_stage) {
            Some(idx) if idx + 1 < order.len() => order[idx + 1].to_string(),
            _ => STAGE_COMPLETED.to_string(),
        }
    }

    pub fn is_last_stage(stage: &str) -> bool {
        stage == STAGE_INTERVIEW || stage == STAGE_COMPLETED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcs_foundation_passes_at_sixty_five_percent() {
        assert!(StagePolicy::evaluate_pass("TCS", "foundation", 65, 13));
        assert!(StagePolicy::evaluate_pass("tcs", "foundation", 60, 12));
        assert!(!StagePolicy::evaluate_pass("TCS", "foundation", 59, 11));
    }

    #[test]
    fn coding_stages_gate_on_raw_score() {
        assert!(StagePolicy::evaluate_pass("TCS", "coding", 0, 2));
        assert!(!StagePolicy::evaluate_pass("TCS", "coding", 100, 1));
        assert!(StagePolicy::evaluate_pass("Wipro", "coding", 0, 1));
        assert!(!StagePolicy::evaluate_pass("Wipro", "coding", 0, 0));
    }

    #[test]
    fn unknown_company_or_stage_fails_closed() {
        assert!(!StagePolicy::evaluate_pass("Infosys", "foundation", 100, 100));
        assert!(!StagePolicy::evaluate_pass("TCS", "aptitude", 100, 100));
        assert!(!StagePolicy::evaluate_pass("TCS", "interview", 100, 100));
    }

    #[test]
    fn passing_chain_walks_the_order_without_skips() {
        let mut stage = "foundation".to_string();
        let mut seen = vec![stage.clone()];
        while stage != STAGE_COMPLETED {
            stage = StagePolicy::next_stage("TCS", &stage, true);
            seen.push(stage.clone());
        }
        assert_eq!(
            seen,
            vec!["foundation", "advanced", "coding", "interview", "completed"]
        );
    }

    #[test]
    fn failed_stage_does_not_advance() {
        assert_eq!(StagePolicy::next_stage("Wipro", "essay", false), "essay");
    }

    #[test]
    fn next_stage_after_foundation_pass_is_advanced() {
        assert_eq!(StagePolicy::next_stage("TCS", "foundation", true), "advanced");
    }

    #[test]
    fn unknown_company_degenerates_to_completed() {
        assert_eq!(StagePolicy::next_stage("Acme", "anything", true), "completed");
    }

    #[test]
    fn only_interview_and_completed_are_terminal() {
        assert!(StagePolicy::is_last_stage("interview"));
        assert!(StagePolicy::is_last_stage("completed"));
        assert!(!StagePolicy::is_last_stage("coding"));
        assert!(!StagePolicy::is_last_stage("voice"));
    }
}
