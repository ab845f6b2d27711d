use crate::models::stage_result::StageResult;

const TCS_DIGITAL_MIN_CODING_PCT: u32 = 83;
const WIPRO_TURBO_MIN_AVG_PCT: u32 = 80;

pub struct TrackService;

impl TrackService {
    /// Final placement track once every stage has passed. TCS tracks hinge on
    /// the coding-stage percentage, Wipro on the mean percentage across all
    /// submitted stages. Track assignment never rejects: the floor tracks
    /// ("Ninja"/"Elite") double as the default.
    pub fn assign_track(company: &str, results: &[StageResult]) -> &'static str {
        match company.to_ascii_lowercase().as_str() {
            "tcs" => {
                let coding_pct = results
                    .iter()
                    .find(|r| r.stage_name == "coding")
                    .map(|r| r.percentage.max(0) as u32)
                    .unwrap_or(0);
                if coding_pct >= TCS_DIGITAL_MIN_CODING_PCT {
                    "Digital"
                } else {
                    "Ninja"
                }
            }
            "wipro" => {
                if results.is_empty() {
                    return "Elite";
                }
                let sum: u32 = results.iter().map(|r| r.percentage.max(0) as u32).sum();
                let avg = sum / results.len() as u32;
                if avg >= WIPRO_TURBO_MIN_AVG_PCT {
                    "Turbo"
                } else {
                    "Elite"
                }
            }
            _ => "Standard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(stage: &str, percentage: i32) -> StageResult {
        StageResult {
            id: uuid::Uuid::nil(),
            application_id: uuid::Uuid::nil(),
            stage_name: stage.to_string(),
            score: 0,
            total: 0,
            percentage,
            passed: true,
            time_spent_seconds: None,
            feedback: None,
            recording_link: None,
            recording_file_path: None,
            submitted_at: None,
            created_at: None,
        }
    }

    #[test]
    fn tcs_high_coding_percentage_earns_digital() {
        let results = vec![
            result("foundation", 70),
            result("advanced", 72),
            result("coding", 85),
        ];
        assert_eq!(TrackService::assign_track("TCS", &results), "Digital");
    }

    #[test]
    fn tcs_lower_coding_percentage_defaults_to_ninja() {
        let results = vec![result("coding", 70)];
        assert_eq!(TrackService::assign_track("TCS", &results), "Ninja");
        assert_eq!(TrackService::assign_track("TCS", &[]), "Ninja");
    }

    #[test]
    fn wipro_average_of_eighty_earns_turbo() {
        let results = vec![
            result("aptitude", 85),
            result("essay", 80),
            result("coding", 75),
            result("voice", 80),
        ];
        assert_eq!(TrackService::assign_track("Wipro", &results), "Turbo");
    }

    #[test]
    fn wipro_lower_average_defaults_to_elite() {
        let results = vec![result("aptitude", 70), result("essay", 72)];
        assert_eq!(TrackService::assign_track("wipro", &results), "Elite");
    }

    #[test]
    fn unknown_company_gets_standard() {
        assert_eq!(TrackService::assign_track("Acme", &[]), "Standard");
    }
}
