use crate::dto::feedback_dto::AiSummaryPayload;
use crate::error::Result;
use crate::services::categorizer;
use crate::services::scoring_service::ScoringService;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::time::Duration;

// Percentage bands shared by the AI prompt and the deterministic fallback so
// both paths state the same thresholds.
const BAND_EXCELLENT: u32 = 80;
const BAND_GOOD: u32 = 70;
const BAND_AVERAGE: u32 = 60;
const BAND_WEAK: u32 = 40;

const SECTION_BREAKDOWN: &str = "Category Breakdown";
const SECTION_FOCUS: &str = "Most Focus Needed";
const SECTION_STUDY: &str = "Recommended Study Time";

#[derive(Clone)]
pub struct FeedbackService {
    client: Client,
    api_key: String,
    max_wrong_questions: usize,
}

impl FeedbackService {
    pub fn new(api_key: String, client: Client, max_wrong_questions: usize) -> Self {
        Self {
            client,
            api_key,
            max_wrong_questions,
        }
    }

    /// Plain-text coaching report. Any AI-layer failure degrades to the
    /// deterministic fallback; this never returns an error to the caller.
    pub async fn coaching_report(&self, payload: &AiSummaryPayload) -> String {
        match self.request_report(payload).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("AI coaching report was empty, using deterministic fallback");
                self.fallback_report(payload)
            }
            Err(e) => {
                tracing::warn!(error = ?e, "AI coaching report failed, using deterministic fallback");
                self.fallback_report(payload)
            }
        }
    }

    /// One-paragraph summary extracted from a strict JSON response. Falls back
    /// to the deterministic report on any error or parse failure.
    pub async fn summary_json(&self, payload: &AiSummaryPayload) -> String {
        match self.request_summary(payload).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = ?e, "AI summary failed, using deterministic fallback");
                self.fallback_report(payload)
            }
        }
    }

    async fn request_report(&self, payload: &AiSummaryPayload) -> Result<String> {
        let system_prompt = format!(
            "You are a placement-preparation coach. Write an encouraging but honest \
             coaching report in plain text with exactly these sections: '{}', '{}', \
             and '{}'. Treat {}% and above as excellent, {}-{}% as good, {}-{}% as \
             average and below {}% as weak.",
            SECTION_BREAKDOWN,
            SECTION_FOCUS,
            SECTION_STUDY,
            BAND_EXCELLENT,
            BAND_GOOD,
            BAND_EXCELLENT - 1,
            BAND_AVERAGE,
            BAND_GOOD - 1,
            BAND_WEAK,
        );

        let request = serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": serde_json::to_string(&self.prompt_stats(payload))?}
            ],
            "temperature": 0.4
        });

        self.chat(request).await
    }

    async fn request_summary(&self, payload: &AiSummaryPayload) -> Result<String> {
        let system_prompt = "You are a placement-preparation coach. Return a JSON object \
            with a single field 'summary': a short coaching paragraph covering the \
            weakest categories and what to practice next.";

        let request = serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": serde_json::to_string(&self.prompt_stats(payload))?}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.4
        });

        let content = self.chat(request).await?;
        let object = extract_json_object(&content)
            .ok_or_else(|| anyhow::anyhow!("No JSON object in AI response"))?;
        let parsed: JsonValue = serde_json::from_str(object)?;
        parsed
            .get("summary")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("AI response missing 'summary' field").into())
    }

    fn prompt_stats(&self, payload: &AiSummaryPayload) -> JsonValue {
        let wrong: Vec<JsonValue> = payload
            .wrong_questions
            .iter()
            .take(self.max_wrong_questions)
            .map(|w| {
                serde_json::json!({
                    "question": w.question,
                    "category": w.category,
                    "your_answer": w.your_answer,
                    "correct_answer": w.correct_answer,
                })
            })
            .collect();

        serde_json::json!({
            "test_title": payload.test_title,
            "score_percentage": payload.score,
            "total_questions": payload.total_questions,
            "correct": payload.correct,
            "wrong": payload.wrong,
            "category_breakdown": payload.category_breakdown,
            "wrong_questions": wrong,
        })
    }

    async fn chat(&self, request: JsonValue) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("AI collaborator is not configured").into());
        }

        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("AI API error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid AI response format").into())
    }

    /// Deterministic coaching report. Category totals are not available here,
    /// so each category's total is estimated as
    /// ceil(total_questions / distinct categories seen among wrong answers);
    /// a known-lossy estimate, kept for output stability.
    pub fn fallback_report(&self, payload: &AiSummaryPayload) -> String {
        let mut report = String::new();
        report.push_str(&format!("Performance Report: {}\n\n", payload.test_title));
        report.push_str(&format!(
            "Overall Score: {}% ({} correct, {} wrong out of {} questions)\n\n",
            payload.score, payload.correct, payload.wrong, payload.total_questions
        ));

        let mut wrong_by_category: BTreeMap<&'static str, u32> = BTreeMap::new();
        for w in &payload.wrong_questions {
            *wrong_by_category
                .entry(categorizer::categorize(Some(&w.question)))
                .or_insert(0) += 1;
        }

        if !wrong_by_category.is_empty() {
            let distinct = wrong_by_category.len() as u32;
            let estimated_total = payload.total_questions.div_ceil(distinct).max(1);

            let mut ranked: Vec<(&'static str, u32, u32)> = wrong_by_category
                .iter()
                .map(|(label, wrong_count)| {
                    let correct_est = estimated_total.saturating_sub(*wrong_count);
                    let pct = ScoringService::percentage(correct_est, estimated_total);
                    (*label, correct_est, pct)
                })
                .collect();
            ranked.sort_by_key(|(_, _, pct)| *pct);

            report.push_str(&format!("{}:\n", SECTION_BREAKDOWN));
            for (label, correct_est, pct) in &ranked {
                report.push_str(&format!(
                    "- {}: {}/{} ({}%) - {}\n",
                    label,
                    correct_est,
                    estimated_total,
                    pct,
                    category_status(*pct)
                ));
            }
            report.push('\n');

            report.push_str(&format!("{}:\n", SECTION_FOCUS));
            for (rank, (label, _, pct)) in ranked.iter().enumerate() {
                report.push_str(&format!(
                    "{}. {} ({}% accuracy)\n",
                    rank + 1,
                    label,
                    pct
                ));
            }
            report.push('\n');
        }

        report.push_str(overall_summary(payload.score));
        report.push_str("\n\n");
        report.push_str(&format!(
            "{}: {}\n",
            SECTION_STUDY,
            study_time(payload.score)
        ));
        report
    }
}

fn category_status(pct: u32) -> &'static str {
    if pct >= BAND_EXCELLENT {
        "Excellent"
    } else if pct >= BAND_GOOD {
        "Good"
    } else if pct >= BAND_AVERAGE {
        "Average"
    } else if pct >= BAND_WEAK {
        "Needs Improvement"
    } else {
        "Weak"
    }
}

fn overall_summary(score: u32) -> &'static str {
    if score >= BAND_EXCELLENT {
        "Excellent work. Your fundamentals are strong; keep taking timed mocks to stay sharp."
    } else if score >= BAND_AVERAGE {
        "Good effort. You have a solid base, but the categories above still need regular practice."
    } else if score >= BAND_WEAK {
        "You are getting there. Work through your weakest categories before attempting the next mock."
    } else {
        "This attempt needs significant revision. Rebuild the basics topic by topic before retrying."
    }
}

fn study_time(score: u32) -> &'static str {
    if score >= BAND_EXCELLENT {
        "1 hour of daily practice"
    } else if score >= BAND_AVERAGE {
        "1-2 hours daily, starting with your weakest category"
    } else if score >= BAND_WEAK {
        "2-3 hours daily for the next two weeks"
    } else {
        "3-4 hours daily, starting from the fundamentals"
    }
}

/// Best-effort extraction of the outermost `{...}` from a response that may
/// wrap JSON in prose or code fences.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring_service::WrongQuestion;

    fn payload() -> AiSummaryPayload {
        AiSummaryPayload {
            test_title: "TCS Foundation Mock".to_string(),
            score: 65,
            total_questions: 20,
            correct: 13,
            wrong: 7,
            category_breakdown: BTreeMap::new(),
            wrong_questions: vec![
                WrongQuestion {
                    question: "Find the profit percentage if cost is 200 and sell is 250"
                        .to_string(),
                    category: "Quantitative Aptitude".to_string(),
                    your_answer: "20%".to_string(),
                    correct_answer: "25%".to_string(),
                },
                WrongQuestion {
                    question: "What is the output of the following program with a loop over an array?"
                        .to_string(),
                    category: "Programming/Coding".to_string(),
                    your_answer: "Not answered".to_string(),
                    correct_answer: "42".to_string(),
                },
            ],
        }
    }

    fn service() -> FeedbackService {
        FeedbackService::new(String::new(), Client::new(), 10)
    }

    #[test]
    fn fallback_report_is_deterministic() {
        let svc = service();
        let p = payload();
        assert_eq!(svc.fallback_report(&p), svc.fallback_report(&p));
    }

    #[test]
    fn fallback_report_contains_all_sections() {
        let report = service().fallback_report(&payload());
        assert!(report.contains(SECTION_BREAKDOWN));
        assert!(report.contains(SECTION_FOCUS));
        assert!(report.contains(SECTION_STUDY));
        assert!(report.contains("Overall Score: 65%"));
        assert!(report.contains("Quantitative Aptitude"));
        assert!(report.contains("Programming/Coding"));
    }

    #[test]
    fn fallback_estimates_category_totals_from_distinct_categories() {
        // 20 questions over 2 distinct wrong categories: ceil(20/2) = 10 per
        // category, one wrong each, so 9/10 = 90% accuracy.
        let report = service().fallback_report(&payload());
        assert!(report.contains("9/10 (90%)"));
    }

    #[test]
    fn fallback_without_wrong_questions_skips_category_sections() {
        let mut p = payload();
        p.wrong_questions.clear();
        p.score = 100;
        p.correct = 20;
        p.wrong = 0;
        let report = service().fallback_report(&p);
        assert!(!report.contains(SECTION_BREAKDOWN));
        assert!(report.contains(SECTION_STUDY));
        assert!(report.contains("Excellent work."));
    }

    #[test]
    fn json_extraction_tolerates_fences_and_prose() {
        let wrapped = "Here you go:\n```json\n{\"summary\": \"practice more\"}\n```";
        assert_eq!(
            extract_json_object(wrapped),
            Some("{\"summary\": \"practice more\"}")
        );
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn unconfigured_collaborator_degrades_to_fallback() {
        let svc = service();
        let p = payload();
        let summary = tokio_test::block_on(svc.summary_json(&p));
        assert_eq!(summary, svc.fallback_report(&p));
        let report = tokio_test::block_on(svc.coaching_report(&p));
        assert_eq!(report, svc.fallback_report(&p));
    }

    #[test]
    fn status_labels_follow_the_band_breakpoints() {
        assert_eq!(category_status(80), "Excellent");
        assert_eq!(category_status(79), "Good");
        assert_eq!(category_status(69), "Average");
        assert_eq!(category_status(59), "Needs Improvement");
        assert_eq!(category_status(39), "Weak");
    }
}
