use crate::error::Result;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

#[derive(Clone)]
pub struct EssayService {
    client: Client,
    api_key: String,
}

impl EssayService {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }

    /// Grades an essay as a percentage with short remarks. The AI judge is
    /// preferred; any failure degrades to the deterministic heuristic, so the
    /// caller always gets a grade.
    pub async fn grade(&self, topic: &str, essay: &str) -> (u32, String) {
        match self.judge(topic, essay).await {
            Ok(graded) => graded,
            Err(e) => {
                tracing::warn!(error = ?e, "Essay judge failed, using heuristic grade");
                heuristic_grade(topic, essay)
            }
        }
    }

    async fn judge(&self, topic: &str, essay: &str) -> Result<(u32, String)> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("AI collaborator is not configured").into());
        }

        let request = serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {
                    "role": "system",
                    "content": "You are a strict essay examiner for a placement test. \
                        Judge relevance to the topic, structure, clarity and grammar. \
                        Return a JSON object with 'score' (0-100 integer) and 'remarks' \
                        (two sentences)."
                },
                {
                    "role": "user",
                    "content": serde_json::to_string(&serde_json::json!({
                        "topic": topic,
                        "essay": essay,
                    }))?
                }
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.2
        });

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
        let content = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid AI response format"))?;

        let parsed: JsonValue = serde_json::from_str(content)?;
        let score = parsed
            .get("score")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow::anyhow!("Essay judge response missing score"))?
            .min(100) as u32;
        let remarks = parsed
            .get("remarks")
            .and_then(|v| v.as_str())
            .unwrap_or("No remarks.")
            .to_string();
        Ok((score, remarks))
    }
}

/// Deterministic grade used when the AI judge is unavailable: length carries
/// most of the weight, with bonuses for paragraph structure and staying on
/// topic.
fn heuristic_grade(topic: &str, essay: &str) -> (u32, String) {
    let words = essay.split_whitespace().count();
    if words == 0 {
        return (0, "Empty essay.".to_string());
    }

    let length_component = (words.min(300) * 60 / 300) as u32;

    let paragraphs = essay
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .count();
    let structure_bonus: u32 = if paragraphs >= 3 { 20 } else { (paragraphs as u32) * 6 };

    let essay_lower = essay.to_lowercase();
    let on_topic = topic
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .any(|w| essay_lower.contains(w));
    let topic_bonus: u32 = if on_topic { 20 } else { 0 };

    let score = (length_component + structure_bonus + topic_bonus).min(100);
    let remarks = format!(
        "Heuristic grade: {} words, {} paragraph(s), {} the topic.",
        words,
        paragraphs,
        if on_topic { "addresses" } else { "does not clearly address" }
    );
    (score, remarks)
}
