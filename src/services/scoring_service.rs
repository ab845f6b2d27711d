use crate::models::question::{AnswerMap, Question};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NOT_ANSWERED: &str = "Not answered";
pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStat {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrongQuestion {
    pub question: String,
    pub category: String,
    pub your_answer: String,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub total_correct: u32,
    pub total_questions: u32,
    pub category_breakdown: BTreeMap<String, CategoryStat>,
    pub wrong_questions: Vec<WrongQuestion>,
}

pub struct ScoringService;

impl ScoringService {
    /// Grades a submission against the authoritative question list. A question
    /// is correct iff it has an option flagged correct and the submitted text
    /// equals that option's text exactly; everything else (no answer, wrong
    /// text, no correct option defined) counts as incorrect.
    pub fn evaluate(questions: &[Question], answers: &AnswerMap) -> Evaluation {
        let mut breakdown: BTreeMap<String, CategoryStat> = BTreeMap::new();
        let mut wrong: Vec<WrongQuestion> = Vec::new();
        let mut total_correct: u32 = 0;

        for q in questions {
            let category = q
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string();

            let correct_option = q.correct_option();
            let user_answer = answers.get(&q.id).map(|s| s.as_str());
            let is_correct = match (correct_option, user_answer) {
                (Some(opt), Some(ans)) => opt.text == ans,
                _ => false,
            };

            let stat = breakdown.entry(category.clone()).or_default();
            stat.total += 1;
            if is_correct {
                stat.correct += 1;
                total_correct += 1;
            } else {
                wrong.push(WrongQuestion {
                    question: q.question.clone(),
                    category,
                    your_answer: user_answer.unwrap_or(NOT_ANSWERED).to_string(),
                    correct_answer: correct_option
                        .map(|o| o.text.clone())
                        .unwrap_or_else(|| "Not specified".to_string()),
                });
            }
        }

        for stat in breakdown.values_mut() {
            stat.percentage = Self::percentage(stat.correct, stat.total);
        }

        Evaluation {
            total_correct,
            total_questions: questions.len() as u32,
            category_breakdown: breakdown,
            wrong_questions: wrong,
        }
    }

    /// `round(correct / total * 100)`, with an empty set scoring 0 rather
    /// than NaN.
    pub fn percentage(correct: u32, total: u32) -> u32 {
        if total == 0 {
            return 0;
        }
        ((correct as f64 / total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionOption;

    fn question(id: i32, text: &str, category: Option<&str>, options: &[(&str, bool)]) -> Question {
        Question {
            id,
            question: text.to_string(),
            category: category.map(|c| c.to_string()),
            options: options
                .iter()
                .map(|(t, c)| QuestionOption {
                    text: t.to_string(),
                    is_correct: *c,
                })
                .collect(),
        }
    }

    #[test]
    fn matching_answer_text_is_correct() {
        let questions = vec![question(
            1,
            "2 + 2?",
            Some("Quantitative Aptitude"),
            &[("3", false), ("4", true)],
        )];
        let mut answers = AnswerMap::new();
        answers.insert(1, "4".to_string());

        let eval = ScoringService::evaluate(&questions, &answers);
        assert_eq!(eval.total_correct, 1);
        assert_eq!(eval.total_questions, 1);
        assert!(eval.wrong_questions.is_empty());
        assert_eq!(eval.category_breakdown["Quantitative Aptitude"].percentage, 100);
    }

    #[test]
    fn missing_answer_is_recorded_as_not_answered() {
        let questions = vec![question(1, "Pick one", None, &[("a", true), ("b", false)])];
        let eval = ScoringService::evaluate(&questions, &AnswerMap::new());

        assert_eq!(eval.total_correct, 0);
        assert_eq!(eval.wrong_questions.len(), 1);
        assert_eq!(eval.wrong_questions[0].your_answer, NOT_ANSWERED);
        assert_eq!(eval.wrong_questions[0].correct_answer, "a");
        assert_eq!(eval.wrong_questions[0].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn question_without_correct_option_is_always_wrong() {
        let questions = vec![question(1, "Broken", None, &[("a", false), ("b", false)])];
        let mut answers = AnswerMap::new();
        answers.insert(1, "a".to_string());

        let eval = ScoringService::evaluate(&questions, &answers);
        assert_eq!(eval.total_correct, 0);
        assert_eq!(eval.wrong_questions.len(), 1);
    }

    #[test]
    fn per_category_totals_sum_to_question_count() {
        let questions = vec![
            question(1, "q1", Some("A"), &[("x", true)]),
            question(2, "q2", Some("A"), &[("x", true)]),
            question(3, "q3", Some("B"), &[("x", true)]),
            question(4, "q4", None, &[("x", true)]),
        ];
        let mut answers = AnswerMap::new();
        answers.insert(1, "x".to_string());
        answers.insert(3, "y".to_string());

        let eval = ScoringService::evaluate(&questions, &answers);
        let summed: u32 = eval.category_breakdown.values().map(|s| s.total).sum();
        assert_eq!(summed, eval.total_questions);
        assert_eq!(eval.category_breakdown["A"].correct, 1);
        assert_eq!(eval.category_breakdown["A"].percentage, 50);
        assert_eq!(eval.category_breakdown["B"].percentage, 0);
    }

    #[test]
    fn empty_question_set_scores_zero_without_nan() {
        let eval = ScoringService::evaluate(&[], &AnswerMap::new());
        assert_eq!(eval.total_questions, 0);
        assert_eq!(ScoringService::percentage(eval.total_correct, eval.total_questions), 0);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(ScoringService::percentage(13, 20), 65);
        assert_eq!(ScoringService::percentage(1, 3), 33);
        assert_eq!(ScoringService::percentage(2, 3), 67);
        assert_eq!(ScoringService::percentage(1, 8), 13);
    }
}
