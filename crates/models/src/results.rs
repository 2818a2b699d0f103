use crate::{answer::AnswerValue, question::QuestionType};
use serde::Serialize;
use uuid::Uuid;

/// How many respondents picked one option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionTally {
    pub option: String,
    pub count: usize,
}

/// Aggregated answers to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSummary {
    pub question_id: Uuid,
    pub prompt: String,
    pub question_type: QuestionType,
    /// Respondents who answered this question
    pub answered: usize,
    /// Per-option counts for scale and checkbox questions
    pub tallies: Vec<OptionTally>,
    /// Collected responses for text questions
    pub responses: Vec<String>,
}

impl QuestionSummary {
    /// Folds stored answers into a summary; answers of the wrong shape are skipped
    pub fn build<'a>(
        question_id: Uuid,
        prompt: String,
        question_type: QuestionType,
        options: &[String],
        answers: impl IntoIterator<Item = &'a AnswerValue>,
    ) -> Self {
        let mut counts = vec![0usize; options.len()];
        let mut responses = Vec::new();
        let mut answered = 0;

        for answer in answers {
            match (&question_type, answer) {
                (QuestionType::Text, AnswerValue::Text(text)) => {
                    answered += 1;
                    if !text.trim().is_empty() {
                        responses.push(text.clone());
                    }
                }
                (QuestionType::Scale, AnswerValue::Scale(_))
                | (QuestionType::Checkbox, AnswerValue::Checkbox(_)) => {
                    answered += 1;
                    for &index in answer.selections() {
                        if let Some(count) = counts.get_mut(index) {
                            *count += 1;
                        }
                    }
                }
                _ => {}
            }
        }

        let tallies = if question_type.uses_options() {
            options
                .iter()
                .zip(counts)
                .map(|(option, count)| OptionTally {
                    option: option.clone(),
                    count,
                })
                .collect()
        } else {
            vec![]
        };

        Self {
            question_id,
            prompt,
            question_type,
            answered,
            tallies,
            responses,
        }
    }
}

/// Aggregated results of one evaluation instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationSummary {
    pub evaluation_id: Uuid,
    pub template_title: String,
    pub respondents: usize,
    pub questions: Vec<QuestionSummary>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn options() -> Vec<String> {
        vec!["5".into(), "4".into(), "3".into()]
    }

    #[test]
    fn test_scale_tally() {
        let answers = [
            AnswerValue::Scale(0),
            AnswerValue::Scale(0),
            AnswerValue::Scale(2),
        ];

        let summary = QuestionSummary::build(
            Uuid::nil(),
            "Rate the course".into(),
            QuestionType::Scale,
            &options(),
            &answers,
        );

        assert_eq!(summary.answered, 3);
        let counts: Vec<usize> = summary.tallies.iter().map(|t| t.count).collect();
        assert_eq!(counts, vec![2, 0, 1]);
        assert!(summary.responses.is_empty());
    }

    #[test]
    fn test_checkbox_tally_counts_each_selection() {
        let answers = [
            AnswerValue::Checkbox(vec![0, 2]),
            AnswerValue::Checkbox(vec![]),
            AnswerValue::Checkbox(vec![2]),
        ];

        let summary = QuestionSummary::build(
            Uuid::nil(),
            "What helped?".into(),
            QuestionType::Checkbox,
            &options(),
            &answers,
        );

        assert_eq!(summary.answered, 3);
        let counts: Vec<usize> = summary.tallies.iter().map(|t| t.count).collect();
        assert_eq!(counts, vec![1, 0, 2]);
    }

    #[test]
    fn test_text_responses_skip_blank() {
        let answers = [
            AnswerValue::Text("More labs".into()),
            AnswerValue::Text("  ".into()),
            AnswerValue::Scale(1),
        ];

        let summary = QuestionSummary::build(
            Uuid::nil(),
            "Comments".into(),
            QuestionType::Text,
            &[],
            &answers,
        );

        assert_eq!(summary.answered, 2);
        assert_eq!(summary.responses, vec!["More labs".to_string()]);
        assert!(summary.tallies.is_empty());
    }
}
