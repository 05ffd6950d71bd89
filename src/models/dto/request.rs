use std::collections::HashMap;

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityQuery {
    pub access_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(length(max = 100))]
    pub access_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    /// question id -> selected option index.
    pub answers: HashMap<String, i16>,

    #[validate(range(min = 0))]
    pub time_spent_seconds: i64,

    #[validate(length(max = 100))]
    pub access_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_deserializes_answer_map() {
        let json = r#"{
            "answers": { "q1": 0, "q2": 3 },
            "time_spent_seconds": 1800
        }"#;

        let request: SubmitQuizRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.answers.get("q1"), Some(&0));
        assert_eq!(request.answers.get("q2"), Some(&3));
        assert_eq!(request.time_spent_seconds, 1800);
        assert!(request.access_code.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_time_spent_fails_validation() {
        let request = SubmitQuizRequest {
            answers: HashMap::new(),
            time_spent_seconds: -1,
            access_code: None,
        };
        assert!(request.validate().is_err());
    }
}
