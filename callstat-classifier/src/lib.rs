use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("invalid outcome pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// How one outcome literal is matched. All comparisons are case-sensitive.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatcherSpec {
    /// Outcome contains the literal anywhere.
    Contains(String),
    /// Outcome equals the literal exactly.
    Equals(String),
    Regex(String),
}

#[derive(Clone, Debug)]
enum OutcomeMatcher {
    Contains(String),
    Equals(String),
    Pattern(Regex),
}

impl OutcomeMatcher {
    fn compile(spec: &MatcherSpec) -> Result<Self, ClassifierError> {
        Ok(match spec {
            MatcherSpec::Contains(lit) => OutcomeMatcher::Contains(lit.clone()),
            MatcherSpec::Equals(lit) => OutcomeMatcher::Equals(lit.clone()),
            MatcherSpec::Regex(pattern) => {
                let re = Regex::new(pattern).map_err(|source| ClassifierError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                OutcomeMatcher::Pattern(re)
            }
        })
    }

    fn matches(&self, outcome: &str) -> bool {
        match self {
            OutcomeMatcher::Contains(lit) => outcome.contains(lit.as_str()),
            OutcomeMatcher::Equals(lit) => outcome == lit,
            OutcomeMatcher::Pattern(re) => re.is_match(outcome),
        }
    }
}

/// Dialer marks for "an answering machine picked up", manual and system-detected.
const ANSWERING_MACHINE_MARKS: [&str; 2] = [
    "Автоответчик",
    "Обнаружен автоответчик (системный)",
];
const SILENCE_MARK: &str = "Тишина";

pub fn default_answering_machine() -> Vec<MatcherSpec> {
    ANSWERING_MACHINE_MARKS
        .iter()
        .map(|mark| MatcherSpec::Contains(mark.to_string()))
        .collect()
}

pub fn default_silence() -> Vec<MatcherSpec> {
    vec![MatcherSpec::Equals(SILENCE_MARK.into())]
}

/// Outcome vocabulary, compiled once per engine.
#[derive(Clone, Debug)]
pub struct OutcomeClassifier {
    answering_machine: Vec<OutcomeMatcher>,
    silence: Vec<OutcomeMatcher>,
}

impl OutcomeClassifier {
    pub fn new(
        answering_machine: &[MatcherSpec],
        silence: &[MatcherSpec],
    ) -> Result<Self, ClassifierError> {
        Ok(Self {
            answering_machine: compile_all(answering_machine)?,
            silence: compile_all(silence)?,
        })
    }

    /// A missing outcome never matches.
    pub fn is_answering_machine(&self, outcome: Option<&str>) -> bool {
        any_match(&self.answering_machine, outcome)
    }

    pub fn is_silence(&self, outcome: Option<&str>) -> bool {
        any_match(&self.silence, outcome)
    }
}

impl Default for OutcomeClassifier {
    fn default() -> Self {
        Self {
            answering_machine: ANSWERING_MACHINE_MARKS
                .iter()
                .map(|mark| OutcomeMatcher::Contains(mark.to_string()))
                .collect(),
            silence: vec![OutcomeMatcher::Equals(SILENCE_MARK.into())],
        }
    }
}

fn compile_all(specs: &[MatcherSpec]) -> Result<Vec<OutcomeMatcher>, ClassifierError> {
    specs.iter().map(OutcomeMatcher::compile).collect()
}

fn any_match(matchers: &[OutcomeMatcher], outcome: Option<&str>) -> bool {
    match outcome {
        Some(text) => matchers.iter().any(|m| m.matches(text)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary() {
        let c = OutcomeClassifier::default();
        assert!(c.is_answering_machine(Some("Автоответчик")));
        assert!(c.is_answering_machine(Some("Обнаружен автоответчик (системный)")));
        assert!(c.is_answering_machine(Some("Клиент: Автоответчик, перезвонить")));
        assert!(!c.is_answering_machine(Some("автоответчик")));
        assert!(!c.is_answering_machine(None));

        assert!(c.is_silence(Some("Тишина")));
        assert!(!c.is_silence(Some("Тишина ")));
        assert!(!c.is_silence(None));
    }

    #[test]
    fn default_matches_compiled_default_specs() {
        let compiled = OutcomeClassifier::new(&default_answering_machine(), &default_silence())
            .unwrap();
        assert_eq!(
            format!("{:?}", OutcomeClassifier::default()),
            format!("{compiled:?}")
        );
        assert_eq!(OutcomeClassifier::default().answering_machine.len(), 2);
        assert_eq!(OutcomeClassifier::default().silence.len(), 1);
    }

    #[test]
    fn regex_matchers_compile_and_match() {
        let c = OutcomeClassifier::new(
            &[MatcherSpec::Regex(r"^Voicemail( \(system\))?$".into())],
            &[MatcherSpec::Equals("Silence".into())],
        )
        .unwrap();
        assert!(c.is_answering_machine(Some("Voicemail (system)")));
        assert!(!c.is_answering_machine(Some("Voicemail later")));
        assert!(c.is_silence(Some("Silence")));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let err = OutcomeClassifier::new(&[MatcherSpec::Regex("(".into())], &[]).unwrap_err();
        assert!(err.to_string().contains("invalid outcome pattern '('"));
    }

    #[test]
    fn specs_deserialize_from_yaml() {
        let yaml = "- contains: Автоответчик\n- equals: Тишина\n- regex: '^AM'\n";
        let specs: Vec<MatcherSpec> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            specs,
            vec![
                MatcherSpec::Contains("Автоответчик".into()),
                MatcherSpec::Equals("Тишина".into()),
                MatcherSpec::Regex("^AM".into()),
            ]
        );
    }
}
