use std::fmt;

use inquire::{Confirm, Select};

use crate::error::CommandError;
use crate::resolve::Candidate;

/// Interactive prompts, gated on the `prompt` setting.
///
/// With prompting disabled, disambiguation fails listing every candidate id
/// and confirmations default to "no".
pub struct Prompter {
    enabled: bool,
}

struct CandidateOption(Candidate);

impl fmt::Display for CandidateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.display_name {
            Some(name) => write!(f, "{} ({})", name, self.0.id),
            None => write!(f, "{}", self.0.id),
        }
    }
}

impl Prompter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Let the user pick one of several matching resources. Invoked at most
    /// once per resolution.
    pub fn pick_one(
        &self,
        message: &str,
        candidates: Vec<Candidate>,
    ) -> Result<Candidate, CommandError> {
        if !self.enabled {
            return Err(CommandError::MultipleResults {
                message: message.to_string(),
                ids: candidates.into_iter().map(|c| c.id).collect(),
            });
        }

        let options: Vec<CandidateOption> =
            candidates.into_iter().map(CandidateOption).collect();
        let chosen = Select::new(message, options).prompt()?;
        Ok(chosen.0)
    }

    /// Ask before a destructive action; declined or unavailable means "no"
    pub fn confirm(&self, message: &str) -> bool {
        if !self.enabled {
            return false;
        }

        Confirm::new(message)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate {
                id: "A".to_string(),
                display_name: Some("myapp".to_string()),
            },
            Candidate {
                id: "B".to_string(),
                display_name: None,
            },
        ]
    }

    #[test]
    fn test_disabled_prompter_fails_listing_all_ids() {
        let prompter = Prompter::new(false);
        let error = prompter
            .pick_one("Multiple apps with name 'myapp' found.", candidates())
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Multiple apps with name 'myapp' found. Found: A, B."
        );
    }

    #[test]
    fn test_disabled_prompter_declines_confirmation() {
        let prompter = Prompter::new(false);
        assert!(!prompter.confirm("Are you sure?"));
    }

    #[test]
    fn test_candidate_rendering_includes_id() {
        let [first, second]: [Candidate; 2] = candidates().try_into().unwrap();
        assert_eq!(CandidateOption(first).to_string(), "myapp (A)");
        assert_eq!(CandidateOption(second).to_string(), "B");
    }
}
