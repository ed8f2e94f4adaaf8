use serde::{Deserialize, Serialize};

/// The user the assistant personalizes itself for.
///
/// Loaded once from configuration at startup. The greeting, several canned
/// resolver rules, and the farewell all interpolate these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub location: String,
    pub interests: Vec<String>,
    pub status_level: String,
}

impl UserProfile {
    /// The interest quoted by the risk-assessment rule.
    ///
    /// The third configured interest by convention; falls back to the last
    /// one, or a generic phrase when none are configured.
    pub fn security_interest(&self) -> &str {
        self.interests
            .get(2)
            .or_else(|| self.interests.last())
            .map(String::as_str)
            .unwrap_or("security best practices")
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Operator".to_string(),
            location: "London".to_string(),
            interests: vec![
                "coding".to_string(),
                "space exploration".to_string(),
                "cybersecurity".to_string(),
            ],
            status_level: "Optimal".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_interest_prefers_the_third_entry() {
        let profile = UserProfile::default();
        assert_eq!(profile.security_interest(), "cybersecurity");
    }

    #[test]
    fn security_interest_falls_back_to_the_last_entry() {
        let profile = UserProfile {
            interests: vec!["chess".to_string()],
            ..UserProfile::default()
        };
        assert_eq!(profile.security_interest(), "chess");
    }

    #[test]
    fn security_interest_handles_an_empty_list() {
        let profile = UserProfile {
            interests: vec![],
            ..UserProfile::default()
        };
        assert_eq!(profile.security_interest(), "security best practices");
    }
}
