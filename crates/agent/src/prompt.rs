//! System prompt rendering.

use chrono::NaiveDate;
use homehub_config::PersonaConfig;

/// Who the assistant is and whom it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub assistant_name: String,
    pub household: String,
    pub members: Vec<String>,
}

impl Default for Persona {
    fn default() -> Self {
        Self::from_config(&PersonaConfig::default())
    }
}

impl Persona {
    pub fn from_config(config: &PersonaConfig) -> Self {
        Self {
            assistant_name: config.assistant_name.clone(),
            household: config.household.clone(),
            members: config.members.clone(),
        }
    }

    /// The system prompt for an exchange happening on `today`.
    pub fn system_prompt(&self, today: NaiveDate) -> String {
        format!(
            "You are {name}, an AI butler for {household}. Today is {today}. \
             You help {members} manage their home: meals, chores, reminders, and more. \
             When asked to make a change (update a meal, mark a chore done, add a reminder), \
             USE THE TOOLS to actually do it. \
             Keep responses brief and direct. No fluff.",
            name = self.assistant_name,
            household = self.household,
            today = today.format("%A, %B %d, %Y"),
            members = self.member_list(),
        )
    }

    fn member_list(&self) -> String {
        match self.members.as_slice() {
            [] => "the family".to_string(),
            [one] => one.clone(),
            [first, second] => format!("{first} and {second}"),
            [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
        }
    }
}
