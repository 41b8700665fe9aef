//! Reminder tool.

use async_trait::async_trait;
use homehub_core::error::ToolError;
use homehub_core::sheet::SheetStore;
use homehub_core::tool::{Arguments, ParamSpec, Tool, ToolSpec};
use std::sync::Arc;

use crate::args::{optional_str, required_str};

const PENDING: &str = "Pending";

/// `add_reminder`: append `[title, due_date, notes, "Pending"]`.
pub struct AddReminderTool {
    spec: ToolSpec,
    store: Arc<dyn SheetStore>,
    tab: String,
}

impl AddReminderTool {
    pub fn new(store: Arc<dyn SheetStore>, tab: impl Into<String>) -> Self {
        let spec = ToolSpec::new("add_reminder", "Add a reminder")
            .param(ParamSpec::string("title"))
            .param(ParamSpec::string("due_date"))
            .param(ParamSpec::string("notes").optional());
        Self {
            spec,
            store,
            tab: tab.into(),
        }
    }
}

#[async_trait]
impl Tool for AddReminderTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let title = required_str(arguments, "title")?;
        let due_date = required_str(arguments, "due_date")?;
        let notes = optional_str(arguments, "notes")?;

        self.store
            .append_row(
                &self.tab,
                vec![
                    title.to_string(),
                    due_date.to_string(),
                    notes.to_string(),
                    PENDING.to_string(),
                ],
            )
            .await?;

        Ok(format!("Added reminder: {title} due {due_date}"))
    }
}
