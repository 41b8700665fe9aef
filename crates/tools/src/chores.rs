//! Chore tools: list chores, tick one off.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use homehub_core::error::{StoreError, ToolError};
use homehub_core::sheet::{Sheet, SheetStore};
use homehub_core::tool::{Arguments, ParamSpec, Tool, ToolSpec};
use std::sync::Arc;
use tracing::debug;

use crate::args::required_str;

/// Source of "today" for date arithmetic.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// The local calendar date.
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Local::now().date_naive())
}

/// Days until a chore is due again, from its free-text frequency.
///
/// Bi-weekly is checked before weekly so "biweekly" is not read as seven days.
pub fn frequency_days(frequency: &str) -> u64 {
    let f = frequency.trim().to_lowercase();
    if f.contains("every other day") {
        2
    } else if f.contains("daily") {
        1
    } else if f.contains("bi-week") || f.contains("biweek") {
        14
    } else if f.contains("week") {
        7
    } else if f.contains("month") {
        30
    } else {
        7
    }
}

/// `get_chores`: every chore row as JSON records.
pub struct GetChoresTool {
    spec: ToolSpec,
    store: Arc<dyn SheetStore>,
    tab: String,
}

impl GetChoresTool {
    pub fn new(store: Arc<dyn SheetStore>, tab: impl Into<String>) -> Self {
        Self {
            spec: ToolSpec::new("get_chores", "Get all household chores and their status"),
            store,
            tab: tab.into(),
        }
    }
}

#[async_trait]
impl Tool for GetChoresTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, _arguments: &Arguments) -> Result<String, ToolError> {
        let sheet = self.store.read_all(&self.tab).await?;
        serde_json::to_string(&sheet.records()).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.spec.name.clone(),
            reason: e.to_string(),
        })
    }
}

/// `mark_chore_done`: stamp Last Done with today and schedule Next Due.
pub struct MarkChoreDoneTool {
    spec: ToolSpec,
    store: Arc<dyn SheetStore>,
    tab: String,
    clock: Clock,
}

impl MarkChoreDoneTool {
    pub fn new(store: Arc<dyn SheetStore>, tab: impl Into<String>) -> Self {
        let spec = ToolSpec::new("mark_chore_done", "Mark a chore as completed today")
            .param(ParamSpec::string("task_name"));
        Self {
            spec,
            store,
            tab: tab.into(),
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn column(&self, sheet: &Sheet, header: &str) -> Result<usize, StoreError> {
        sheet.column(header).ok_or_else(|| StoreError::ColumnNotFound {
            tab: self.tab.clone(),
            column: header.to_string(),
        })
    }
}

#[async_trait]
impl Tool for MarkChoreDoneTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let task_name = required_str(arguments, "task_name")?;
        let needle = task_name.to_lowercase();

        let sheet = self.store.read_all(&self.tab).await?;
        let found = (0..sheet.rows.len()).find(|&i| {
            sheet
                .cell(i, "Task")
                .is_some_and(|task| task.to_lowercase().contains(&needle))
        });
        let Some(index) = found else {
            return Ok(format!("Could not find chore: {task_name}"));
        };

        let task = sheet.cell(index, "Task").unwrap_or(task_name).to_string();
        let frequency = sheet.cell(index, "Frequency").unwrap_or("");
        let days = frequency_days(frequency);

        let today = (self.clock)();
        let next_due = today
            .checked_add_days(Days::new(days))
            .ok_or_else(|| ToolError::ExecutionFailed {
                tool_name: self.spec.name.clone(),
                reason: format!("next due date overflows from {today}"),
            })?;

        let last_done_col = self.column(&sheet, "Last Done")?;
        let next_due_col = self.column(&sheet, "Next Due")?;
        let row = Sheet::sheet_row(index);
        debug!(row, task = %task, days, "Marking chore done");

        self.store
            .write_cell(&self.tab, row, last_done_col, &today.format("%Y-%m-%d").to_string())
            .await?;
        self.store
            .write_cell(&self.tab, row, next_due_col, &next_due.format("%Y-%m-%d").to_string())
            .await?;

        Ok(format!(
            "Marked '{task}' done. Next due: {}",
            next_due.format("%b %d")
        ))
    }
}
