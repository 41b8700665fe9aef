//! Meal plan tools: read the week, change one meal.

use async_trait::async_trait;
use homehub_core::error::{StoreError, ToolError};
use homehub_core::sheet::{Sheet, SheetStore};
use homehub_core::tool::{Arguments, ParamSpec, Tool, ToolSpec};
use std::sync::Arc;
use tracing::debug;

use crate::args::required_str;

/// Meal slots that can be updated, matching the meal plan's column headers.
pub const MEAL_TYPES: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snack"];

const DAYS_SHOWN: usize = 7;

/// `get_meals`: the first week of the meal plan as JSON records.
pub struct GetMealsTool {
    spec: ToolSpec,
    store: Arc<dyn SheetStore>,
    tab: String,
}

impl GetMealsTool {
    pub fn new(store: Arc<dyn SheetStore>, tab: impl Into<String>) -> Self {
        Self {
            spec: ToolSpec::new("get_meals", "Get this week's meal plan from Google Sheets"),
            store,
            tab: tab.into(),
        }
    }
}

#[async_trait]
impl Tool for GetMealsTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, _arguments: &Arguments) -> Result<String, ToolError> {
        let sheet = self.store.read_all(&self.tab).await?;
        let week: Vec<_> = sheet.records().into_iter().take(DAYS_SHOWN).collect();
        serde_json::to_string(&week).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.spec.name.clone(),
            reason: e.to_string(),
        })
    }
}

/// `update_meal`: overwrite one meal slot on the first matching date.
pub struct UpdateMealTool {
    spec: ToolSpec,
    store: Arc<dyn SheetStore>,
    tab: String,
}

impl UpdateMealTool {
    pub fn new(store: Arc<dyn SheetStore>, tab: impl Into<String>) -> Self {
        let spec = ToolSpec::new("update_meal", "Update a specific meal in the meal plan")
            .param(ParamSpec::string("day_date").describe("Date in M/D/YYYY format"))
            .param(ParamSpec::string("meal_type").one_of(MEAL_TYPES))
            .param(ParamSpec::string("new_value"));
        Self {
            spec,
            store,
            tab: tab.into(),
        }
    }

    /// Index of the first data row whose Date cell contains `day_date`.
    fn find_day(sheet: &Sheet, day_date: &str) -> Option<usize> {
        (0..sheet.rows.len()).find(|&i| {
            sheet
                .cell(i, "Date")
                .is_some_and(|date| date.contains(day_date))
        })
    }
}

#[async_trait]
impl Tool for UpdateMealTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let day_date = required_str(arguments, "day_date")?;
        let meal_type = required_str(arguments, "meal_type")?;
        let new_value = required_str(arguments, "new_value")?;

        let meal_type = MEAL_TYPES
            .iter()
            .find(|m| m.eq_ignore_ascii_case(meal_type))
            .ok_or_else(|| {
                ToolError::InvalidArguments(format!(
                    "meal_type must be one of {}, got '{meal_type}'",
                    MEAL_TYPES.join(", ")
                ))
            })?;

        let sheet = self.store.read_all(&self.tab).await?;
        let Some(index) = Self::find_day(&sheet, day_date) else {
            return Ok(format!("Could not find date {day_date} in meal plan"));
        };

        let col = sheet.column(meal_type).ok_or_else(|| StoreError::ColumnNotFound {
            tab: self.tab.clone(),
            column: meal_type.to_string(),
        })?;
        let row = Sheet::sheet_row(index);
        debug!(row, col, meal_type, "Updating meal");

        self.store.write_cell(&self.tab, row, col, new_value).await?;
        Ok(format!("Updated {meal_type} on {day_date} to: {new_value}"))
    }
}
