//! In-memory sheet store for tests and running without a spreadsheet.

use async_trait::async_trait;
use homehub_core::error::StoreError;
use homehub_core::sheet::{Sheet, SheetStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A [`SheetStore`] backed by a map of tab name to [`Sheet`].
///
/// Row 1 addresses the header row, row 2 the first data row.
#[derive(Debug, Default)]
pub struct InMemorySheetStore {
    tabs: RwLock<HashMap<String, Sheet>>,
}

impl InMemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a tab.
    pub fn with_tab<H, R>(mut self, name: &str, headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator,
        <R::Item as IntoIterator>::Item: Into<String>,
    {
        let sheet = Sheet::new(
            headers.into_iter().map(Into::into).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        );
        self.tabs.get_mut().insert(name.to_string(), sheet);
        self
    }

    /// The three household tabs with their header rows and no data.
    pub fn household_template(meals: &str, chores: &str, reminders: &str) -> Self {
        let empty: Vec<Vec<String>> = Vec::new();
        Self::new()
            .with_tab(
                meals,
                ["Date", "Day", "Breakfast", "Lunch", "Dinner", "Snack"],
                empty.clone(),
            )
            .with_tab(
                chores,
                ["Task", "Frequency", "Last Done", "Next Due", "Assigned"],
                empty.clone(),
            )
            .with_tab(reminders, ["Title", "Due Date", "Notes", "Status"], empty)
    }

    /// A copy of one tab's current contents.
    pub async fn snapshot(&self, tab: &str) -> Option<Sheet> {
        self.tabs.read().await.get(tab).cloned()
    }
}

#[async_trait]
impl SheetStore for InMemorySheetStore {
    async fn read_all(&self, tab: &str) -> Result<Sheet, StoreError> {
        self.tabs
            .read()
            .await
            .get(tab)
            .cloned()
            .ok_or_else(|| StoreError::TabNotFound(tab.to_string()))
    }

    async fn write_cell(
        &self,
        tab: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut tabs = self.tabs.write().await;
        let sheet = tabs
            .get_mut(tab)
            .ok_or_else(|| StoreError::TabNotFound(tab.to_string()))?;

        if col == 0 {
            return Err(StoreError::ColumnNotFound {
                tab: tab.to_string(),
                column: "0".into(),
            });
        }

        let cells = match row {
            0 => {
                return Err(StoreError::RowOutOfRange {
                    tab: tab.to_string(),
                    row,
                });
            }
            1 => &mut sheet.headers,
            n => sheet
                .rows
                .get_mut(n - 2)
                .ok_or_else(|| StoreError::RowOutOfRange {
                    tab: tab.to_string(),
                    row,
                })?,
        };

        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        Ok(())
    }

    async fn append_row(&self, tab: &str, values: Vec<String>) -> Result<(), StoreError> {
        let mut tabs = self.tabs.write().await;
        let sheet = tabs
            .get_mut(tab)
            .ok_or_else(|| StoreError::TabNotFound(tab.to_string()))?;
        sheet.rows.push(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemorySheetStore {
        InMemorySheetStore::new().with_tab(
            "Chores",
            ["Task", "Frequency"],
            [vec!["Dishes", "daily"], vec!["Trash"]],
        )
    }

    #[tokio::test]
    async fn read_missing_tab_fails() {
        let err = store().read_all("Goals").await.unwrap_err();
        assert!(matches!(err, StoreError::TabNotFound(t) if t == "Goals"));
    }

    #[tokio::test]
    async fn write_cell_pads_short_rows() {
        let store = store();
        store.write_cell("Chores", 3, 2, "weekly").await.unwrap();
        let sheet = store.snapshot("Chores").await.unwrap();
        assert_eq!(sheet.rows[1], ["Trash", "weekly"]);
    }

    #[tokio::test]
    async fn write_past_last_row_is_out_of_range() {
        let err = store().write_cell("Chores", 9, 1, "x").await.unwrap_err();
        assert!(matches!(err, StoreError::RowOutOfRange { row: 9, .. }));
    }

    #[tokio::test]
    async fn append_adds_data_row() {
        let store = store();
        store
            .append_row("Chores", vec!["Vacuum".into(), "weekly".into()])
            .await
            .unwrap();
        let sheet = store.read_all("Chores").await.unwrap();
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.cell(2, "task"), Some("Vacuum"));
    }

    #[tokio::test]
    async fn template_has_household_headers() {
        let store = InMemorySheetStore::household_template("Weekly Meal Plan", "Chores", "Reminders");
        let meals = store.read_all("Weekly Meal Plan").await.unwrap();
        assert_eq!(meals.column("Dinner"), Some(5));
        assert!(meals.rows.is_empty());
    }
}
