//! Paged, searchable workflow listing.

use std::sync::Arc;

use greenlight_client::{FilterExpression, ListQuery, WorkflowStore};
use greenlight_model::WorkflowListItem;

use crate::error::ConsoleResult;

/// One fetched page of the workflow list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub items: Vec<WorkflowListItem>,
    pub total_results: usize,
    pub offset: usize,
    pub limit: usize,
}

impl ListPage {
    pub fn has_next(&self) -> bool {
        self.offset + self.items.len() < self.total_results
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }
}

/// Paging state over the workflow list endpoint.
#[derive(Debug, Clone)]
pub struct ListController {
    store: Arc<dyn WorkflowStore>,
    page_size: usize,
    offset: usize,
    search: Option<String>,
}

impl ListController {
    pub fn new(store: Arc<dyn WorkflowStore>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            offset: 0,
            search: None,
        }
    }

    /// Set or clear the search query. Changing the search resets paging.
    pub fn set_search(&mut self, query: Option<String>) {
        self.search = query.filter(|q| !q.is_empty());
        self.offset = 0;
    }

    /// Advance to the next page. The caller checks `has_next` first; the
    /// fetch clamps the offset regardless.
    pub fn next_page(&mut self) {
        self.offset += self.page_size;
    }

    pub fn previous_page(&mut self) {
        self.offset = self.offset.saturating_sub(self.page_size);
    }

    /// Fetch the current page.
    pub async fn fetch(&mut self) -> ConsoleResult<ListPage> {
        let mut query = ListQuery::page(self.page_size, self.offset);
        if let Some(search) = &self.search {
            query = query.with_filter(FilterExpression::contains("name", search));
        }

        let mut listing = self.store.list_workflows(&query).await?;

        // A deletion on the last page can leave the offset past the end;
        // clamp and refetch.
        if listing.workflows.is_empty() && self.offset > 0 && listing.total_results > 0 {
            self.offset = ((listing.total_results - 1) / self.page_size) * self.page_size;
            let mut query = ListQuery::page(self.page_size, self.offset);
            if let Some(search) = &self.search {
                query = query.with_filter(FilterExpression::contains("name", search));
            }
            listing = self.store.list_workflows(&query).await?;
        }

        Ok(ListPage {
            items: listing.workflows,
            total_results: listing.total_results,
            offset: self.offset,
            limit: self.page_size,
        })
    }
}
