//! Selection resolver: which options to offer, and how a pick is sent.

use std::sync::Arc;

use folio_core::{Catalog, Category, ConversationState, SelectableItem, Topic};

/// Narrows the shared catalog to the options for the current state.
#[derive(Debug, Clone)]
pub struct SelectionResolver {
    catalog: Arc<Catalog>,
}

impl SelectionResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Options to present for `state`, in catalog order.
    ///
    /// A `topic` hint of experience or projects narrows the set to that
    /// category. Without a recognised hint the whole catalog is offered,
    /// experiences first.
    pub fn options_for(&self, state: &ConversationState) -> Vec<SelectableItem> {
        match state.topic() {
            Some(Topic::Experience) => self.catalog.experiences().to_vec(),
            Some(Topic::Projects) => self.catalog.projects().to_vec(),
            None => self.catalog.all(),
        }
    }

    /// Whether `item` is one of the options currently on offer.
    pub fn is_offered(&self, state: &ConversationState, item: &SelectableItem) -> bool {
        self.options_for(state).iter().any(|opt| opt == item)
    }

    /// Find an offered option by category and id.
    pub fn find(
        &self,
        state: &ConversationState,
        category: Category,
        id: &str,
    ) -> Option<SelectableItem> {
        self.options_for(state)
            .into_iter()
            .find(|opt| opt.category == category && opt.id == id)
    }

    /// Serialize a picked item into the message content the reasoning
    /// service receives in place of the display label.
    pub fn package_selection(item: &SelectableItem) -> String {
        // Plain structs of strings and unit enums always serialize.
        serde_json::to_string(item).unwrap_or_else(|_| item.id.clone())
    }
}
