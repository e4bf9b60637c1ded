//! Domain types representing tracker categories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Reserved category name under which pinned trackers live.
pub const PINNED_CATEGORY_NAME: &str = "";

/// Named grouping of trackers. The name doubles as the de-duplication key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// The sentinel category that holds pinned trackers.
    pub fn pinned() -> Self {
        Self::new(PINNED_CATEGORY_NAME)
    }

    pub fn is_pinned_sentinel(&self) -> bool {
        self.name == PINNED_CATEGORY_NAME
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        if self.is_pinned_sentinel() {
            "(pinned)".into()
        } else {
            self.name.clone()
        }
    }
}
