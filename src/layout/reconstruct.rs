//! Column reconstruction: positioned fragments in, reading-order text out.

use std::sync::Arc;

use crate::model::PositionedFragment;

use super::policy::{ColumnLayout, ReadingOrderPolicy};

/// Orders a page's fragments column by column and joins them into text.
///
/// The same reconstructor serves digital and OCR fragments; callers pass the
/// page width or the raster width accordingly.
#[derive(Debug, Clone)]
pub struct ColumnReconstructor {
    policy: Arc<dyn ReadingOrderPolicy>,
}

impl ColumnReconstructor {
    /// Create a reconstructor with the given policy.
    pub fn new(policy: Arc<dyn ReadingOrderPolicy>) -> Self {
        Self { policy }
    }

    /// The policy in use.
    pub fn policy(&self) -> &dyn ReadingOrderPolicy {
        self.policy.as_ref()
    }

    /// Fragments in reading order.
    ///
    /// Each column keeps a stable top-to-bottom sort, so fragments sharing a
    /// y coordinate stay in their input order.
    pub fn order<'a>(
        &self,
        fragments: &'a [PositionedFragment],
        page_width: f32,
    ) -> Vec<&'a PositionedFragment> {
        if fragments.is_empty() {
            return Vec::new();
        }

        let splits = self.policy.splits(page_width);
        let mut columns: Vec<Vec<&PositionedFragment>> = vec![Vec::new(); splits.len() + 1];
        for fragment in fragments {
            let index = splits.iter().filter(|split| fragment.x > **split).count();
            columns[index].push(fragment);
        }

        log::debug!(
            "{}: splits {:?}, fragments per column {:?}",
            self.policy.name(),
            splits,
            columns.iter().map(Vec::len).collect::<Vec<_>>()
        );

        for column in &mut columns {
            column.sort_by(|a, b| a.y.total_cmp(&b.y));
        }

        let mut ordered = Vec::with_capacity(fragments.len());
        for index in self.policy.column_order(columns.len()) {
            if let Some(column) = columns.get_mut(index) {
                ordered.append(column);
            }
        }
        ordered
    }

    /// Reading-order text for one page.
    pub fn reconstruct(&self, fragments: &[PositionedFragment], page_width: f32) -> String {
        self.order(fragments, page_width)
            .into_iter()
            .map(|fragment| flatten_newlines(&fragment.text))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ColumnReconstructor {
    fn default() -> Self {
        Self::new(Arc::new(ColumnLayout::default()))
    }
}

/// Replace every line break (`\r\n`, `\n`, `\r`) with a single space.
fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
