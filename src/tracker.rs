use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::classify::{progress_class, state_label_class, type_icon, type_label};
use crate::model::{DeliveryLine, NormalizedModel};
use crate::navigation::{NavigationRequest, Navigator, DEFAULT_RECORD_MODEL};
use crate::normalize::normalize;
use crate::summary::Summary;
use crate::view_state::{ExpandState, ViewStateController};

/// One tracker widget instance.
///
/// Holds the current model and the user's expand flags. Each payload update
/// swaps in a freshly normalized model and bumps `revision`; the expand flags
/// are left alone.
pub struct DeliveryTracker {
    model: Arc<NormalizedModel>,
    revision: u64,
    view: ViewStateController,
    record_model: String,
}

/// Flat per-line read model for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView<'a> {
    pub id: Option<i64>,
    pub state: &'a str,
    pub progress_class: &'static str,
    pub state_label_class: &'static str,
    pub icon: &'static str,
    pub type_label: &'a str,
    pub expanded: bool,
    pub fields: &'a Map<String, Value>,
}

impl DeliveryTracker {
    pub fn new(raw: Option<&Value>) -> Self {
        Self::with_view_state(raw, ExpandState::default())
    }

    /// Build a tracker that starts from previously saved expand flags.
    pub fn with_view_state(raw: Option<&Value>, state: ExpandState) -> Self {
        Self::from_model(normalize(raw), state)
    }

    /// Build a tracker around an already normalized model, at revision 0.
    pub fn from_model(model: NormalizedModel, state: ExpandState) -> Self {
        DeliveryTracker {
            model: Arc::new(model),
            revision: 0,
            view: ViewStateController::from_state(state),
            record_model: DEFAULT_RECORD_MODEL.to_string(),
        }
    }

    /// Record kind used for navigation requests.
    pub fn with_record_model(mut self, record_model: impl Into<String>) -> Self {
        self.record_model = record_model.into();
        self
    }

    /// New payload from the data source.
    pub fn update(&mut self, raw: Option<&Value>) {
        self.replace_model(normalize(raw));
    }

    pub fn replace_model(&mut self, model: NormalizedModel) {
        self.model = Arc::new(model);
        self.revision += 1;
        tracing::debug!(
            "tracker model replaced (revision {}, {} lines)",
            self.revision,
            self.model.lines.len()
        );
    }

    pub fn model(&self) -> Arc<NormalizedModel> {
        Arc::clone(&self.model)
    }

    pub fn lines(&self) -> &[DeliveryLine] {
        &self.model.lines
    }

    pub fn summary(&self) -> &Summary {
        &self.model.summary
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn toggle(&mut self, id: i64) -> bool {
        self.view.toggle(id)
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.view.is_expanded(id)
    }

    pub fn view_state(&self) -> &ExpandState {
        self.view.expand_state()
    }

    /// Open the detail view for line `id`.
    ///
    /// Returns whether a request was issued; ids not in the current model (or
    /// lines with no record id) issue nothing.
    pub fn activate(&self, id: i64, navigator: &dyn Navigator) -> bool {
        let Some(record_id) = self.model.line(id).and_then(DeliveryLine::record_id) else {
            tracing::debug!("activation of unknown delivery line {}", id);
            return false;
        };

        navigator.navigate(NavigationRequest::form(&self.record_model, record_id));
        true
    }

    pub fn rows(&self) -> Vec<RowView<'_>> {
        self.model
            .lines
            .iter()
            .map(|line| RowView {
                id: line.id,
                state: line.state.as_str(),
                progress_class: progress_class(&line.state),
                state_label_class: state_label_class(&line.state),
                icon: type_icon(&line.type_code),
                type_label: type_label(&line.type_code),
                expanded: line.id.is_some_and(|id| self.view.is_expanded(id)),
                fields: &line.extra,
            })
            .collect()
    }
}
