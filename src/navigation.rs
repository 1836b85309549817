use std::cell::RefCell;
use std::io::Write;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Default record kind opened from a delivery line.
pub const DEFAULT_RECORD_MODEL: &str = "stock.picking";

/// Request to open the detail form of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub res_model: String,
    pub res_id: i64,
    pub target: String,
}

impl NavigationRequest {
    pub fn form(res_model: impl Into<String>, res_id: i64) -> Self {
        NavigationRequest {
            res_model: res_model.into(),
            res_id,
            target: "current".to_string(),
        }
    }
}

// Serialized as a window action, the shape the host's action service consumes.
impl Serialize for NavigationRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut action = serializer.serialize_struct("NavigationRequest", 5)?;
        action.serialize_field("type", "ir.actions.act_window")?;
        action.serialize_field("res_model", &self.res_model)?;
        action.serialize_field("res_id", &self.res_id)?;
        action.serialize_field("views", &[(false, "form")])?;
        action.serialize_field("target", &self.target)?;
        action.end()
    }
}

/// Fire-and-forget navigation collaborator.
///
/// Implementations deal with their own failures; the caller never learns the
/// outcome.
pub trait Navigator {
    fn navigate(&self, request: NavigationRequest);
}

/// Writes each request as one JSON line.
pub struct JsonLinesNavigator<W: Write> {
    output: RefCell<W>,
}

impl<W: Write> JsonLinesNavigator<W> {
    pub fn new(output: W) -> Self {
        JsonLinesNavigator {
            output: RefCell::new(output),
        }
    }

    pub fn into_inner(self) -> W {
        self.output.into_inner()
    }

    fn write_request(&self, request: &NavigationRequest) -> std::io::Result<()> {
        let mut output = self.output.borrow_mut();
        serde_json::to_writer(&mut *output, request)?;
        writeln!(output)?;
        output.flush()
    }
}

impl<W: Write> Navigator for JsonLinesNavigator<W> {
    fn navigate(&self, request: NavigationRequest) {
        if let Err(e) = self.write_request(&request) {
            tracing::warn!(
                "failed to emit navigation to {} {}: {}",
                request.res_model,
                request.res_id,
                e
            );
        }
    }
}
