use serde::Serialize;

use super::{is_cancelled, Picking, StockMove};
use crate::classify::type_icon;
use crate::model::{LineState, TypeCode};

/// One entry of the tracker payload, as the backend computes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerLine {
    pub id: i64,
    pub name: String,
    pub stage: String,
    pub type_code: String,
    pub state: LineState,
    pub state_label: String,
    pub state_color: String,
    pub scheduled_date: String,
    pub date_done: String,
    pub progress: f64,
    pub total_demand: f64,
    pub total_done: f64,
    pub icon: String,
    pub products: Vec<ProductLine>,
    pub partner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLine {
    pub product: String,
    pub demand: f64,
    pub done: f64,
    pub uom: String,
}

fn state_display(state: &LineState) -> (&str, &'static str) {
    match state {
        LineState::Draft => ("Borrador", "secondary"),
        LineState::Waiting => ("En espera", "warning"),
        LineState::Confirmed => ("Confirmado", "info"),
        LineState::Assigned => ("Listo", "primary"),
        LineState::Done => ("Realizado", "success"),
        other => (other.as_str(), "secondary"),
    }
}

impl TrackerLine {
    /// `moves` may contain moves of other pickings and cancelled moves; both are skipped.
    pub fn from_picking<'a>(
        picking: &Picking,
        moves: impl IntoIterator<Item = &'a StockMove>,
    ) -> Self {
        let moves: Vec<&StockMove> = moves
            .into_iter()
            .filter(|m| m.picking_id == Some(picking.id) && !is_cancelled(&m.state))
            .collect();

        let total_demand: f64 = moves.iter().map(|m| m.product_uom_qty).sum();
        let total_done: f64 = moves.iter().map(|m| m.quantity).sum();

        let progress = if picking.state == LineState::Done {
            100.0
        } else if total_demand > 0.0 {
            // Halves round to the even tenth.
            (total_done / total_demand * 1000.0).round_ties_even() / 10.0
        } else {
            0.0
        };

        let type_code = picking
            .type_code
            .clone()
            .unwrap_or_else(|| "internal".to_string());
        let (state_label, state_color) = state_display(&picking.state);

        TrackerLine {
            id: picking.id,
            name: picking.name.clone(),
            stage: picking
                .type_name
                .clone()
                .unwrap_or_else(|| "Transfer".to_string()),
            icon: type_icon(&TypeCode::parse(&type_code)).to_string(),
            type_code,
            state: picking.state.clone(),
            state_label: state_label.to_string(),
            state_color: state_color.to_string(),
            scheduled_date: picking
                .scheduled_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
            date_done: picking
                .date_done
                .map(|d| d.format("%d/%m/%Y %H:%M").to_string())
                .unwrap_or_default(),
            progress,
            total_demand,
            total_done,
            products: moves
                .iter()
                .map(|m| ProductLine {
                    product: m.product.clone(),
                    demand: m.product_uom_qty,
                    done: m.quantity,
                    uom: m.uom.clone(),
                })
                .collect(),
            partner: picking.partner.clone().unwrap_or_default(),
        }
    }
}
