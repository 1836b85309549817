use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use super::line::TrackerLine;
use super::{is_cancelled, Picking, PickingSnapshot, StockMove};
use crate::model::LineState;

/// Live (non-cancelled) pickings and moves of a snapshot, indexed by id.
struct FlowIndex<'a> {
    pickings: HashMap<i64, &'a Picking>,
    moves: HashMap<i64, &'a StockMove>,
    live_moves: HashMap<i64, Vec<&'a StockMove>>,
}

impl<'a> FlowIndex<'a> {
    fn new(snapshot: &'a PickingSnapshot) -> Self {
        let pickings: HashMap<i64, &Picking> = snapshot
            .pickings
            .iter()
            .filter(|p| !is_cancelled(&p.state))
            .map(|p| (p.id, p))
            .collect();

        let mut live_moves: HashMap<i64, Vec<&StockMove>> = HashMap::new();
        for m in &snapshot.moves {
            if is_cancelled(&m.state) {
                continue;
            }
            if let Some(picking_id) = m.picking_id {
                live_moves.entry(picking_id).or_default().push(m);
            }
        }

        FlowIndex {
            pickings,
            moves: snapshot.moves.iter().map(|m| (m.id, m)).collect(),
            live_moves,
        }
    }

    fn moves_of(&self, picking_id: i64) -> &[&'a StockMove] {
        self.live_moves
            .get(&picking_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Live picking holding a destination move, if any.
    fn picking_of(&self, m: &StockMove) -> Option<&'a Picking> {
        m.picking_id.and_then(|id| self.pickings.get(&id).copied())
    }

    /// Pickings fed by this one, in first-seen order.
    fn next_pickings(&self, picking: &Picking) -> Vec<&'a Picking> {
        let mut next: Vec<&Picking> = Vec::new();
        for m in self.moves_of(picking.id) {
            for dest_id in &m.move_dest_ids {
                let Some(dest) = self.moves.get(dest_id) else {
                    continue;
                };
                if let Some(dest_picking) = self.picking_of(dest) {
                    if !next.iter().any(|p| p.id == dest_picking.id) {
                        next.push(dest_picking);
                    }
                }
            }
        }
        next
    }

    /// Whether every live move handed at least its processed quantity on to
    /// live moves of a later picking.
    fn fully_consumed(&self, picking: &Picking) -> bool {
        self.moves_of(picking.id).iter().all(|m| {
            let dest_moves: Vec<&StockMove> = m
                .move_dest_ids
                .iter()
                .filter_map(|id| self.moves.get(id).copied())
                .filter(|dest| !is_cancelled(&dest.state) && self.picking_of(dest).is_some())
                .collect();

            if dest_moves.is_empty() {
                return false;
            }
            let dest_qty: f64 = dest_moves.iter().map(|dest| dest.product_uom_qty).sum();
            dest_qty >= m.quantity
        })
    }
}

fn type_rank(picking: &Picking) -> u8 {
    match picking.type_code.as_deref() {
        Some("outgoing") => 0,
        Some("internal") => 1,
        _ => 2,
    }
}

fn state_rank(state: &LineState) -> u8 {
    match state {
        LineState::Done => 0,
        LineState::Assigned => 1,
        _ => 2,
    }
}

/// Reduce an order's pickings to the lines the tracker should show.
///
/// Outgoing pickings are visited first. A done picking whose moves were fully
/// taken over by a next step is replaced by that next step; everything else is
/// shown as itself. `now` stands in for missing scheduled dates.
pub fn build_tracker_lines(snapshot: &PickingSnapshot, now: NaiveDateTime) -> Vec<TrackerLine> {
    let index = FlowIndex::new(snapshot);

    let mut ordered: Vec<&Picking> = snapshot
        .pickings
        .iter()
        .filter(|p| !is_cancelled(&p.state))
        .collect();
    ordered.sort_by_key(|p| (type_rank(p), p.scheduled_date.unwrap_or(now)));

    let mut shown = HashSet::new();
    let mut visible: Vec<&Picking> = Vec::new();

    for picking in ordered {
        if shown.contains(&picking.id) {
            continue;
        }

        let next = index.next_pickings(picking);
        if picking.state == LineState::Done && !next.is_empty() && index.fully_consumed(picking) {
            tracing::debug!(
                "{} fully handed over to {} next picking(s)",
                picking.name,
                next.len()
            );
            for next_picking in next {
                shown.insert(next_picking.id);
                visible.push(next_picking);
            }
            shown.insert(picking.id);
            continue;
        }

        shown.insert(picking.id);
        visible.push(picking);
    }

    let mut seen = HashSet::new();
    visible.retain(|p| seen.insert(p.id));
    visible.sort_by(|a, b| {
        state_rank(&a.state)
            .cmp(&state_rank(&b.state))
            .then_with(|| a.name.cmp(&b.name))
    });

    visible
        .into_iter()
        .map(|picking| TrackerLine::from_picking(picking, index.moves_of(picking.id).iter().copied()))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    fn picking(id: i64, name: &str, type_code: &str, state: &str) -> Picking {
        Picking {
            id,
            name: name.to_string(),
            type_code: Some(type_code.to_string()),
            type_name: None,
            state: LineState::parse(state),
            scheduled_date: None,
            date_done: None,
            partner: None,
        }
    }

    fn stock_move(
        id: i64,
        picking_id: i64,
        state: &str,
        demand: f64,
        done: f64,
        dest: &[i64],
    ) -> StockMove {
        StockMove {
            id,
            picking_id: Some(picking_id),
            state: LineState::parse(state),
            product: "Chair".to_string(),
            product_uom_qty: demand,
            quantity: done,
            uom: "Units".to_string(),
            move_dest_ids: dest.to_vec(),
        }
    }

    fn names(lines: &[TrackerLine]) -> Vec<&str> {
        lines.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(build_tracker_lines(&PickingSnapshot::default(), now()).is_empty());
    }

    #[test]
    fn test_fully_consumed_pick_is_replaced_by_ship() {
        let snapshot = PickingSnapshot {
            pickings: vec![
                picking(1, "WH/PICK/001", "internal", "done"),
                picking(2, "WH/OUT/001", "outgoing", "assigned"),
            ],
            moves: vec![
                stock_move(10, 1, "done", 5.0, 5.0, &[20]),
                stock_move(20, 2, "assigned", 5.0, 0.0, &[]),
            ],
        };

        let lines = build_tracker_lines(&snapshot, now());
        assert_eq!(names(&lines), vec!["WH/OUT/001"]);
        assert_eq!(lines[0].total_demand, 5.0);
    }

    #[test]
    fn test_partially_consumed_pick_stays_visible() {
        let snapshot = PickingSnapshot {
            pickings: vec![
                picking(1, "WH/PICK/001", "internal", "done"),
                picking(2, "WH/OUT/001", "outgoing", "assigned"),
            ],
            moves: vec![
                stock_move(10, 1, "done", 5.0, 5.0, &[20]),
                stock_move(20, 2, "assigned", 3.0, 0.0, &[]),
            ],
        };

        let lines = build_tracker_lines(&snapshot, now());
        assert_eq!(names(&lines), vec!["WH/PICK/001", "WH/OUT/001"]);
        assert_eq!(lines[0].state, LineState::Done);
    }

    #[test]
    fn test_pending_pick_with_next_step_is_shown() {
        let snapshot = PickingSnapshot {
            pickings: vec![
                picking(1, "WH/PICK/001", "internal", "assigned"),
                picking(2, "WH/OUT/001", "outgoing", "waiting"),
            ],
            moves: vec![
                stock_move(10, 1, "assigned", 5.0, 0.0, &[20]),
                stock_move(20, 2, "waiting", 5.0, 0.0, &[]),
            ],
        };

        let lines = build_tracker_lines(&snapshot, now());
        assert_eq!(names(&lines), vec!["WH/PICK/001", "WH/OUT/001"]);
    }

    #[test]
    fn test_cancelled_records_are_ignored() {
        let snapshot = PickingSnapshot {
            pickings: vec![
                picking(1, "WH/PICK/001", "internal", "done"),
                picking(2, "WH/OUT/001", "outgoing", "cancel"),
                picking(3, "WH/OUT/002", "outgoing", "assigned"),
            ],
            moves: vec![
                stock_move(10, 1, "done", 5.0, 5.0, &[20, 30]),
                stock_move(20, 2, "cancel", 5.0, 0.0, &[]),
                stock_move(30, 3, "cancel", 5.0, 0.0, &[]),
            ],
        };

        let lines = build_tracker_lines(&snapshot, now());
        // The only live next picking has no live moves, so the pick is not consumed.
        assert_eq!(names(&lines), vec!["WH/PICK/001", "WH/OUT/002"]);
        assert_eq!(lines[1].total_demand, 0.0);
        assert!(lines.iter().all(|l| l.id != 2));
    }

    #[test]
    fn test_three_step_flow_hides_first_step() {
        let snapshot = PickingSnapshot {
            pickings: vec![
                picking(1, "WH/PICK/001", "internal", "done"),
                picking(2, "WH/PACK/001", "internal", "done"),
                picking(3, "WH/OUT/001", "outgoing", "assigned"),
            ],
            moves: vec![
                stock_move(10, 1, "done", 4.0, 4.0, &[20]),
                stock_move(20, 2, "done", 4.0, 4.0, &[30]),
                stock_move(30, 3, "assigned", 4.0, 0.0, &[]),
            ],
        };

        // Replacement is one step deep: the pack stands in for the pick and is
        // not itself revisited.
        let lines = build_tracker_lines(&snapshot, now());
        assert_eq!(names(&lines), vec!["WH/PACK/001", "WH/OUT/001"]);
    }

    #[test]
    fn test_sorted_by_state_then_name() {
        let snapshot = PickingSnapshot {
            pickings: vec![
                picking(1, "WH/OUT/003", "outgoing", "draft"),
                picking(2, "WH/OUT/002", "outgoing", "assigned"),
                picking(3, "WH/OUT/004", "outgoing", "done"),
                picking(4, "WH/OUT/001", "outgoing", "done"),
                picking(5, "WH/IN/001", "incoming", "confirmed"),
            ],
            moves: Vec::new(),
        };

        let lines = build_tracker_lines(&snapshot, now());
        assert_eq!(
            names(&lines),
            vec!["WH/OUT/001", "WH/OUT/004", "WH/OUT/002", "WH/IN/001", "WH/OUT/003"]
        );
    }

    #[test]
    fn test_split_shipment_emits_each_next_picking_once() {
        let snapshot = PickingSnapshot {
            pickings: vec![
                picking(1, "WH/PICK/001", "internal", "done"),
                picking(2, "WH/OUT/001", "outgoing", "done"),
                picking(3, "WH/OUT/002", "outgoing", "assigned"),
            ],
            moves: vec![
                stock_move(10, 1, "done", 6.0, 6.0, &[20, 30]),
                stock_move(20, 2, "done", 4.0, 4.0, &[]),
                stock_move(30, 3, "assigned", 2.0, 0.0, &[]),
            ],
        };

        let lines = build_tracker_lines(&snapshot, now());
        assert_eq!(names(&lines), vec!["WH/OUT/001", "WH/OUT/002"]);
    }
}
