//! Status window: mode, drag state, and the connection list.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::connection::drag::{ConnectionDragController, DragPhase, PlaceOutcome};
use crate::connection::graph::ConnectionGraph;
use crate::connection::point::ConnectionPoint;
use crate::connection::registry::ConnectionRegistry;
use crate::connection::systems::{LastPlaceOutcome, RemoveConnection};
use crate::core::components::Building;
use crate::core::state::ConstructionMode;

pub fn phase_label(phase: DragPhase) -> &'static str {
    match phase {
        DragPhase::Idle => "idle",
        DragPhase::HighlightOnly => "highlight",
        DragPhase::Dragging => "dragging",
    }
}

pub fn outcome_label(outcome: &PlaceOutcome) -> String {
    match outcome {
        PlaceOutcome::Ignored => "nothing under pointer".to_string(),
        PlaceOutcome::Started { .. } => "drag started".to_string(),
        PlaceOutcome::Connected { id, .. } => format!("connected {}", id),
        PlaceOutcome::Rejected { .. } => "connection refused".to_string(),
        PlaceOutcome::NoTarget => "no compatible point".to_string(),
        PlaceOutcome::OutOfRange { distance, .. } => format!("out of range ({:.2})", distance),
        PlaceOutcome::Aborted => "drag aborted".to_string(),
    }
}

fn point_label(
    entity: Entity,
    points: &Query<(&ConnectionPoint, Option<&ChildOf>)>,
    buildings: &Query<&Building>,
) -> String {
    let Ok((point, parent)) = points.get(entity) else {
        return format!("{:?}", entity);
    };
    let owner = parent
        .and_then(|p| buildings.get(p.parent()).ok())
        .map(|b| b.name.as_str())
        .unwrap_or("?");
    format!("{} {}", owner, point.point_type.label())
}

pub fn hud_system(
    mut contexts: EguiContexts,
    mode: Res<State<ConstructionMode>>,
    controller: Res<ConnectionDragController>,
    registry: Res<ConnectionRegistry>,
    graph: Res<ConnectionGraph>,
    last_outcome: Res<LastPlaceOutcome>,
    points: Query<(&ConnectionPoint, Option<&ChildOf>)>,
    buildings: Query<&Building>,
    mut removals: MessageWriter<RemoveConnection>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Window::new("Connections")
        .resizable(false)
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.label(format!("mode: {}  (Tab)", mode.get().label()));
            ui.label(format!("drag: {}", phase_label(controller.phase())));
            if let Some(entity) = controller.highlighted() {
                ui.label(format!("under pointer: {}", point_label(entity, &points, &buildings)));
            }
            if let Some(outcome) = &last_outcome.0 {
                ui.label(
                    egui::RichText::new(outcome_label(outcome))
                        .color(egui::Color32::from_rgb(249, 226, 175)),
                );
            }
            ui.separator();
            ui.label(format!("{} points, {} connections", registry.len(), graph.len()));

            for (id, connection) in graph.iter() {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} {} → {}",
                            id,
                            point_label(connection.start(), &points, &buildings),
                            point_label(connection.end(), &points, &buildings)
                        ))
                        .monospace(),
                    );
                    if ui.small_button("remove").clicked() {
                        removals.write(RemoveConnection::One(id));
                    }
                });
            }

            if !graph.is_empty() && ui.button("clear all").clicked() {
                removals.write(RemoveConnection::All);
            }
            ui.separator();
            ui.small("click: start/commit · right/Esc: cancel · Q/E: rotate");
        });
}
