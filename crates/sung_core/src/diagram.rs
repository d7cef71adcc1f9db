//! Sung Diagram geometry and region grouping.
//!
//! # Responsibility
//! - Group tasks by region for list-style rendering.
//! - Compute canvas anchors for graphical front ends.
//! - Map a drop position back to priority flags.
//!
//! # Invariants
//! - Low-priority tasks are never placed on the canvas.
//! - Placement is deterministic for a given task order.

use crate::model::priority::{Priority, PriorityFlags, SungRegion};
use crate::model::task::{Task, TaskId};
use serde::Serialize;
use std::collections::BTreeMap;

pub const CANVAS_SIZE: f64 = 1024.0;
pub const CENTER: Point = Point {
    x: CANVAS_SIZE / 2.0,
    y: CANVAS_SIZE / 2.0,
};

/// Offset of the placement anchors from the center.
const ANCHOR_OFFSET: f64 = 375.0;
const DO_NOW_RING_RADIUS: f64 = 75.0;
const DO_NOW_RING_DROP: f64 = 75.0;
const DO_NOW_ANGLE_STEP_DEG: f64 = 45.0;
const STACK_STEP: f64 = 15.0;

/// Radius of the three drawn circles.
pub const CIRCLE_RADIUS: f64 = 275.0;
/// Horizontal/vertical shift of each drawn circle from the center.
const CIRCLE_SHIFT: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Centers of the drawn importance/urgency/fitness circles.
pub fn circle_centers() -> [(Point, &'static str); 3] {
    [
        (
            Point {
                x: CENTER.x - CIRCLE_SHIFT,
                y: CENTER.y,
            },
            "importance",
        ),
        (
            Point {
                x: CENTER.x,
                y: CENTER.y + CIRCLE_SHIFT,
            },
            "urgency",
        ),
        (
            Point {
                x: CENTER.x + CIRCLE_SHIFT,
                y: CENTER.y,
            },
            "fitness",
        ),
    ]
}

fn importance_anchor() -> Point {
    Point {
        x: CENTER.x - ANCHOR_OFFSET,
        y: CENTER.y,
    }
}

fn urgency_anchor() -> Point {
    Point {
        x: CENTER.x,
        y: CENTER.y + ANCHOR_OFFSET,
    }
}

fn fitness_anchor() -> Point {
    Point {
        x: CENTER.x + ANCHOR_OFFSET,
        y: CENTER.y,
    }
}

/// First placement position of a region; `None` for low priority.
pub fn anchor(region: SungRegion) -> Option<Point> {
    match region {
        SungRegion::DoNow => Some(CENTER),
        SungRegion::ImportantUrgent => Some(importance_anchor().midpoint(urgency_anchor())),
        SungRegion::ImportantFit => Some(importance_anchor().midpoint(fitness_anchor())),
        SungRegion::UrgentFit => Some(urgency_anchor().midpoint(fitness_anchor())),
        SungRegion::Important => Some(importance_anchor()),
        SungRegion::Urgent => Some(urgency_anchor()),
        SungRegion::Fit => Some(fitness_anchor()),
        SungRegion::LowPriority => None,
    }
}

/// Canvas position of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub task_id: TaskId,
    pub region: SungRegion,
    pub position: Point,
}

/// Result of laying out a task list on the canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramLayout {
    pub placements: Vec<Placement>,
    /// Tasks shown in the side list instead of the canvas, in input order.
    pub low_priority: Vec<TaskId>,
}

/// Places tasks on the canvas, stacking tasks that share a region.
pub fn layout(tasks: &[Task]) -> DiagramLayout {
    let mut result = DiagramLayout::default();
    let mut counts: BTreeMap<SungRegion, usize> = BTreeMap::new();

    for task in tasks {
        let region = task.region();
        let Some(base) = anchor(region) else {
            result.low_priority.push(task.id);
            continue;
        };

        let slot = counts.entry(region).or_insert(0);
        let index = *slot as f64;
        *slot += 1;

        let position = if region == SungRegion::DoNow {
            let angle = (DO_NOW_ANGLE_STEP_DEG * index).to_radians();
            Point {
                x: base.x + DO_NOW_RING_RADIUS * angle.cos(),
                y: base.y + DO_NOW_RING_RADIUS * angle.sin() + DO_NOW_RING_DROP,
            }
        } else {
            Point {
                x: base.x,
                y: base.y + STACK_STEP * index,
            }
        };

        result.placements.push(Placement {
            task_id: task.id,
            region,
            position,
        });
    }

    result
}

/// Priority flags for a task dropped at `(x, y)`.
///
/// Each flag is High when the point lies strictly inside that flag's circle.
pub fn priorities_at(x: f64, y: f64) -> PriorityFlags {
    let point = Point { x, y };
    let radius_sq = CIRCLE_RADIUS * CIRCLE_RADIUS;
    let [importance, urgency, fitness] = circle_centers().map(|(center, _)| {
        if point.distance_sq(center) < radius_sq {
            Priority::High
        } else {
            Priority::Low
        }
    });
    PriorityFlags::new(importance, urgency, fitness)
}

/// Tasks bucketed by diagram region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionGroups {
    groups: BTreeMap<SungRegion, Vec<Task>>,
}

impl RegionGroups {
    /// Groups `tasks`, keeping their relative order inside each region.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut groups: BTreeMap<SungRegion, Vec<Task>> = BTreeMap::new();
        for task in tasks {
            groups.entry(task.region()).or_default().push(task);
        }
        Self { groups }
    }

    pub fn get(&self, region: SungRegion) -> &[Task] {
        self.groups.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All eight regions in display order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (SungRegion, &[Task])> + '_ {
        SungRegion::ALL
            .into_iter()
            .map(move |region| (region, self.get(region)))
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
