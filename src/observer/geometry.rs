//! Geometry-driven observer host for headless pages.
//!
//! Each call to `take_records` recomputes every observed target against the
//! viewport (adjusted by the observer's root margin) and queues an entry when
//! the target is new or its threshold bucket or intersecting flag changed.
//! Call it after anything that moves content: mount, scroll, resize.

use super::{
    IntersectionBatch, IntersectionEntry, IntersectionHost, ObserverId, ObserverOptions,
};
use crate::dom::Page;
use crate::types::{DomRect, ElementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    threshold_index: usize,
    is_intersecting: bool,
}

#[derive(Debug)]
struct Observer {
    options: ObserverOptions,
    thresholds: Vec<f32>,
    /// Observed targets in observe order, with their last reported state.
    targets: Vec<(ElementId, Option<Observation>)>,
}

/// Headless [`IntersectionHost`].
#[derive(Debug, Default)]
pub struct GeometryObserverHost {
    observers: Vec<Observer>,
}

impl GeometryObserverHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets currently observed by `observer`.
    pub fn observed(&self, observer: ObserverId) -> Vec<ElementId> {
        self.observers
            .get(observer.0)
            .map(|o| o.targets.iter().map(|(el, _)| *el).collect())
            .unwrap_or_default()
    }

    pub fn options(&self, observer: ObserverId) -> Option<&ObserverOptions> {
        self.observers.get(observer.0).map(|o| &o.options)
    }
}

/// Visible fraction of `target` inside `root`, and whether they overlap at all.
fn visibility(target: DomRect, root: DomRect) -> (f32, bool) {
    match target.intersection(&root) {
        Some(overlap) => {
            let area = target.area();
            // Zero-area targets count as fully visible while they touch the root
            let ratio = if area > 0.0 { overlap.area() / area } else { 1.0 };
            (ratio.clamp(0.0, 1.0), true)
        }
        None => (0.0, false),
    }
}

fn observe_target(target: DomRect, root: DomRect, thresholds: &[f32]) -> (Observation, f32) {
    let (ratio, overlapping) = visibility(target, root);
    let lowest = thresholds.first().copied().unwrap_or(0.0);
    let is_intersecting = overlapping && ratio >= lowest;
    let threshold_index = if is_intersecting {
        thresholds.iter().filter(|t| **t <= ratio).count()
    } else {
        0
    };
    (
        Observation {
            threshold_index,
            is_intersecting,
        },
        ratio,
    )
}

impl IntersectionHost for GeometryObserverHost {
    fn create_observer(&mut self, options: ObserverOptions) -> ObserverId {
        let thresholds = options.normalized_thresholds();
        self.observers.push(Observer {
            options,
            thresholds,
            targets: Vec::new(),
        });
        ObserverId(self.observers.len() - 1)
    }

    fn observe(&mut self, observer: ObserverId, target: ElementId) {
        let Some(o) = self.observers.get_mut(observer.0) else {
            return;
        };
        if !o.targets.iter().any(|(el, _)| *el == target) {
            o.targets.push((target, None));
        }
    }

    fn unobserve(&mut self, observer: ObserverId, target: ElementId) {
        if let Some(o) = self.observers.get_mut(observer.0) {
            o.targets.retain(|(el, _)| *el != target);
        }
    }

    fn take_records(&mut self, page: &dyn Page) -> Vec<IntersectionBatch> {
        let viewport = DomRect::new(0.0, 0.0, page.inner_width(), page.inner_height());
        let mut batches = Vec::new();

        for (index, observer) in self.observers.iter_mut().enumerate() {
            let root = observer.options.root_margin.apply(viewport);
            let mut entries = Vec::new();

            for (target, previous) in observer.targets.iter_mut() {
                let rect = page.bounding_client_rect(*target);
                let (current, ratio) = observe_target(rect, root, &observer.thresholds);

                if *previous != Some(current) {
                    *previous = Some(current);
                    entries.push(IntersectionEntry {
                        target: *target,
                        is_intersecting: current.is_intersecting,
                        intersection_ratio: ratio,
                    });
                }
            }

            if !entries.is_empty() {
                batches.push(IntersectionBatch {
                    observer: ObserverId(index),
                    entries,
                });
            }
        }

        batches
    }
}
