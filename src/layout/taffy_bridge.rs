//! Taffy Bridge - Integration with the Taffy layout engine
//!
//! Converts [`LayoutInput`] nodes into Taffy styles, runs a single layout pass
//! against the viewport width, and extracts document-space rects.

use log::debug;
use taffy::{
    AvailableSpace, Dimension, Display, FlexDirection, NodeId, Size, Style, TaffyTree,
};

use super::{ComputedLayout, LayoutInput};
use crate::types::DomRect;

// =============================================================================
// STYLE BUILDING
// =============================================================================

fn build_style(input: &LayoutInput) -> Style {
    Style {
        display: if input.hidden { Display::None } else { Display::Flex },
        flex_direction: FlexDirection::Column,
        // Block boxes never shrink to fit the viewport
        flex_shrink: 0.0,
        size: Size {
            width: Dimension::Auto,
            height: match input.height {
                Some(h) => Dimension::Length(h.max(0.0)),
                None => Dimension::Auto,
            },
        },
        ..Default::default()
    }
}

fn root_style(viewport_width: f32) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: FlexDirection::Column,
        size: Size {
            width: Dimension::Length(viewport_width.max(0.0)),
            height: Dimension::Auto,
        },
        ..Default::default()
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Lay out `nodes` in a viewport `viewport_width` pixels wide.
///
/// Nodes without a parent become children of an implicit document root, in
/// input order. Hidden nodes (and their subtrees) get zero-sized rects.
pub fn compute_block_layout(nodes: &[LayoutInput], viewport_width: f32) -> ComputedLayout {
    if nodes.is_empty() {
        return ComputedLayout::new();
    }

    let mut tree: TaffyTree<()> = TaffyTree::new();

    let Ok(root) = tree.new_leaf(root_style(viewport_width)) else {
        return ComputedLayout::new();
    };

    // First pass: one Taffy node per element
    let mut node_ids: Vec<Option<NodeId>> = Vec::with_capacity(nodes.len());
    for input in nodes {
        node_ids.push(tree.new_leaf(build_style(input)).ok());
    }

    // Second pass: parent links (document order keeps sibling order)
    for (index, input) in nodes.iter().enumerate() {
        let Some(child) = node_ids[index] else {
            continue;
        };
        let parent = input
            .parent
            .filter(|&p| p < index)
            .and_then(|p| node_ids[p])
            .unwrap_or(root);
        if let Err(err) = tree.add_child(parent, child) {
            // Detached nodes are treated like nodes Taffy never created
            debug!("event=layout_attach_failed index={} error={}", index, err);
            node_ids[index] = None;
        }
    }

    let available = Size {
        width: AvailableSpace::Definite(viewport_width.max(0.0)),
        height: AvailableSpace::MaxContent,
    };
    if tree.compute_layout(root, available).is_err() {
        return ComputedLayout::new();
    }

    // Extract: Taffy locations are parent-relative, accumulate in document order
    let mut rects = vec![DomRect::default(); nodes.len()];
    for (index, input) in nodes.iter().enumerate() {
        let Some(node) = node_ids[index] else {
            continue;
        };
        let Ok(layout) = tree.layout(node) else {
            continue;
        };

        let origin = input
            .parent
            .filter(|&p| p < index)
            .map(|p| rects[p])
            .unwrap_or_default();

        rects[index] = DomRect::new(
            origin.x + layout.location.x,
            origin.y + layout.location.y,
            layout.size.width,
            layout.size.height,
        );
    }

    let content_height = tree.layout(root).map(|l| l.size.height).unwrap_or(0.0);

    ComputedLayout {
        rects,
        content_height,
    }
}
