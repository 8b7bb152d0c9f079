use crate::{
    document::model::{AxisSizing, CounterAlign, Document, NodeId, PrimaryAlign},
    foundation::core::{Axis, Bounds},
    foundation::error::ReframeResult,
};

/// Position the visible flow children of an auto-layout container and apply hug sizing.
///
/// Emulates what the host does after layout flags change. Wrapping is laid out as a single line.
pub fn layout_flow_children(doc: &mut Document, container: NodeId) -> ReframeResult<()> {
    let Some(layout) = doc.node(container)?.layout().copied() else {
        return Ok(());
    };
    let Some(axis) = layout.mode.primary_axis() else {
        return Ok(());
    };

    let flow: Vec<(NodeId, Bounds)> = doc
        .children(container)
        .iter()
        .copied()
        .filter(|&c| doc.is_flow_child(c))
        .filter_map(|c| doc.node(c).ok().filter(|n| n.visible).map(|n| (c, n.bounds)))
        .collect();

    let cross = axis.cross();
    let (pad_start, pad_end) = axis.edges_of(layout.padding);
    let (cross_pad_start, cross_pad_end) = cross.edges_of(layout.padding);
    let spacing = layout.item_spacing.max(0.0);
    let gaps = flow.len().saturating_sub(1) as f64;

    let content_primary = flow.iter().map(|(_, b)| axis.len_of(*b)).sum::<f64>();
    let content_cross = flow
        .iter()
        .map(|(_, b)| cross.len_of(*b))
        .fold(0.0, f64::max);

    let current = doc.bounds(container)?;
    let mut primary_len = axis.len_of(current);
    let mut cross_len = cross.len_of(current);
    if layout.primary_sizing == AxisSizing::Auto {
        primary_len = content_primary + spacing * gaps + pad_start + pad_end;
    }
    if layout.counter_sizing == AxisSizing::Auto {
        cross_len = content_cross + cross_pad_start + cross_pad_end;
    }
    let (w, h) = match axis {
        Axis::Horizontal => (primary_len, cross_len),
        Axis::Vertical => (cross_len, primary_len),
    };
    doc.resize(container, w, h)?;

    let avail_primary = (primary_len - pad_start - pad_end).max(0.0);
    let avail_cross = (cross_len - cross_pad_start - cross_pad_end).max(0.0);

    let (mut cursor, gap) = match layout.primary_align {
        PrimaryAlign::SpaceBetween if flow.len() > 1 => {
            (pad_start, ((avail_primary - content_primary) / gaps).max(0.0))
        }
        align => {
            let total = content_primary + spacing * gaps;
            (
                pad_start + align_offset(avail_primary, total, AlignKind::from(align)),
                spacing,
            )
        }
    };

    for (child, b) in flow {
        let cross_pos = cross_pad_start
            + align_offset(
                avail_cross,
                cross.len_of(b),
                AlignKind::from(layout.counter_align),
            );
        let (x, y) = match axis {
            Axis::Horizontal => (cursor, cross_pos),
            Axis::Vertical => (cross_pos, cursor),
        };
        doc.set_position(child, x, y)?;
        cursor += axis.len_of(b) + gap;
    }
    Ok(())
}

fn align_offset(container: f64, content: f64, align: AlignKind) -> f64 {
    let rem = (container - content).max(0.0);
    match align {
        AlignKind::Start => 0.0,
        AlignKind::Center => rem * 0.5,
        AlignKind::End => rem,
    }
}

enum AlignKind {
    Start,
    Center,
    End,
}

impl From<PrimaryAlign> for AlignKind {
    fn from(value: PrimaryAlign) -> Self {
        match value {
            PrimaryAlign::Min | PrimaryAlign::SpaceBetween => AlignKind::Start,
            PrimaryAlign::Center => AlignKind::Center,
            PrimaryAlign::Max => AlignKind::End,
        }
    }
}

impl From<CounterAlign> for AlignKind {
    fn from(value: CounterAlign) -> Self {
        match value {
            CounterAlign::Min | CounterAlign::Baseline => AlignKind::Start,
            CounterAlign::Center => AlignKind::Center,
            CounterAlign::Max => AlignKind::End,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/flow.rs"]
mod tests;
