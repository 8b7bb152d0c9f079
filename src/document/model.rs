use std::{collections::VecDeque, fs::File, io::BufReader, path::Path};

use crate::foundation::{
    core::{Axis, Bounds, Edges},
    error::{ReframeError, ReframeResult},
};

/// Arena handle of a node inside a [`Document`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Arena index of this node.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Auto-layout direction of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    /// Children are positioned freely.
    #[default]
    None,
    /// Children flow left to right.
    Horizontal,
    /// Children flow top to bottom.
    Vertical,
}

impl LayoutMode {
    /// Primary axis of a flow layout; `None` for free positioning.
    pub fn primary_axis(self) -> Option<Axis> {
        match self {
            LayoutMode::None => None,
            LayoutMode::Horizontal => Some(Axis::Horizontal),
            LayoutMode::Vertical => Some(Axis::Vertical),
        }
    }
}

/// Multi-line wrapping of a flow layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutWrap {
    /// Single line.
    #[default]
    NoWrap,
    /// Wrap onto additional lines.
    Wrap,
}

/// Distribution of children along the primary axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryAlign {
    /// Pack at the start.
    #[default]
    Min,
    /// Pack in the middle.
    Center,
    /// Pack at the end.
    Max,
    /// First and last child at the edges, equal gaps in between.
    SpaceBetween,
}

/// Placement of children across the primary axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterAlign {
    /// Start edge.
    #[default]
    Min,
    /// Middle.
    Center,
    /// End edge.
    Max,
    /// Text baseline; treated as `Min` for geometry.
    Baseline,
}

/// Sizing behavior of a container axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisSizing {
    /// Keep the set size.
    #[default]
    Fixed,
    /// Hug the children.
    Auto,
}

/// Whether a child participates in its parent's flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Positioning {
    /// Flow child when the parent has auto-layout.
    #[default]
    Auto,
    /// Positioned freely regardless of the parent layout.
    Absolute,
}

/// Auto-layout flags of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AutoLayout {
    /// Flow direction.
    pub mode: LayoutMode,
    /// Wrapping.
    pub wrap: LayoutWrap,
    /// Gap between consecutive flow children.
    pub item_spacing: f64,
    /// Inner padding.
    pub padding: Edges,
    /// Primary-axis distribution.
    pub primary_align: PrimaryAlign,
    /// Counter-axis placement.
    pub counter_align: CounterAlign,
    /// Primary-axis sizing.
    pub primary_sizing: AxisSizing,
    /// Counter-axis sizing.
    pub counter_sizing: AxisSizing,
}

/// Structural role of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerRole {
    /// Frame that may carry fills and auto-layout.
    Frame,
    /// Plain grouping.
    Group,
    /// Instance of a component.
    Instance,
    /// Component definition.
    Component,
}

/// Basic geometric primitive of a leaf node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Ellipse.
    Ellipse,
    /// Free vector path.
    Vector,
    /// Line.
    Line,
}

/// Paint kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FillKind {
    /// Solid color.
    Solid,
    /// Gradient.
    Gradient,
    /// Image paint.
    Image,
}

/// Fill descriptor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fill {
    /// Paint kind.
    #[serde(rename = "type")]
    pub kind: FillKind,
    /// Hidden fills do not paint.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Paint opacity `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Straight-alpha RGBA8 for solid fills.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_rgba8: Option<[u8; 4]>,
}

impl Fill {
    /// A fill that paints something.
    pub fn is_painting(&self) -> bool {
        self.visible && self.opacity > 0.0
    }
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// Family + style pair that keys font loading.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct FontName {
    /// Family, e.g. `Inter`.
    pub family: String,
    /// Style, e.g. `Bold`.
    pub style: String,
}

/// Line height of a text range.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineHeight {
    /// Font-defined.
    #[default]
    Auto,
    /// Absolute pixels.
    Pixels(f64),
    /// Percent of the font size.
    Percent(f64),
}

/// Letter spacing of a text range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LetterSpacing {
    /// Absolute pixels.
    Pixels(f64),
    /// Percent of the font size.
    Percent(f64),
}

impl Default for LetterSpacing {
    fn default() -> Self {
        LetterSpacing::Percent(0.0)
    }
}

/// Styled character range `[start, end)` of a text node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextRun {
    /// First character index.
    pub start: usize,
    /// One past the last character index.
    pub end: usize,
    /// Font of this range.
    pub font: FontName,
    /// Font size in pixels.
    pub font_size: f64,
    /// Line height.
    #[serde(default)]
    pub line_height: LineHeight,
    /// Letter spacing.
    #[serde(default)]
    pub letter_spacing: LetterSpacing,
}

/// Text payload with ranged styles.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextContent {
    /// Characters.
    #[serde(default)]
    pub characters: String,
    /// Styled ranges, in character order.
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

/// Capability-bearing node variants.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Node with children and optional auto-layout.
    Container {
        /// Structural role.
        role: ContainerRole,
        /// Auto-layout flags; `mode == None` for free positioning.
        layout: AutoLayout,
        /// Children in z-order (back to front).
        children: Vec<NodeId>,
    },
    /// Text leaf.
    Text(TextContent),
    /// Vector leaf without image paint.
    Vector(ShapeKind),
    /// Leaf carrying at least one image paint.
    ImageBearing(ShapeKind),
}

/// Coarse discriminator of [`NodeKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTag {
    /// Container.
    Container,
    /// Instance-like container.
    Instance,
    /// Text.
    Text,
    /// Vector.
    Vector,
    /// Image-bearing.
    ImageBearing,
}

/// One element of the document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Host-side identifier; advice and face regions refer to nodes by this key.
    pub key: String,
    /// Layer name.
    pub name: String,
    /// Parent-relative geometry.
    pub bounds: Bounds,
    /// Hidden nodes are ignored by analysis.
    pub visible: bool,
    /// Host lock; locked nodes refuse reparenting.
    pub locked: bool,
    /// Flow participation.
    pub positioning: Positioning,
    /// Fills, bottom to top.
    pub fills: Vec<Fill>,
    /// Parent container.
    pub parent: Option<NodeId>,
    /// Variant payload.
    pub kind: NodeKind,
}

impl Node {
    /// Coarse type tag.
    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            NodeKind::Container {
                role: ContainerRole::Instance | ContainerRole::Component,
                ..
            } => NodeTag::Instance,
            NodeKind::Container { .. } => NodeTag::Container,
            NodeKind::Text(_) => NodeTag::Text,
            NodeKind::Vector(_) => NodeTag::Vector,
            NodeKind::ImageBearing(_) => NodeTag::ImageBearing,
        }
    }

    /// Auto-layout flags for containers.
    pub fn layout(&self) -> Option<&AutoLayout> {
        match &self.kind {
            NodeKind::Container { layout, .. } => Some(layout),
            _ => None,
        }
    }

    /// `true` when this node is a container with a flow layout.
    pub fn has_auto_layout(&self) -> bool {
        self.layout().is_some_and(|l| l.mode != LayoutMode::None)
    }

    /// `true` when any visible fill is an image paint.
    pub fn has_image_fill(&self) -> bool {
        matches!(self.kind, NodeKind::ImageBearing(_))
            || self
                .fills
                .iter()
                .any(|f| f.kind == FillKind::Image && f.is_painting())
    }
}

const ATOMIC_NAME_HINTS: [&str; 7] = [
    "mockup", "device", "iphone", "android", "phone", "laptop", "browser",
];

/// In-memory document tree: an arena of nodes rooted at one frame.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Parse a document from a JSON reader holding a [`NodeDef`] tree.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReframeResult<Self> {
        let def: NodeDef = serde_json::from_reader(r)
            .map_err(|e| ReframeError::serde(format!("parse document JSON: {e}")))?;
        Self::from_def(def)
    }

    /// Parse a document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReframeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReframeError::validation(format!("open document JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Build the arena from a nested definition. Geometry is sanitized on the way in.
    pub fn from_def(def: NodeDef) -> ReframeResult<Self> {
        if !def.node_type.is_container() {
            return Err(ReframeError::validation("document root must be a container"));
        }
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let mut queue: VecDeque<(NodeDef, Option<NodeId>)> = VecDeque::new();
        queue.push_back((def, None));
        while let Some((mut def, parent)) = queue.pop_front() {
            let children = std::mem::take(&mut def.children);
            if !children.is_empty() && !def.node_type.is_container() {
                return Err(ReframeError::validation(format!(
                    "node '{}' of type {:?} cannot have children",
                    def.name, def.node_type
                )));
            }
            let id = doc.push_node(def.into_node(parent)?);
            if let Some(p) = parent {
                doc.children_mut(p)?.push(id);
            }
            for child in children {
                queue.push_back((child, Some(id)));
            }
        }
        Ok(doc)
    }

    /// Nested definition of the whole tree.
    ///
    /// Built bottom-up over the breadth-first order, so deep trees do not recurse.
    pub fn to_def(&self) -> NodeDef {
        let mut order = vec![self.root];
        order.extend(self.descendants(self.root, usize::MAX).into_iter().map(|(id, _)| id));

        let mut built: Vec<Option<NodeDef>> = (0..self.nodes.len()).map(|_| None).collect();
        for &id in order.iter().rev() {
            let mut def = self.shallow_def(id);
            def.children = self
                .children(id)
                .iter()
                .filter_map(|c| built.get_mut(c.index()).and_then(Option::take))
                .collect();
            built[id.index()] = Some(def);
        }
        built
            .get_mut(self.root.index())
            .and_then(Option::take)
            .unwrap_or_else(|| self.shallow_def(self.root))
    }

    /// Definition of `id` without its children.
    fn shallow_def(&self, id: NodeId) -> NodeDef {
        let node = &self.nodes[id.index()];
        let (node_type, layout, text) = match &node.kind {
            NodeKind::Container { role, layout, .. } => {
                let t = match role {
                    ContainerRole::Frame => NodeType::Frame,
                    ContainerRole::Group => NodeType::Group,
                    ContainerRole::Instance => NodeType::Instance,
                    ContainerRole::Component => NodeType::Component,
                };
                (t, Some(*layout), None)
            }
            NodeKind::Text(t) => (NodeType::Text, None, Some(t.clone())),
            NodeKind::Vector(s) | NodeKind::ImageBearing(s) => {
                (NodeType::from_shape(*s), None, None)
            }
        };
        NodeDef {
            id: node.key.clone(),
            name: node.name.clone(),
            node_type,
            x: node.bounds.x,
            y: node.bounds.y,
            width: node.bounds.width,
            height: node.bounds.height,
            visible: node.visible,
            locked: node.locked,
            positioning: node.positioning,
            fills: node.fills.clone(),
            layout,
            text,
            children: Vec::new(),
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Root frame.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` for an empty arena.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by handle.
    pub fn node(&self, id: NodeId) -> ReframeResult<&Node> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| ReframeError::missing_node(format!("{id:?}")))
    }

    /// Mutable node by handle.
    pub fn node_mut(&mut self, id: NodeId) -> ReframeResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| ReframeError::missing_node(format!("{id:?}")))
    }

    /// Node by host key.
    pub fn find_by_key(&self, key: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.key == key)
            .map(|i| NodeId(i as u32))
    }

    /// Node by layer name (first match in arena order).
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    /// Children of a container; empty for leaves and unknown handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id.index()).map(|n| &n.kind) {
            Some(NodeKind::Container { children, .. }) => children,
            _ => &[],
        }
    }

    fn children_mut(&mut self, id: NodeId) -> ReframeResult<&mut Vec<NodeId>> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Container { children, .. } => Ok(children),
            _ => Err(ReframeError::mutation(format!(
                "{id:?} is not a container and cannot hold children"
            ))),
        }
    }

    /// Parent-relative bounds.
    pub fn bounds(&self, id: NodeId) -> ReframeResult<Bounds> {
        Ok(self.node(id)?.bounds)
    }

    /// Move a node (parent-relative).
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) -> ReframeResult<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ReframeError::mutation(format!(
                "non-finite position for {id:?}"
            )));
        }
        let node = self.node_mut(id)?;
        node.bounds.x = x;
        node.bounds.y = y;
        Ok(())
    }

    /// Resize a node without touching its children. Dimensions below 1px are raised to 1px.
    pub fn resize(&mut self, id: NodeId, width: f64, height: f64) -> ReframeResult<()> {
        if !width.is_finite() || !height.is_finite() {
            return Err(ReframeError::mutation(format!("non-finite size for {id:?}")));
        }
        let node = self.node_mut(id)?;
        node.bounds.width = width.max(1.0);
        node.bounds.height = height.max(1.0);
        Ok(())
    }

    /// Multiply the size of `id` and the geometry of every descendant by `factor`.
    ///
    /// The position of `id` itself is left to the caller.
    pub fn scale_subtree(&mut self, id: NodeId, factor: f64) -> ReframeResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ReframeError::mutation(format!(
                "invalid scale factor {factor} for {id:?}"
            )));
        }
        let own = self.bounds(id)?;
        self.resize(id, own.width * factor, own.height * factor)?;
        for (child, _) in self.descendants(id, usize::MAX) {
            let node = self.node_mut(child)?;
            let b = node.bounds.scaled(factor);
            node.bounds = Bounds::new(b.x, b.y, b.width.max(1.0), b.height.max(1.0));
        }
        Ok(())
    }

    /// Replace the auto-layout flags of a container.
    pub fn set_layout(&mut self, id: NodeId, new_layout: AutoLayout) -> ReframeResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Container { layout, .. } => {
                *layout = new_layout;
                Ok(())
            }
            _ => Err(ReframeError::mutation(format!(
                "{id:?} is not a container and has no layout"
            ))),
        }
    }

    /// Set flow participation.
    pub fn set_positioning(&mut self, id: NodeId, positioning: Positioning) -> ReframeResult<()> {
        self.node_mut(id)?.positioning = positioning;
        Ok(())
    }

    /// Create a transparent frame under `parent` at z-index `index` (clamped).
    pub fn create_container(
        &mut self,
        parent: NodeId,
        index: usize,
        name: impl Into<String>,
        bounds: Bounds,
        layout: AutoLayout,
    ) -> ReframeResult<NodeId> {
        // Validate the parent before growing the arena.
        self.children_mut(parent)?;
        let name = name.into();
        let id = self.push_node(Node {
            key: format!("reframe:{}", self.nodes.len()),
            name,
            bounds: bounds.sanitized(),
            visible: true,
            locked: false,
            positioning: Positioning::Auto,
            fills: Vec::new(),
            parent: Some(parent),
            kind: NodeKind::Container {
                role: ContainerRole::Frame,
                layout,
                children: Vec::new(),
            },
        });
        let siblings = self.children_mut(parent)?;
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        Ok(id)
    }

    /// Move `child` to the end of `new_parent`'s children. Coordinates are left untouched.
    pub fn append_child(&mut self, new_parent: NodeId, child: NodeId) -> ReframeResult<()> {
        if child == self.root {
            return Err(ReframeError::mutation("the root frame cannot be reparented"));
        }
        if self.node(child)?.locked {
            return Err(ReframeError::mutation(format!(
                "node '{}' is locked",
                self.node(child)?.name
            )));
        }
        if self.is_ancestor_or_self(child, new_parent) {
            return Err(ReframeError::mutation(format!(
                "{new_parent:?} is inside {child:?}; reparenting would create a cycle"
            )));
        }
        self.children_mut(new_parent)?;
        if let Some(old) = self.node(child)?.parent {
            self.children_mut(old)?.retain(|&c| c != child);
        }
        self.children_mut(new_parent)?.push(child);
        self.node_mut(child)?.parent = Some(new_parent);
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(id.index()).and_then(|n| n.parent) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    /// Breadth-first descendants of `id` (excluding `id`) with their depth, up to `max_depth`.
    pub fn descendants(&self, id: NodeId, max_depth: usize) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
        queue.push_back((id, 0));
        while let Some((cur, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for &child in self.children(cur) {
                out.push((child, depth + 1));
                queue.push_back((child, depth + 1));
            }
        }
        out
    }

    /// `true` when `id` participates in its parent's flow layout.
    pub fn is_flow_child(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id.index()) else {
            return false;
        };
        node.positioning == Positioning::Auto
            && node
                .parent
                .and_then(|p| self.nodes.get(p.index()))
                .is_some_and(Node::has_auto_layout)
    }

    /// Multi-part composites (instances, components, device mockups) that move as one unit.
    pub fn is_atomic(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id.index()) else {
            return false;
        };
        if matches!(node.tag(), NodeTag::Instance) {
            return true;
        }
        if !matches!(node.kind, NodeKind::Container { .. }) {
            return false;
        }
        let name = node.name.to_ascii_lowercase();
        ATOMIC_NAME_HINTS.iter().any(|hint| name.contains(hint))
    }

    /// `true` when `id` sits inside an atomic group (not counting `id` itself).
    pub fn is_inside_atomic(&self, id: NodeId) -> bool {
        let mut cur = self.nodes.get(id.index()).and_then(|n| n.parent);
        while let Some(p) = cur {
            if self.is_atomic(p) {
                return true;
            }
            cur = self.nodes.get(p.index()).and_then(|n| n.parent);
        }
        false
    }
}

/// JSON-facing node type discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Frame container.
    Frame,
    /// Group container.
    Group,
    /// Component instance.
    Instance,
    /// Component.
    Component,
    /// Text.
    Text,
    /// Rectangle.
    Rectangle,
    /// Ellipse.
    Ellipse,
    /// Vector path.
    Vector,
    /// Line.
    Line,
}

impl NodeType {
    fn is_container(self) -> bool {
        matches!(
            self,
            NodeType::Frame | NodeType::Group | NodeType::Instance | NodeType::Component
        )
    }

    fn from_shape(shape: ShapeKind) -> Self {
        match shape {
            ShapeKind::Rectangle => NodeType::Rectangle,
            ShapeKind::Ellipse => NodeType::Ellipse,
            ShapeKind::Vector => NodeType::Vector,
            ShapeKind::Line => NodeType::Line,
        }
    }
}

/// Nested, JSON-facing node definition.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NodeDef {
    /// Host identifier.
    #[serde(default)]
    pub id: String,
    /// Layer name.
    #[serde(default)]
    pub name: String,
    /// Node type.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Parent-relative x.
    #[serde(default)]
    pub x: f64,
    /// Parent-relative y.
    #[serde(default)]
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Visibility.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Host lock.
    #[serde(default)]
    pub locked: bool,
    /// Flow participation.
    #[serde(default)]
    pub positioning: Positioning,
    /// Fills.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<Fill>,
    /// Auto-layout flags (containers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<AutoLayout>,
    /// Text payload (text only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    /// Children (containers only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDef>,
}

impl NodeDef {
    fn into_node(self, parent: Option<NodeId>) -> ReframeResult<Node> {
        let is_image = self
            .fills
            .iter()
            .any(|f| f.kind == FillKind::Image && f.is_painting());
        let kind = match self.node_type {
            NodeType::Frame | NodeType::Group | NodeType::Instance | NodeType::Component => {
                let role = match self.node_type {
                    NodeType::Group => ContainerRole::Group,
                    NodeType::Instance => ContainerRole::Instance,
                    NodeType::Component => ContainerRole::Component,
                    _ => ContainerRole::Frame,
                };
                NodeKind::Container {
                    role,
                    layout: self.layout.unwrap_or_default(),
                    children: Vec::new(),
                }
            }
            NodeType::Text => NodeKind::Text(self.text.unwrap_or_default()),
            NodeType::Rectangle | NodeType::Ellipse | NodeType::Vector | NodeType::Line => {
                let shape = match self.node_type {
                    NodeType::Rectangle => ShapeKind::Rectangle,
                    NodeType::Ellipse => ShapeKind::Ellipse,
                    NodeType::Line => ShapeKind::Line,
                    _ => ShapeKind::Vector,
                };
                if is_image {
                    NodeKind::ImageBearing(shape)
                } else {
                    NodeKind::Vector(shape)
                }
            }
        };
        Ok(Node {
            key: self.id,
            name: self.name,
            bounds: Bounds::new(self.x, self.y, self.width, self.height).sanitized(),
            visible: self.visible,
            locked: self.locked,
            positioning: self.positioning,
            fills: self.fills,
            parent,
            kind,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
