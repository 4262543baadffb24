//! The per-frame display tree.
//!
//! A [`DisplayNode`] tree is rebuilt by the application every frame and
//! handed to the [`Renderer`](crate::Renderer) by value. The pipeline never
//! mutates it; resolved rectangles live in the hit list, the layout cache and
//! the spatial index, never on the nodes.

use std::fmt;

use arbor_geom::Edges;
use serde::{Serialize, Serializer};

use crate::{
    dimension::Dimension,
    event::{EventKind, ListenSet},
    style::{AlignItems, Border, Color, FlexItem, FlexStyle, ImageFit, TextAlign},
};

/// Declared position and size.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Serialize)]
pub struct Geometry {
    /// Offset from the parent's left edge.
    pub x: Dimension,
    /// Offset from the parent's top edge.
    pub y: Dimension,
    /// Width.
    pub width: Dimension,
    /// Height.
    pub height: Dimension,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: Dimension::Fixed(0),
            y: Dimension::Fixed(0),
            width: Dimension::Auto,
            height: Dimension::Auto,
        }
    }
}

/// Stable identity of a node across frames.
///
/// `revision` is an optional generation counter owned by the builder. A
/// remembered hash is only reused for a node whose revision matches, so
/// bumping it invalidates the entry early. Content edits are detected
/// either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeKey {
    /// Stable name.
    pub name: String,
    /// Content generation.
    pub revision: u64,
}

impl NodeKey {
    /// A key at revision 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: 0,
        }
    }
}

/// Opaque token standing in for an external image provider. Equal tokens
/// mean equal pixels; providers bump `generation` when their output changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    /// Provider identity.
    pub id: u64,
    /// Output generation.
    pub generation: u64,
}

/// Where an image's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// A file path, decoded by the backend.
    Path(String),
    /// Encoded image bytes.
    Bytes(Vec<u8>),
    /// An external provider.
    Handle(ImageHandle),
}

impl Serialize for ImageSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Path(p) => serializer.serialize_str(p),
            Self::Bytes(b) => serializer.serialize_str(&format!("<bytes: {}>", b.len())),
            Self::Handle(h) => {
                serializer.serialize_str(&format!("<handle: {}/{}>", h.id, h.generation))
            }
        }
    }
}

/// Style of a plain rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct RectStyle {
    /// Fill color.
    pub fill: Color,
    /// Optional border.
    pub border: Option<Border>,
    /// Corner radius.
    pub radius: u32,
}

/// A run of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TextContent {
    /// The string to draw.
    pub text: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Text color.
    pub color: Color,
    /// Wrap at the available width.
    pub wrap: bool,
    /// Horizontal alignment.
    pub align: TextAlign,
}

/// An image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageContent {
    /// Pixel source.
    pub source: ImageSource,
    /// Scaling mode.
    pub fit: ImageFit,
}

/// A single-line editable text field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InputContent {
    /// Current value.
    pub text: String,
    /// Text shown when the value is empty.
    pub placeholder: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Cursor position in characters.
    pub cursor: usize,
    /// Does the field hold keyboard focus?
    pub focused: bool,
}

/// One drawing command of a vector path. Coordinates resolve against the
/// node's rect.
#[derive(Debug, Clone, PartialEq, Hash, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCommand {
    /// Clear the node's surface.
    Clear,
    /// Start a new sub-path.
    MoveTo {
        /// X.
        x: Dimension,
        /// Y.
        y: Dimension,
    },
    /// Straight segment.
    LineTo {
        /// X.
        x: Dimension,
        /// Y.
        y: Dimension,
    },
    /// Cubic bezier segment.
    CurveTo {
        /// First control point x.
        cx1: Dimension,
        /// First control point y.
        cy1: Dimension,
        /// Second control point x.
        cx2: Dimension,
        /// Second control point y.
        cy2: Dimension,
        /// End x.
        x: Dimension,
        /// End y.
        y: Dimension,
    },
    /// Circular arc, angles in degrees.
    Arc {
        /// Center x.
        x: Dimension,
        /// Center y.
        y: Dimension,
        /// Radius.
        r: Dimension,
        /// Start angle.
        start: i32,
        /// End angle.
        end: i32,
    },
    /// Full circle.
    Circle {
        /// Center x.
        x: Dimension,
        /// Center y.
        y: Dimension,
        /// Radius.
        r: Dimension,
    },
    /// Filled wedge, angles in degrees.
    Pie {
        /// Center x.
        x: Dimension,
        /// Center y.
        y: Dimension,
        /// Radius.
        r: Dimension,
        /// Start angle.
        start: i32,
        /// End angle.
        end: i32,
    },
    /// Axis-aligned rectangle with optional rounded corners.
    Rect {
        /// Left.
        x: Dimension,
        /// Top.
        y: Dimension,
        /// Width.
        w: Dimension,
        /// Height.
        h: Dimension,
        /// Corner radius.
        r: Dimension,
    },
    /// Stroke style for following commands.
    Stroke {
        /// Stroke color.
        color: Color,
        /// Stroke width.
        width: u32,
    },
    /// Fill the current shape.
    Fill {
        /// Fill color.
        color: Color,
    },
}

/// A recorded vector drawing.
#[derive(Debug, Clone, PartialEq, Hash, Default, Serialize)]
pub struct VectorContent {
    /// Commands in drawing order.
    pub commands: Vec<PathCommand>,
    /// Backend texture cache key, if the drawing is static.
    pub cache_key: Option<String>,
}

/// The kind of a node and its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Children positioned by their own geometry.
    Container {
        /// Child nodes.
        children: Vec<DisplayNode>,
    },
    /// A clipped container whose children are shifted by a scroll offset.
    Scrollable {
        /// Vertical scroll offset in pixels.
        scroll_y: i32,
        /// Total content height, for scrollbars.
        content_height: u32,
        /// Child nodes.
        children: Vec<DisplayNode>,
    },
    /// Children stacked top to bottom.
    StackV {
        /// Child nodes.
        children: Vec<DisplayNode>,
    },
    /// Children stacked left to right.
    StackH {
        /// Child nodes.
        children: Vec<DisplayNode>,
    },
    /// A flexbox container.
    Flex {
        /// Container properties.
        style: FlexStyle,
        /// Child nodes.
        children: Vec<DisplayNode>,
    },
    /// A filled rectangle.
    Rect(RectStyle),
    /// Text.
    Text(TextContent),
    /// An image.
    Image(ImageContent),
    /// An editable text field.
    Input(InputContent),
    /// A vector drawing.
    VectorPath(VectorContent),
}

impl NodeKind {
    /// Short lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Container { .. } => "container",
            Self::Scrollable { .. } => "scrollable",
            Self::StackV { .. } => "stack_v",
            Self::StackH { .. } => "stack_h",
            Self::Flex { .. } => "flex",
            Self::Rect(_) => "rect",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Input(_) => "input",
            Self::VectorPath(_) => "vector_path",
        }
    }

    /// Stable discriminant used in hashes.
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Self::Container { .. } => 0,
            Self::Scrollable { .. } => 1,
            Self::StackV { .. } => 2,
            Self::StackH { .. } => 3,
            Self::Flex { .. } => 4,
            Self::Rect(_) => 5,
            Self::Text(_) => 6,
            Self::Image(_) => 7,
            Self::Input(_) => 8,
            Self::VectorPath(_) => 9,
        }
    }
}

/// One node of the per-frame tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode {
    /// Kind and payload, including children for container kinds.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Declared position and size.
    pub geometry: Geometry,
    /// Inner spacing.
    pub padding: Edges<Dimension>,
    /// Outer spacing, honoured by stack and flex parents.
    pub margin: Edges<Dimension>,
    /// Cross-frame identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<NodeKey>,
    /// Events this node is matched against during hit-testing.
    #[serde(skip_serializing_if = "ListenSet::is_empty")]
    pub listen: ListenSet,
    /// Flex child properties.
    pub flex: FlexItem,
    /// Background fill painted behind the node's content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
}

impl DisplayNode {
    /// A node of the given kind with default geometry: origin offset, auto size.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            geometry: Geometry::default(),
            padding: Edges::all(Dimension::Fixed(0)),
            margin: Edges::all(Dimension::Fixed(0)),
            key: None,
            listen: ListenSet::new(),
            flex: FlexItem::default(),
            background: None,
        }
    }

    /// A plain container.
    pub fn container(children: Vec<Self>) -> Self {
        Self::new(NodeKind::Container { children })
    }

    /// A scrollable container.
    pub fn scrollable(scroll_y: i32, content_height: u32, children: Vec<Self>) -> Self {
        Self::new(NodeKind::Scrollable {
            scroll_y,
            content_height,
            children,
        })
    }

    /// A vertical stack.
    pub fn vstack(children: Vec<Self>) -> Self {
        Self::new(NodeKind::StackV { children })
    }

    /// A horizontal stack.
    pub fn hstack(children: Vec<Self>) -> Self {
        Self::new(NodeKind::StackH { children })
    }

    /// A flex container.
    pub fn flex(style: FlexStyle, children: Vec<Self>) -> Self {
        Self::new(NodeKind::Flex { style, children })
    }

    /// A filled rectangle.
    pub fn rect(fill: Color) -> Self {
        Self::new(NodeKind::Rect(RectStyle {
            fill,
            ..RectStyle::default()
        }))
    }

    /// A text run.
    pub fn text(text: impl Into<String>, font_size: u32) -> Self {
        Self::new(NodeKind::Text(TextContent {
            text: text.into(),
            font_size,
            color: Color::BLACK,
            wrap: false,
            align: TextAlign::Left,
        }))
    }

    /// An image.
    pub fn image(source: ImageSource) -> Self {
        Self::new(NodeKind::Image(ImageContent {
            source,
            fit: ImageFit::default(),
        }))
    }

    /// An editable text field.
    pub fn input(text: impl Into<String>, font_size: u32) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self::new(NodeKind::Input(InputContent {
            text,
            placeholder: String::new(),
            font_size,
            cursor,
            focused: false,
        }))
    }

    /// A vector drawing.
    pub fn vector(commands: Vec<PathCommand>) -> Self {
        Self::new(NodeKind::VectorPath(VectorContent {
            commands,
            cache_key: None,
        }))
    }

    /// Set the declared offset.
    pub fn at(mut self, x: impl Into<Dimension>, y: impl Into<Dimension>) -> Self {
        self.geometry.x = x.into();
        self.geometry.y = y.into();
        self
    }

    /// Set the declared size.
    pub fn size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.geometry.width = width.into();
        self.geometry.height = height.into();
        self
    }

    /// Set the declared width.
    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.geometry.width = width.into();
        self
    }

    /// Set the declared height.
    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.geometry.height = height.into();
        self
    }

    /// Set padding.
    pub fn with_padding(mut self, padding: Edges<Dimension>) -> Self {
        self.padding = padding;
        self
    }

    /// Set margin.
    pub fn with_margin(mut self, margin: Edges<Dimension>) -> Self {
        self.margin = margin;
        self
    }

    /// Attach a stable identity at revision 0.
    pub fn with_key(mut self, name: impl Into<String>) -> Self {
        self.key = Some(NodeKey::new(name));
        self
    }

    /// Set the identity's revision. Has no effect on unkeyed nodes.
    pub fn with_revision(mut self, revision: u64) -> Self {
        if let Some(key) = self.key.as_mut() {
            key.revision = revision;
        }
        self
    }

    /// Add an event kind to the listen set.
    pub fn listen(mut self, kind: EventKind) -> Self {
        self.listen.insert(kind);
        self
    }

    /// Set the background fill.
    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Set the flex grow factor.
    pub fn grow(mut self, grow: f32) -> Self {
        self.flex.grow = grow;
        self
    }

    /// Set the flex shrink factor.
    pub fn shrink(mut self, shrink: f32) -> Self {
        self.flex.shrink = shrink;
        self
    }

    /// Set the flex basis.
    pub fn basis(mut self, basis: impl Into<Dimension>) -> Self {
        self.flex.basis = basis.into();
        self
    }

    /// Override the parent's cross-axis alignment.
    pub fn align_self(mut self, align: AlignItems) -> Self {
        self.flex.align_self = Some(align);
        self
    }

    /// Child nodes. Leaf kinds have none.
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            NodeKind::Container { children }
            | NodeKind::Scrollable { children, .. }
            | NodeKind::StackV { children }
            | NodeKind::StackH { children }
            | NodeKind::Flex { children, .. } => children,
            NodeKind::Rect(_)
            | NodeKind::Text(_)
            | NodeKind::Image(_)
            | NodeKind::Input(_)
            | NodeKind::VectorPath(_) => &[],
        }
    }

    /// Can this node hold children?
    pub fn is_container(&self) -> bool {
        self.kind.tag() <= 4
    }

    /// Does the listen set contain `kind`?
    pub fn listens_for(&self, kind: EventKind) -> bool {
        self.listen.contains(&kind)
    }

    /// The identity name, if any.
    pub fn key_name(&self) -> Option<&str> {
        self.key.as_ref().map(|k| k.name.as_str())
    }
}

/// Position of a node in a display list: the child index at each level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The empty path, naming the display list itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// This path extended by one child index.
    pub fn child(&self, index: usize) -> Self {
        let mut v = self.0.clone();
        v.push(index);
        Self(v)
    }

    /// Indices from the top of the list down.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Parse an id such as `"0_2_1"`.
    pub fn parse(s: &str) -> Option<Self> {
        s.split('_')
            .map(|p| p.parse::<usize>().ok())
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Look up the node this path names.
    pub fn resolve<'a>(&self, nodes: &'a [DisplayNode]) -> Option<&'a DisplayNode> {
        let (first, rest) = self.0.split_first()?;
        let mut node = nodes.get(*first)?;
        for i in rest {
            node = node.children().get(*i)?;
        }
        Some(node)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(v: Vec<usize>) -> Self {
        Self(v)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{idx}")?;
        }
        Ok(())
    }
}
