use arbor::{
    Color, DisplayNode, Edges, EventKind,
    dimension::{Dimension, pct, px},
    node::{ImageHandle, ImageSource, PathCommand},
    style::{AlignItems, FlexStyle, JustifyContent},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Rows in the dashboard's scrolling log.
pub const LOG_ROWS: i32 = 40;
/// Height of one log row.
pub const ROW_HEIGHT: i32 = 20;

/// A dashboard at a given frame number: a header with a ticking clock, a
/// sidebar menu, a scrolling log and a footer input.
///
/// Only the clock and the log's scroll offset change between frames.
pub fn dashboard(frame: u64) -> Vec<DisplayNode> {
    let header = DisplayNode::flex(
        FlexStyle::row()
            .justify(JustifyContent::SpaceBetween)
            .align(AlignItems::Center),
        vec![
            DisplayNode::text("arbor dashboard", 16).with_key("title"),
            DisplayNode::text(format!("frame {frame:>6}"), 16)
                .with_key("clock")
                .with_revision(frame),
        ],
    )
    .with_key("header")
    .height(40)
    .with_padding(Edges::symmetric(px(0), px(16)))
    .background(Color::rgb(30, 30, 60));

    let menu = ["overview", "layout", "damage", "index", "settings"]
        .iter()
        .map(|name| {
            DisplayNode::text(*name, 16)
                .with_key(format!("menu-{name}"))
                .with_margin(Edges::new(px(4), px(0), px(4), px(8)))
                .listen(EventKind::Click)
        })
        .collect();
    let sidebar = DisplayNode::vstack(menu)
        .with_key("sidebar")
        .width(160)
        .background(Color::rgb(45, 45, 45));

    let scroll = (frame.wrapping_mul(7) % (LOG_ROWS * ROW_HEIGHT / 2) as u64) as i32;
    let rows = (0..LOG_ROWS)
        .map(|i| {
            DisplayNode::text(format!("log line {i:03}"), 16)
                .with_key(format!("log-{i}"))
                .at(8, i * ROW_HEIGHT)
                .height(ROW_HEIGHT)
        })
        .collect();
    let log = DisplayNode::scrollable(scroll, (LOG_ROWS * ROW_HEIGHT) as u32, rows)
        .with_key("log")
        .with_revision(scroll as u64)
        .basis(0)
        .grow(1.0)
        .listen(EventKind::Scroll);

    let body = DisplayNode::flex(FlexStyle::row(), vec![sidebar, log])
        .with_key("body")
        .basis(0)
        .grow(1.0);

    let footer = DisplayNode::flex(
        FlexStyle::row().align(AlignItems::Center).gap(8),
        vec![
            DisplayNode::vector(vec![PathCommand::Circle {
                x: pct(50.0),
                y: pct(50.0),
                r: Dimension::Fixed(8),
            }])
            .with_key("status")
            .size(16, 16),
            DisplayNode::input("", 14)
                .with_key("command")
                .grow(1.0)
                .listen(EventKind::Click)
                .listen(EventKind::TextInput),
            DisplayNode::image(ImageSource::Handle(ImageHandle { id: 1, generation: 0 }))
                .with_key("logo")
                .size(32, 32),
        ],
    )
    .with_key("footer")
    .height(40)
    .with_padding(Edges::symmetric(px(4), px(8)));

    vec![
        DisplayNode::flex(FlexStyle::column(), vec![header, body, footer])
            .with_key("root")
            .size(pct(100.0), pct(100.0)),
    ]
}

/// A grid of randomly colored tiles, recolored in place by `seed`. Every
/// tile is keyed by position and revisioned by `seed`, so consecutive seeds
/// dirty every tile whose color changed.
pub fn mosaic(seed: u64, cols: i32, rows: i32, tile: i32) -> Vec<DisplayNode> {
    let mut rng = StdRng::seed_from_u64(seed);
    let tiles = (0..rows)
        .flat_map(|y| (0..cols).map(move |x| (x, y)))
        .map(|(x, y)| {
            let color = Color::rgb(rng.random(), rng.random(), rng.random());
            DisplayNode::rect(color)
                .with_key(format!("tile-{x}-{y}"))
                .with_revision(seed)
                .at(x * tile, y * tile)
                .size(tile, tile)
        })
        .collect();
    vec![DisplayNode::container(tiles).with_key("mosaic")]
}
