use std::io::{self, Write};

use arbor_geom::Rect;
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    error::{Error, Result},
    layout,
    measure::Measurer,
    node::{DisplayNode, NodePath},
};

/// Lays out a display list inside `parent` and returns a string showing each
/// node's kind, identity, path and resolved rect, indented by depth. Culling
/// does not apply. This is a debug function.
pub fn dump(nodes: &[DisplayNode], parent: Rect, measurer: &mut dyn Measurer) -> Result<String> {
    let mut rows = Vec::new();
    layout::for_each_rect(nodes, parent, measurer, &mut |path, _, rect| {
        rows.push((NodePath::from(path.to_vec()), rect));
    })?;
    let mut buffer = Buffer::ansi();
    for (path, rect) in rows {
        let Some(node) = path.resolve(nodes) else {
            continue;
        };
        dump_node(&mut buffer, &path, node, rect).map_err(|e| Error::Internal(e.to_string()))?;
    }
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Write an indented, colored label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> io::Result<()> {
    write!(buffer, "{indent}  ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{label}")?;
    buffer.reset()?;
    writeln!(buffer, " {value}")
}

/// Write one node's header line and fields.
fn dump_node(buffer: &mut Buffer, path: &NodePath, node: &DisplayNode, rect: Rect) -> io::Result<()> {
    let indent = "    ".repeat(path.indices().len().saturating_sub(1));

    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{}", node.kind.name())?;
    buffer.reset()?;
    if let Some(key) = &node.key {
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(buffer, " {}@{}", key.name, key.revision)?;
        buffer.reset()?;
    }
    writeln!(buffer)?;

    write_field(buffer, &indent, "path:", &path.to_string())?;
    write_field(
        buffer,
        &indent,
        "rect:",
        &format!("x: {}, y: {}, w: {}, h: {}", rect.tl.x, rect.tl.y, rect.w, rect.h),
    )?;
    if !node.listen.is_empty() {
        let kinds: Vec<&str> = node.listen.iter().map(|k| k.name()).collect();
        write_field(buffer, &indent, "listen:", &kinds.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::EventKind, measure::ZeroMeasurer, style::Color};

    fn strip(s: &str) -> String {
        let mut out = String::new();
        let mut esc = false;
        for c in s.chars() {
            match (esc, c) {
                (false, '\x1b') => esc = true,
                (true, 'm') => esc = false,
                (true, _) => {}
                (false, c) => out.push(c),
            }
        }
        out
    }

    #[test]
    fn dump_tree() -> Result<()> {
        let nodes = vec![
            DisplayNode::vstack(vec![
                DisplayNode::rect(Color::WHITE)
                    .with_key("a")
                    .size(10, 5)
                    .listen(EventKind::Click),
                DisplayNode::rect(Color::WHITE).size(10, 5),
            ])
            .with_key("stack")
            .with_revision(3)
            .at(2, 2)
            .size(50, 50),
        ];
        let out = strip(&dump(&nodes, Rect::new(0, 0, 100, 100), &mut ZeroMeasurer)?);
        let expected = "\
stack_v stack@3
  path: 0
  rect: x: 2, y: 2, w: 50, h: 50
    rect a@0
      path: 0_0
      rect: x: 2, y: 2, w: 10, h: 5
      listen: click
    rect
      path: 0_1
      rect: x: 2, y: 7, w: 10, h: 5
";
        assert_eq!(out, expected);
        Ok(())
    }
}
