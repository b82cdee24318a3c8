//! Plain-text rendering of the cost graph.

use gridwalk_core::GridCoord;
use gridwalk_world::{query, World};

/// Renders one right-aligned column per cell; blocking nodes print as `#`.
pub(crate) fn render_costs(world: &World) -> String {
    let map = query::tile_map(world);
    let width = i32::try_from(map.width()).unwrap_or(i32::MAX);
    let height = i32::try_from(map.height()).unwrap_or(i32::MAX);

    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            let cell = match query::node(world, GridCoord::new(x, y)) {
                Some(node) if node.is_blocking() => "  #".to_owned(),
                Some(node) => format!("{:>3}", node.cost()),
                None => "  ?".to_owned(),
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    out
}
