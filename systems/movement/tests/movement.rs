use std::time::Duration;

use gridwalk_core::{AnimationFrame, Direction, Event, GridCoord, Pose};
use gridwalk_system_movement::Movement;
use gridwalk_world::{query, World};

const FRAME: Duration = Duration::from_millis(16);

const MEADOW: &str = r##"
    version = 1
    width = 12
    height = 11
    spawn = [8, 9]

    [tileset]
    cost_ramp = { first_index = 1, max_cost = 20 }
    tiles = [{ index = 50, collides = true }]

    [[layers]]
    name = "Ground"
    rows = [
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
        "gggggggggggg",
    ]
    legend = { g = 1 }

    [[layers]]
    name = "Rocks"
    rows = [
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "........#...",
        "............",
        "............",
    ]
    legend = { "#" = 50 }

    [[layers]]
    name = "Canopy"
    visible = false
    rows = [
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "........#...",
    ]
    legend = { "#" = 50 }
"##;

fn meadow() -> (World, Movement) {
    let world = World::from_toml_str(MEADOW).expect("map should load");
    let movement = Movement::spawn(query::spawn(&world), query::tile_size(&world));
    (world, movement)
}

#[test]
fn walks_one_tile_in_twenty_one_frames() {
    let (world, mut movement) = meadow();
    let mut events = Vec::new();

    assert!(movement.request_move(Direction::Right, query::tile_map(&world), &mut events));
    assert_eq!(
        events.first(),
        Some(&Event::MoveStarted {
            from: GridCoord::new(8, 9),
            direction: Direction::Right,
        })
    );

    for _ in 0..20 {
        movement.advance(FRAME, &mut events);
    }
    assert!(movement.is_moving());
    assert_eq!(movement.cell(), GridCoord::new(8, 9));
    assert_eq!(movement.state().walked, 46);

    movement.advance(FRAME, &mut events);
    assert!(!movement.is_moving());
    assert_eq!(movement.cell(), GridCoord::new(9, 9));
    assert_eq!(movement.state().walked, 0);
    assert_eq!(movement.pixel_position().x, 9.0 * 48.0);
    assert_eq!(movement.pixel_position().y, 9.0 * 48.0);
    assert_eq!(
        events.last(),
        Some(&Event::CellEntered {
            cell: GridCoord::new(9, 9)
        })
    );
    assert_eq!(movement.frame(), AnimationFrame::standing(Direction::Right));
}

#[test]
fn pixel_position_never_passes_the_target_cell() {
    let (world, mut movement) = meadow();
    let mut events = Vec::new();
    assert!(movement.request_move(Direction::Left, query::tile_map(&world), &mut events));

    let start = movement.pixel_position().x;
    let target = start - 48.0;
    for _ in 0..40 {
        movement.advance(Duration::from_millis(33), &mut events);
        let x = movement.pixel_position().x;
        assert!(x >= target && x <= start, "x drifted to {x}");
    }
    assert_eq!(movement.cell(), GridCoord::new(7, 9));
}

#[test]
fn visible_colliding_tile_blocks_the_move() {
    let (world, mut movement) = meadow();
    let mut events = Vec::new();

    assert!(!movement.request_move(Direction::Up, query::tile_map(&world), &mut events));

    assert!(!movement.is_moving());
    assert_eq!(movement.cell(), GridCoord::new(8, 9));
    assert_eq!(movement.state().facing, Direction::Up);
    assert_eq!(
        events,
        vec![
            Event::AnimationChanged {
                frame: AnimationFrame::standing(Direction::Up)
            },
            Event::MoveBlocked {
                at: GridCoord::new(8, 9),
                direction: Direction::Up,
            },
        ]
    );
}

#[test]
fn hidden_layers_do_not_collide() {
    let (world, mut movement) = meadow();
    let mut events = Vec::new();
    assert!(movement.request_move(Direction::Down, query::tile_map(&world), &mut events));
}

#[test]
fn map_edge_blocks_the_move() {
    let (world, _) = meadow();
    let mut movement = Movement::spawn(GridCoord::new(11, 0), query::tile_size(&world));
    let mut events = Vec::new();

    assert!(!movement.request_move(Direction::Right, query::tile_map(&world), &mut events));
    assert!(!movement.request_move(Direction::Up, query::tile_map(&world), &mut events));
    assert_eq!(movement.state().facing, Direction::Up);
}

#[test]
fn repeated_request_during_a_move_changes_nothing() {
    let (world, mut movement) = meadow();
    let mut events = Vec::new();
    assert!(movement.request_move(Direction::Left, query::tile_map(&world), &mut events));
    movement.advance(FRAME, &mut events);
    let state = movement.state();
    let emitted = events.len();

    assert!(!movement.request_move(Direction::Left, query::tile_map(&world), &mut events));
    assert!(!movement.request_move(Direction::Down, query::tile_map(&world), &mut events));

    assert_eq!(movement.state(), state);
    assert_eq!(events.len(), emitted);
}

#[test]
fn zero_pixel_frame_leaves_the_agent_in_place() {
    let (world, mut movement) = meadow();
    let mut events = Vec::new();
    assert!(movement.request_move(Direction::Left, query::tile_map(&world), &mut events));
    let before = movement.pixel_position();
    events.clear();

    movement.advance(Duration::from_millis(1), &mut events);

    assert!(events.is_empty());
    assert_eq!(movement.pixel_position(), before);
    assert_eq!(movement.state().walked, 0);
    assert!(movement.state().remainder > 0.0);
}

#[test]
fn consecutive_tiles_alternate_the_leading_foot() {
    let (world, mut movement) = meadow();
    let mut events = Vec::new();
    let mut leading = Vec::new();

    for _ in 0..2 {
        assert!(movement.request_move(Direction::Left, query::tile_map(&world), &mut events));
        movement.advance(FRAME, &mut events);
        leading.push(movement.frame().pose);
        while movement.is_moving() {
            movement.advance(FRAME, &mut events);
        }
    }

    assert_eq!(leading, vec![Pose::LeftFoot, Pose::RightFoot]);
    assert_eq!(movement.cell(), GridCoord::new(6, 9));
}
