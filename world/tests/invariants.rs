use std::time::Duration;

use outbreak_core::{CellCoord, CellIndex, Command, NoiseField, SimulationConfig};
use outbreak_world::{self as world, query, World};

const COLUMNS: u32 = 12;
const ROWS: u32 = 8;
const CAPACITY: f64 = 5_000.0;

fn ridged_world() -> World {
    let mut config = SimulationConfig::default();
    config.population.max_cell_population = CAPACITY;
    config.population.seed_population = 1_000.0;
    config.plague.step_threshold = 2;
    config.plague.infect_constant = 0.0005;
    let mut world = World::new(config).expect("valid config");

    let values = (0..COLUMNS * ROWS)
        .map(|index| {
            let column = index % COLUMNS;
            let row = index / COLUMNS;
            ((column * 7 + row * 13) % 10) as f32 / 10.0 + 0.05
        })
        .collect();
    let field = NoiseField::new(COLUMNS, ROWS, values).expect("field");
    let mut events = Vec::new();
    world::apply(&mut world, Command::InitializeFromNoise { field }, &mut events)
        .expect("initialize");
    world
}

fn assert_cells_bounded(world: &World) {
    for (index, cell) in query::population_view(world).iter() {
        for count in [
            cell.healthy_alive(),
            cell.infected_alive(),
            cell.healthy_dead(),
            cell.infected_dead(),
        ] {
            assert!(count >= 0.0, "cell {} went negative", index.get());
        }
        assert!(
            cell.total_population() <= CAPACITY + 1e-9,
            "cell {} exceeded capacity",
            index.get()
        );
    }
}

#[test]
fn ticks_and_transfers_conserve_population() {
    let mut world = ridged_world();
    let mut events = Vec::new();
    for index in [5, 40, 77] {
        world::apply(
            &mut world,
            Command::InfectCell {
                cell: CellIndex::new(index),
                amount: 200.0,
            },
            &mut events,
        )
        .expect("infect");
    }
    let initial = query::population_stats(&world).total();

    for step in 0..300_u32 {
        if step % 7 == 0 {
            let source = CellCoord::new(step % COLUMNS, (step / COLUMNS) % ROWS);
            let destination = CellCoord::new((step * 5) % COLUMNS, (step * 3) % ROWS);
            world::apply(
                &mut world,
                Command::SpawnStreamer {
                    source,
                    destination,
                    healthy: 150.0,
                    infected: 150.0,
                },
                &mut events,
            )
            .expect("spawn");
        }
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        )
        .expect("tick");

        assert_cells_bounded(&world);
        let total = query::population_stats(&world).total();
        assert!(
            (total - initial).abs() < 1e-6 * initial,
            "population drifted at step {step}: {total} vs {initial}"
        );
    }

    assert!(query::pass_index(&world) > 100);
    assert!(query::population_stats(&world).infected() > 0.0);
}

#[test]
fn weapons_relabel_population_without_removing_it() {
    let mut world = ridged_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::InfectCell {
            cell: CellIndex::new(30),
            amount: 500.0,
        },
        &mut events,
    )
    .expect("infect");
    let before = query::population_stats(&world).total();
    let weapons = query::config(&world).weapons.clone();

    for (weapon, center) in [
        (weapons.gun(), CellCoord::new(6, 2)),
        (weapons.bomb(), CellCoord::new(0, 0)),
        (weapons.disinfectant(), CellCoord::new(11, 7)),
        (weapons.cure_bomb(), CellCoord::new(3, 3)),
        (weapons.wall(), CellCoord::new(5, 5)),
    ] {
        world::apply(&mut world, Command::UseWeapon { weapon, center }, &mut events)
            .expect("weapon");
        assert_cells_bounded(&world);
    }

    let after = query::population_stats(&world);
    assert!((after.total() - before).abs() < 1e-6 * before);
    assert!(after.casualties > 0.0);
}
