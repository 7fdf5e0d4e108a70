use std::time::Duration;

use outbreak_core::{CellCoord, Event, NoiseField, SimulationConfig};
use outbreak_simulation::Simulation;

const COLUMNS: u32 = 24;
const ROWS: u32 = 18;
const FRAME: Duration = Duration::from_millis(50);

fn field() -> NoiseField {
    let values = (0..COLUMNS * ROWS)
        .map(|index| 0.65 + ((index * 29) % 35) as f32 / 100.0)
        .collect();
    NoiseField::new(COLUMNS, ROWS, values).expect("field")
}

fn busy_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.seed = 11;
    config.plague.step_threshold = 1;
    config.plague.infect_constant = 0.0003;
    config.seeding.initial_amount = 2_000.0;
    config.streamers.schedule_probability = 0.05;
    config.streamers.min_respawn_secs = 0.2;
    config.streamers.destination_lattice.columns = 6;
    config.streamers.destination_lattice.rows = 6;
    config
}

fn session(config: &SimulationConfig, ticks: usize) -> (Vec<Event>, Simulation) {
    let mut simulation = Simulation::new(config.clone(), field()).expect("simulation");
    let mut log = Vec::new();
    for _ in 0..ticks {
        log.extend(simulation.tick(FRAME).expect("tick"));
    }
    (log, simulation)
}

#[test]
fn identical_sessions_replay_identically() {
    let config = busy_config();
    let (first_log, first) = session(&config, 300);
    let (second_log, second) = session(&config, 300);

    assert_eq!(first_log, second_log);
    assert_eq!(first.stats(), second.stats());
    assert_eq!(first.streamers().into_vec(), second.streamers().into_vec());
    assert!(first.census().passes() > 250);
    assert!(first_log
        .iter()
        .any(|event| matches!(event, Event::StreamerSpawned { .. })));
}

#[test]
fn population_is_conserved_apart_from_clamped_arrivals() {
    let config = busy_config();
    let simulation = Simulation::new(config.clone(), field()).expect("simulation");
    let initial = simulation.stats().total();

    let (log, simulation) = session(&config, 200);
    let clamped: f64 = log
        .iter()
        .map(|event| match event {
            Event::StreamerArrived { clamped, .. } => *clamped,
            _ => 0.0,
        })
        .sum();
    let total = simulation.stats().total();
    assert!((total + clamped - initial).abs() <= initial * 1e-6);
}

#[test]
fn host_tools_report_their_effects() {
    let config = busy_config();
    let (_, mut simulation) = session(&config, 20);
    let center = CellCoord::new(COLUMNS / 2, ROWS / 2);
    let _ = simulation.take_dirty_cells();

    let events = simulation
        .use_weapon(config.weapons.cure_bomb(), center)
        .expect("cure bomb");
    assert!(events.iter().any(|event| matches!(
        event,
        Event::WeaponUsed { affected_cells, .. } if *affected_cells > 0
    )));
    assert!(!simulation.take_dirty_cells().is_empty());

    let before = simulation.cell_at(center).expect("cell").total_population();
    let _ = simulation
        .paint_population(center, 2, 50.0)
        .expect("paint");
    let after = simulation.cell_at(center).expect("cell").total_population();
    assert!(after >= before);
}

#[test]
fn paint_radius_wider_than_the_grid_covers_every_cell() {
    let values = vec![0.0; 16];
    let field = NoiseField::new(4, 4, values).expect("field");
    let mut simulation = Simulation::new(SimulationConfig::default(), field).expect("simulation");

    let events = simulation
        .paint_population(CellCoord::new(0, 0), u32::MAX, 25.0)
        .expect("paint");

    assert!(events.iter().any(|event| matches!(
        event,
        Event::PopulationInjected { cells: 16, added, .. } if *added == 400.0
    )));
}
