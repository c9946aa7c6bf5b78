//! Benchmark for the local-search solver's move throughput.
//!
//! Run with: cargo run --release --bin bench [SMALL|LARGE]

use std::time::{Duration, Instant};

use shift_scheduling_core::demo_data::{self, DemoData};
use shift_scheduling_core::solver::{self, SolverConfig};
use shift_scheduling_core::windows::TimeWindowMap;

fn main() {
    let size: DemoData = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DemoData::Large);

    let (data, request) = demo_data::generate(size);
    let num_people = request.people.len();
    let num_days = data.days;

    println!("Benchmark: local-search solver ({})", size.as_str());
    println!("  People: {num_people}");
    println!("  Days: {num_days}");
    println!();

    let windows = TimeWindowMap::build(&data.shifts);
    let build_start = Instant::now();
    let model = solver::Model::build(&data, &request, &windows);
    println!("Model built in {:?}", build_start.elapsed());

    let solve_start = Instant::now();
    let outcome = solver::solve(
        &model,
        SolverConfig {
            time_budget: Duration::from_secs(5),
            seed: 0,
        },
    );
    let elapsed = solve_start.elapsed();

    let score = shift_scheduling_core::solver::score::evaluate(&model, &outcome.solution);

    println!("Status: {}", outcome.status.name());
    println!("Score: hard={} soft={}", score.hard, score.soft);
    println!("Solve time: {elapsed:?}");
}
