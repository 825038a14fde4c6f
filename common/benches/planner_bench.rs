use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use common::games::SessionRng;
use common::games::snake::{
    rules, BotController, Direction, GameMode, GameSettings, GameState, Point, Snake, TargetScore,
};

fn settings(mode: GameMode) -> GameSettings {
    GameSettings {
        grid_size: 30,
        mode,
        target_score: TargetScore::Max,
        ..GameSettings::default()
    }
}

/// Long snake folded into rows across the top half of a 30x30 board.
fn serpentine_state() -> GameState {
    let mut segments = Vec::new();
    for row in 0..12 {
        let xs: Vec<i32> = if row % 2 == 0 { (0..30).collect() } else { (0..30).rev().collect() };
        for x in xs {
            segments.push(Point::new(x, row));
        }
    }
    segments.reverse();

    let mut rng = SessionRng::new(7);
    let mut state = rules::start(&settings(GameMode::Normal), &mut rng, Duration::ZERO);
    state.snake = Snake::from_segments(segments);
    state.direction = Direction::Down;
    state.foods.clear();
    rules::replenish_food(&state.snake, &mut state.foods, &state.settings, &mut rng, Duration::ZERO);
    state
}

fn bench_autopilot_game(mode: GameMode) {
    let mut rng = SessionRng::new(42);
    let mut state = rules::start(&settings(mode), &mut rng, Duration::ZERO);
    for step in 0..500u64 {
        let direction = BotController::calculate_move(&state);
        let result = rules::tick(&state, direction, &mut rng, Duration::from_millis(step * 150));
        state = result.state;
        if result.outcome.is_terminal() {
            break;
        }
    }
}

fn planner_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner");

    group
        .sample_size(20)
        .measurement_time(Duration::from_secs(20));

    let crowded = serpentine_state();
    group.bench_function("single_move_crowded_board", |b| {
        b.iter(|| BotController::calculate_move(black_box(&crowded)))
    });

    group.bench_function("500_ticks_normal", |b| {
        b.iter(|| bench_autopilot_game(GameMode::Normal))
    });

    group.bench_function("500_ticks_wrap", |b| {
        b.iter(|| bench_autopilot_game(GameMode::Wrap))
    });

    group.finish();
}

criterion_group!(benches, planner_bench);
criterion_main!(benches);
