use stipple_mask::{
    generator::{Dot, Policy, PointGenerator},
    geometry::Size,
    mask::MaskAccumulator,
    scheduler::{BatchScheduler, DotSink, RunState},
};

// Fixed seed for deterministic tests
const TEST_SEED: u64 = 42;

#[derive(Default)]
struct Collect {
    dots: Vec<Dot>,
}

impl DotSink for Collect {
    fn paint(&mut self, dot: &Dot) {
        self.dots.push(*dot);
    }
}

fn create_generator(total: usize) -> PointGenerator {
    PointGenerator::new(Policy::GridJitter, total, Size::uniform(300), TEST_SEED)
}

#[test]
fn test_progress_sequence_in_chunks() {
    let mut generator = create_generator(100);
    let mut scheduler = BatchScheduler::new(100, 30);
    let mut sink = Collect::default();

    let mut generated = Vec::new();
    let mut fractions = Vec::new();
    let mut completions = Vec::new();

    while let Some(tick) = scheduler.advance(&mut generator, &mut sink) {
        generated.push(tick.progress.generated);
        fractions.push(tick.progress.fraction());
        completions.push(tick.completed);
    }

    assert_eq!(generated, vec![30, 60, 90, 100]);
    assert_eq!(completions, vec![false, false, false, true]);

    for (fraction, expected) in fractions.iter().zip([0.30, 0.60, 0.90, 1.00]) {
        assert!((fraction - expected).abs() < 1e-9, "{} != {}", fraction, expected);
    }

    assert_eq!(sink.dots.len(), 100);
    assert_eq!(scheduler.state(), RunState::Complete);
}

#[test]
fn test_tick_count_matches_ceiling() {
    for &total in &[1usize, 29, 30, 31, 100, 1000, 12_345] {
        for &chunk in &[1usize, 30, 1000] {
            let mut generator = create_generator(total);
            let mut scheduler = BatchScheduler::new(total, chunk);
            let mut sink = Collect::default();
            let mut ticks = 0;
            let mut last = 0;

            while let Some(tick) = scheduler.advance(&mut generator, &mut sink) {
                assert!(tick.progress.generated <= total);
                assert!(tick.progress.generated >= last);
                last = tick.progress.generated;
                ticks += 1;
            }

            assert_eq!(ticks, (total + chunk - 1) / chunk, "total {} chunk {}", total, chunk);
            assert_eq!(ticks, scheduler.ticks_required());
            assert_eq!(last, total);
            assert_eq!(sink.dots.len(), total);
        }
    }
}

#[test]
fn test_completion_is_reported_once() {
    let mut generator = create_generator(50);
    let mut scheduler = BatchScheduler::new(50, 20);
    let mut sink = Collect::default();

    let completed: usize = std::iter::from_fn(|| scheduler.advance(&mut generator, &mut sink))
        .filter(|tick| tick.completed)
        .count();

    assert_eq!(completed, 1);
    assert!(scheduler.done());

    // never re-enters generation
    assert!(scheduler.advance(&mut generator, &mut sink).is_none());
    assert_eq!(sink.dots.len(), 50);
}

#[test]
fn test_empty_run_completes_immediately() {
    let mut generator = create_generator(0);
    let mut scheduler = BatchScheduler::new(0, 10_000);
    let mut sink = Collect::default();

    let tick = scheduler.advance(&mut generator, &mut sink).expect("first tick");

    assert!(tick.completed);
    assert_eq!(tick.painted, 0);
    assert_eq!(tick.progress.fraction(), 1.0);
    assert!(sink.dots.is_empty());
    assert!(scheduler.advance(&mut generator, &mut sink).is_none());
}

#[test]
fn test_zero_chunk_size_still_progresses() {
    let mut generator = create_generator(3);
    let mut scheduler = BatchScheduler::new(3, 0);
    let mut sink = Collect::default();

    assert_eq!(scheduler.chunk_size(), 1);

    let ticks = std::iter::from_fn(|| scheduler.advance(&mut generator, &mut sink)).count();

    assert_eq!(ticks, 3);
}

#[test]
fn test_abort_keeps_partial_mask() {
    let size = Size::uniform(100);
    let mut generator = PointGenerator::new(Policy::GridJitter, 400, size, TEST_SEED);
    let mut scheduler = BatchScheduler::new(400, 100);
    let mut mask = MaskAccumulator::new(size, 2.0);

    let tick = scheduler.advance(&mut generator, &mut mask).expect("first tick");
    assert_eq!(tick.progress.generated, 100);

    assert!(scheduler.abort());
    assert_eq!(scheduler.state(), RunState::Aborted);
    assert!(scheduler.advance(&mut generator, &mut mask).is_none());
    assert_eq!(scheduler.progress().generated, 100);

    let painted = mask.buffer().pixels().filter(|p| p[3] > 0).count();
    assert!(painted > 0);
    assert!(!mask.is_ready());

    // aborting twice is a no-op
    assert!(!scheduler.abort());
}

#[test]
fn test_reset_starts_a_new_run() {
    let mut generator = create_generator(10);
    let mut scheduler = BatchScheduler::new(10, 4);
    let mut sink = Collect::default();

    while scheduler.advance(&mut generator, &mut sink).is_some() {}

    scheduler.reset();

    assert_eq!(scheduler.state(), RunState::Idle);
    assert_eq!(scheduler.progress().generated, 0);
    assert!(scheduler.advance(&mut generator, &mut sink).is_some());
    assert_eq!(scheduler.state(), RunState::Generating);
}

#[test]
fn test_huge_chunk_size_takes_one_tick() {
    let mut generator = create_generator(5);
    let mut scheduler = BatchScheduler::new(5, usize::MAX);
    let mut sink = Collect::default();

    assert_eq!(scheduler.ticks_required(), 1);

    let tick = scheduler.advance(&mut generator, &mut sink).expect("tick");

    assert!(tick.completed);
    assert_eq!(sink.dots.len(), 5);
}
