// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use understory_flick::{
    Direction, DirectionClassifier, DirectionMap, DirectionSet, FlickKey, FlickRecognizer,
    GestureNode, PointerId, Topology,
};
use understory_timing::TimerQueue;

fn deltas(n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|i| {
            let angle = (i as f64) * 0.37;
            let radius = 40.0 + (i % 7) as f64 * 20.0;
            Vec2::from_angle(angle) * radius
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("flick/classify");
    let input = deltas(1_024);
    group.throughput(Throughput::Elements(input.len() as u64));

    for (name, topology) in [
        ("four_way", Topology::FourWay),
        ("eight_way", Topology::EightWay),
        ("cross", Topology::Cross),
        ("petal", Topology::Petal),
    ] {
        let enabled = topology.directions() | DirectionSet::TAP;
        let classifier = DirectionClassifier::new(80.0, topology);
        group.bench_with_input(BenchmarkId::new(name, input.len()), &input, |b, input| {
            b.iter(|| {
                for delta in input {
                    black_box(classifier.classify(*delta, enabled));
                }
            });
        });
    }

    group.finish();
}

/// A tree `depth` levels deep where every level has all eight directions.
fn deep_tree(depth: usize) -> DirectionMap<u32> {
    let mut map = DirectionMap::new();
    for (i, d) in Topology::EightWay.directions().iter_directions().enumerate() {
        map.insert(d, GestureNode::leaf(i as u32));
    }
    map.insert(Direction::Tap, GestureNode::leaf(100));
    if depth > 1 {
        map.insert(Direction::Right, GestureNode::branch(deep_tree(depth - 1)));
    }
    map
}

fn bench_gesture_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("flick/gesture");

    for depth in [1_usize, 4, 16] {
        let mut recognizer = FlickRecognizer::default();
        recognizer.attach(FlickKey::new(deep_tree(depth)));
        // Walk right through every branch, then end with a flick down.
        let mut path: Vec<Point> = (1..depth)
            .map(|level| Point::new(level as f64 * 100.0, 0.0))
            .collect();
        let last_x = (depth.max(2) - 1) as f64 * 100.0;
        path.push(Point::new(last_x, 100.0));
        group.throughput(Throughput::Elements(path.len() as u64 + 2));

        group.bench_with_input(BenchmarkId::new("depth", depth), &path, |b, path| {
            let finger = PointerId(0);
            b.iter(|| {
                recognizer.on_press(finger, Point::ORIGIN, 0, &mut ());
                for point in path {
                    recognizer.on_move(finger, *point, &mut ());
                }
                let last = path.last().copied().unwrap_or(Point::ORIGIN);
                black_box(recognizer.on_release(finger, last, &mut ()));
            });
        });
    }

    group.finish();
}

fn bench_timer_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing/timer_queue");

    for len in [64_usize, 1_024] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_function(BenchmarkId::new("schedule_cancel_half_drain", len), |b| {
            b.iter(|| {
                let mut q = TimerQueue::new();
                let ids: Vec<_> = (0..len as u64)
                    .map(|i| q.schedule((i * 7919) % 1_000, i))
                    .collect();
                for id in ids.iter().step_by(2) {
                    q.cancel(*id);
                }
                black_box(q.drain_due(1_000).count());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_gesture_replay, bench_timer_queue);
criterion_main!(benches);
