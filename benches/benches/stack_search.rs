// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use waypoint_hierarchy::{ContainerKind, Hierarchy, Screen, ScreenId};
use waypoint_router::adapters::DefaultContainerAdapterLocator;
use waypoint_router::iterator::{DefaultStackIterator, SearchOptions, StackIterator, StartingPoint};

struct Leaf(usize);

/// A tab bar of `tabs` stacks, each `depth` screens deep, with a presented stack of the same
/// shape on top. Returns the hierarchy and the total screen count.
fn gen_app(tabs: usize, depth: usize) -> (Hierarchy, usize) {
    let mut h = Hierarchy::new();
    let mut next = 0;
    let mut tab_bar = |h: &mut Hierarchy| {
        let bar = h.insert(Screen::container(ContainerKind::TABS, ()));
        let stacks: Vec<ScreenId> = (0..tabs)
            .map(|_| {
                let stack = h.insert(Screen::container(ContainerKind::STACK, ()));
                let leaves: Vec<ScreenId> = (0..depth)
                    .map(|_| {
                        next += 1;
                        h.insert(Screen::new(Leaf(next)))
                    })
                    .collect();
                h.set_children(stack, leaves).unwrap();
                stack
            })
            .collect();
        h.set_children(bar, stacks).unwrap();
        bar
    };
    let root = tab_bar(&mut h);
    let sheet = tab_bar(&mut h);
    h.set_root(root).unwrap();
    h.present(root, sheet).unwrap();
    let len = h.len();
    (h, len)
}

fn iterator(options: SearchOptions) -> DefaultStackIterator {
    DefaultStackIterator::new(
        options,
        StartingPoint::Root,
        Rc::new(DefaultContainerAdapterLocator::new()),
    )
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack_search");
    for &(tabs, depth) in &[(4_usize, 8_usize), (8, 32), (16, 64)] {
        let (h, len) = gen_app(tabs, depth);
        group.throughput(Throughput::Elements(len as u64));

        // Worst case: the target is the last leaf of the presented tab bar.
        let target = tabs * depth * 2;
        let full = iterator(SearchOptions::FULL_STACK);
        group.bench_function(format!("full_stack_miss_t{tabs}_d{depth}"), |b| {
            b.iter(|| {
                let found = full
                    .first_screen(&h, &mut |id| h.model::<Leaf>(id).is_some_and(|l| l.0 == 0))
                    .unwrap();
                black_box(found);
            });
        });
        group.bench_function(format!("full_stack_last_t{tabs}_d{depth}"), |b| {
            b.iter(|| {
                let found = full
                    .first_screen(&h, &mut |id| {
                        h.model::<Leaf>(id).is_some_and(|l| l.0 == target)
                    })
                    .unwrap();
                black_box(found);
            });
        });

        let visible = iterator(SearchOptions::ALL_VISIBLE);
        group.bench_function(format!("all_visible_miss_t{tabs}_d{depth}"), |b| {
            b.iter(|| {
                let found = visible
                    .first_screen(&h, &mut |id| h.model::<Leaf>(id).is_some_and(|l| l.0 == 0))
                    .unwrap();
                black_box(found);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
