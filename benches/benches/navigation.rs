// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use waypoint_hierarchy::{ContainerKind, Hierarchy, Screen, ScreenId};
use waypoint_router::actions::Embed;
use waypoint_router::config::Defaults;
use waypoint_router::factories::ModelFactory;
use waypoint_router::finders::InlineFinder;
use waypoint_router::step::{GeneralStep, StepAssembly};
use waypoint_router::{DestinationStep, Router, Window};

#[derive(Default)]
struct Page(usize);

fn page_in_root(h: &Hierarchy, index: usize) -> Option<ScreenId> {
    let root = h.root()?;
    h.children(root)
        .iter()
        .copied()
        .find(|&c| h.model::<Page>(c).is_some_and(|p| p.0 == index))
}

fn gen_chain(defaults: &Defaults, len: usize) -> DestinationStep<()> {
    let mut step = GeneralStep::root();
    for index in 0..len {
        step = StepAssembly::new(
            InlineFinder::new(move |h: &Hierarchy, _: &()| page_in_root(h, index)),
            ModelFactory::<Page, ()>::new().configured(move |page, _| page.0 = index),
        )
        .using(Embed::push(defaults))
        .from(&step)
        .assemble();
    }
    step
}

/// A window whose root stack already holds pages `0..existing`.
fn gen_window(existing: usize) -> Window {
    let window = Window::new();
    {
        let mut h = window.hierarchy_mut();
        let nav = h.insert(Screen::container(ContainerKind::STACK, ()));
        let pages = (0..existing).map(|i| h.insert(Screen::new(Page(i)))).collect();
        h.set_root(nav).unwrap();
        h.set_children(nav, pages).unwrap();
    }
    window
}

fn bench_navigate(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigate");
    for &len in &[1_usize, 8, 32] {
        group.bench_function(format!("build_all_len{len}"), |b| {
            b.iter_batched(
                || {
                    let window = gen_window(0);
                    let defaults = Defaults::new(window.clone());
                    let chain = gen_chain(&defaults, len);
                    (window, Router::new(&defaults), chain)
                },
                |(window, router, chain)| {
                    router.navigate_to(&chain, (), false, |result| {
                        black_box(result).unwrap();
                    });
                    black_box(window.hierarchy().len());
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("reuse_all_len{len}"), |b| {
            b.iter_batched(
                || {
                    let window = gen_window(len);
                    let defaults = Defaults::new(window.clone());
                    let chain = gen_chain(&defaults, len);
                    (window, Router::new(&defaults), chain)
                },
                |(window, router, chain)| {
                    router.navigate_to(&chain, (), false, |result| {
                        black_box(result).unwrap();
                    });
                    black_box(window.hierarchy().len());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_animated(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigate_animated");
    group.bench_function("build_all_len8_drain_queue", |b| {
        b.iter_batched(
            || {
                let window = gen_window(0);
                let defaults = Defaults::new(window.clone());
                let chain = gen_chain(&defaults, 8);
                (window, Router::new(&defaults), chain)
            },
            |(window, router, chain)| {
                router.navigate_to(&chain, (), true, |result| {
                    black_box(result).unwrap();
                });
                black_box(window.run_until_idle());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_navigate, bench_animated);
criterion_main!(benches);
