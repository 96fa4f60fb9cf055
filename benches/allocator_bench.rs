//! Benchmarks for the core container operations
//!
//! Run with: cargo bench
//!
//! Covers the hot paths:
//! - Column insert/get/remove
//! - Entity creation with component attachment
//! - Archetype transitions under registered queries

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lattice_ecs::{Column, Entity, World};

#[derive(Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Clone, Copy)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Clone, Copy)]
struct Health(u32);

fn bench_column(c: &mut Criterion) {
    let mut group = c.benchmark_group("column");

    for &size in &[100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("insert", size), &size, |b, &size| {
            b.iter(|| {
                let mut column: Column<Position> = Column::new(size);
                for id in 0..size as i64 {
                    let _ = column.insert(
                        Entity(id),
                        Position {
                            x: id as f32,
                            y: 0.0,
                            z: 0.0,
                        },
                    );
                }
                black_box(column.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("get", size), &size, |b, &size| {
            let mut column: Column<Position> = Column::new(size);
            for id in 0..size as i64 {
                let _ = column.insert(
                    Entity(id),
                    Position {
                        x: id as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                );
            }

            b.iter(|| {
                let mut sum = 0.0f32;
                for id in 0..size as i64 {
                    sum += column.get(black_box(Entity(id))).unwrap().x;
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("swap_remove", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut column: Column<Position> = Column::new(size);
                    for id in 0..size as i64 {
                        let _ = column.insert(
                            Entity(id),
                            Position {
                                x: id as f32,
                                y: 0.0,
                                z: 0.0,
                            },
                        );
                    }
                    column
                },
                |mut column| {
                    for id in (0..size as i64).step_by(2) {
                        column.remove(Entity(id));
                    }
                    black_box(column.len())
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_entity_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_churn");

    group.bench_function("add_with_three_components", |b| {
        b.iter_batched(
            || {
                let mut world = World::with_capacity(20_000);
                world.register_component::<Position>();
                world.register_component::<Velocity>();
                world.register_component::<Health>();
                world
            },
            |mut world| {
                for i in 0..1_000 {
                    let entity = world.add_entity();
                    let _ = world.add_component(
                        entity,
                        Position {
                            x: i as f32,
                            y: 0.0,
                            z: 0.0,
                        },
                    );
                    let _ = world.add_component(
                        entity,
                        Velocity {
                            x: 1.0,
                            y: 1.0,
                            z: 0.0,
                        },
                    );
                    let _ = world.add_component(entity, Health(100));
                }
                black_box(world.entity_count())
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

#[derive(Debug, Clone, Copy)]
struct Marker<const N: usize>;

// Distinct marker queries pad the index so every archetype transition
// pays the full per-query scan.
macro_rules! pad_query_index {
    ($world:expr; $($n:literal),*) => {
        $(
            $world.register_component::<Marker<$n>>();
            $world.add_archetype_query::<(Position, Marker<$n>)>();
        )*
    };
}

fn bench_query_transitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_transitions");

    group.bench_function("toggle_component_16_queries", |b| {
        let mut world = World::with_capacity(4_096);
        world.register_component::<Position>();
        world.register_component::<Velocity>();
        world.register_component::<Health>();

        pad_query_index!(world; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12);
        world.add_archetype_query::<(Position,)>();
        world.add_archetype_query::<(Velocity,)>();
        world.add_archetype_query::<(Position, Velocity)>();

        let entities: Vec<Entity> = (0..512)
            .map(|_| {
                let entity = world.add_entity();
                let _ = world.add_component(
                    entity,
                    Position {
                        x: 0.0,
                        y: 0.0,
                        z: 0.0,
                    },
                );
                entity
            })
            .collect();

        b.iter(|| {
            for &entity in &entities {
                let _ = world.add_component(
                    entity,
                    Velocity {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    },
                );
                world.remove_component::<Velocity>(entity);
            }
            black_box(world.entity_count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_column, bench_entity_churn, bench_query_transitions);
criterion_main!(benches);
