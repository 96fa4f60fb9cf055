//! Spring-damper chain demo
//!
//! Wires user systems through the three-phase lifecycle, then drives a
//! small point-mass chain by hand: a force pass over the spring edge
//! query, an integration pass over the body query, and a per-frame
//! scratch buffer recording impulses as a nested container.

use glam::Vec3A;
use lattice_ecs::{Entity, EntityComponentBuffer, QueryId, System, World};

#[derive(Debug, Clone, Copy, Default)]
struct Translation(Vec3A);

#[derive(Debug, Clone, Copy, Default)]
struct Momentum(Vec3A);

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator(Vec3A);

/// Spring-damper coefficients; both should be negative
#[derive(Debug, Clone, Copy)]
struct SpringDamper {
    k: f32,
    c: f32,
}

/// Impulse record pushed into the per-frame scratch buffer
#[derive(Debug, Clone, Copy)]
struct ImpulseLog {
    body: Entity,
    magnitude: f32,
}

const BODY_COUNT: usize = 16;
const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct ChainBuilder {
    bodies: Vec<Entity>,
    scratch: Entity,
}

impl System for ChainBuilder {
    fn register_components(&self, world: &mut World) {
        world.register_component::<Translation>();
        world.register_component::<Momentum>();
        world.register_component::<Accumulator>();
        world.register_component::<SpringDamper>();
    }

    fn register_queries(&mut self, _world: &mut World) {}

    fn initialize(&mut self, world: &mut World) {
        for i in 0..BODY_COUNT {
            let body = world.add_entity();
            world
                .add_component(body, Translation(Vec3A::new(3.0 * i as f32, 0.0, 0.0)))
                .unwrap();
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            world
                .add_component(body, Momentum(Vec3A::new(0.0, 0.0, sign * 10.0)))
                .unwrap();
            world.add_component(body, Accumulator::default()).unwrap();
            self.bodies.push(body);
        }

        for pair in self.bodies.windows(2) {
            let spring = world.add_edge_entity(pair[0], pair[1]);
            world
                .add_component(spring, SpringDamper { k: -2.5, c: -0.4 })
                .unwrap();
        }

        self.scratch = world.add_entity_component_buffer::<(ImpulseLog,)>(4 * BODY_COUNT);
    }
}

#[derive(Default)]
struct SpringForces {
    springs: QueryId,
}

impl System for SpringForces {
    fn register_components(&self, _world: &mut World) {}

    fn register_queries(&mut self, world: &mut World) {
        self.springs = world.add_archetype_query::<(lattice_ecs::Edge, SpringDamper)>();
    }
}

impl SpringForces {
    fn apply(world: &mut World, springs: QueryId, scratch: Entity) {
        let spring_entities: Vec<Entity> = world.query_entities(springs).iter().copied().collect();

        for spring in spring_entities {
            let edge = world.get_edge(spring).unwrap();
            if !edge.node_a.is_valid() || !edge.node_b.is_valid() {
                continue;
            }
            let coeffs = *world.get_component::<SpringDamper>(spring).unwrap();

            let xa = world.get_component::<Translation>(edge.node_a).unwrap().0;
            let xb = world.get_component::<Translation>(edge.node_b).unwrap().0;
            let va = world.get_component::<Momentum>(edge.node_a).unwrap().0;
            let vb = world.get_component::<Momentum>(edge.node_b).unwrap().0;

            let force = coeffs.k * (xa - xb) + coeffs.c * (va - vb);

            world.get_component_mut::<Accumulator>(edge.node_a).unwrap().0 += force;
            world.get_component_mut::<Accumulator>(edge.node_b).unwrap().0 -= force;

            if let Some(buffer) = world.get_entity_component_buffer_mut(scratch) {
                log_impulse(buffer, edge.node_a, force.length());
                log_impulse(buffer, edge.node_b, force.length());
            }
        }
    }
}

fn log_impulse(buffer: &mut EntityComponentBuffer, body: Entity, magnitude: f32) {
    let record = buffer.add_entity();
    if record.is_valid() {
        let _ = buffer.update_component(record, ImpulseLog { body, magnitude });
    }
}

#[derive(Default)]
struct Integrator {
    bodies: QueryId,
}

impl System for Integrator {
    fn register_components(&self, _world: &mut World) {}

    fn register_queries(&mut self, world: &mut World) {
        self.bodies = world.add_archetype_query::<(Translation, Momentum, Accumulator)>();
    }
}

impl Integrator {
    fn step(world: &mut World, bodies: QueryId) {
        let body_entities: Vec<Entity> = world.query_entities(bodies).iter().copied().collect();

        for body in body_entities {
            let force = world.get_component::<Accumulator>(body).unwrap().0;

            let momentum = world.get_component_mut::<Momentum>(body).unwrap();
            momentum.0 += force * DT;
            let velocity = momentum.0;

            world.get_component_mut::<Translation>(body).unwrap().0 += velocity * DT;
            world.get_component_mut::<Accumulator>(body).unwrap().0 = Vec3A::ZERO;
        }
    }
}

fn main() {
    tracing_subscriber::fmt().compact().init();

    let mut world = World::with_capacity(1024);
    world.register_system::<ChainBuilder>();
    world.register_system::<SpringForces>();
    world.register_system::<Integrator>();

    world.initialize_systems();

    let scratch = world.get_system::<ChainBuilder>().unwrap().scratch;
    let springs = world.get_system::<SpringForces>().unwrap().springs;
    let bodies = world.get_system::<Integrator>().unwrap().bodies;

    for frame in 0..600 {
        SpringForces::apply(&mut world, springs, scratch);
        Integrator::step(&mut world, bodies);

        if frame % 120 == 0 {
            if let Some(buffer) = world.get_entity_component_buffer(scratch) {
                let mut peak: Option<ImpulseLog> = None;
                for record in buffer.component_entities::<ImpulseLog>() {
                    if let Some(log) = buffer.get_component::<ImpulseLog>(record) {
                        if peak.is_none_or(|p| log.magnitude > p.magnitude) {
                            peak = Some(*log);
                        }
                    }
                }

                match peak {
                    Some(p) => println!(
                        "frame {frame:4}: {} impulses logged, peak {:.3} on body {}",
                        buffer.num_entities(),
                        p.magnitude,
                        p.body
                    ),
                    None => println!("frame {frame:4}: no impulses logged"),
                }
            }
        }

        // The scratch buffer is per-frame storage; wipe it for the next pass.
        if let Some(buffer) = world.get_entity_component_buffer_mut(scratch) {
            buffer.clear();
        }
    }

    println!("simulated {BODY_COUNT} bodies over 600 frames");
}
