use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use affixforge::data::ItemizationConfig;
use affixforge::items::{Equipment, RollSource};
use affixforge::resolve::{aggregate, resolve};
use affixforge::rolls::rarity_model::adjusted_weights;
use affixforge::rolls::{roll_new_instance, roll_rarity, GenerationContext};
use affixforge::CatalystAffinity;

fn bench_resolve(c: &mut Criterion) {
    let config = ItemizationConfig::default();
    let mut rng = StdRng::seed_from_u64(7);
    let context = GenerationContext::new("bench");
    let metadata = roll_new_instance(
        "weapon_sword_iron",
        RollSource::Crafted,
        CatalystAffinity::Fire,
        &context,
        &config,
        &mut rng,
    );

    c.bench_function("resolve_sword", |b| {
        b.iter(|| resolve(black_box("weapon_sword_iron"), black_box(&metadata), &config))
    });

    let equipment = Equipment::default();
    c.bench_function("aggregate_empty", |b| b.iter(|| aggregate(black_box(&equipment), &config)));
}

fn bench_rarity(c: &mut Criterion) {
    let config = ItemizationConfig::default();
    let base = config.rarity_model.weights_for(RollSource::Crafted);
    c.bench_function("adjusted_weights", |b| {
        b.iter(|| adjusted_weights(black_box(base), black_box(0.75), config.rarity_model.shift_strength))
    });

    let mut rng = StdRng::seed_from_u64(11);
    let context = GenerationContext::crafting("bench", 1, "weapon_sword_iron", Some("WEAPONSMITHING".into()), 60, 4);
    c.bench_function("roll_rarity", |b| {
        b.iter(|| roll_rarity(&config.rarity_model, RollSource::Crafted, "weapon_sword_iron", &context, &mut rng))
    });
}

criterion_group!(benches, bench_resolve, bench_rarity);
criterion_main!(benches);
