use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ceanim_animation_core::{AnimationManager, PropertyMap, SharedPropertySet};
use ceanim_test_fixtures::{animations, targets};

fn window_target() -> SharedPropertySet {
    let props = targets::properties("window").expect("window target fixture");
    props
        .into_iter()
        .fold(PropertyMap::new(), |map, (k, v)| map.with(k, v))
        .into_shared()
}

fn setup(instances: usize) -> AnimationManager {
    let mut mgr = AnimationManager::default();
    mgr.load_animations_from_xml(&animations::xml("widgets").expect("widgets fixture"))
        .expect("widgets load");
    for i in 0..instances {
        let name = ["Highlight", "Pulse", "Spin"][i % 3];
        let id = mgr.instantiate_animation(name).expect("instantiate");
        let mut pb = mgr.playback(id).expect("playback");
        pb.set_target(Some(window_target()));
        pb.start(false);
    }
    mgr
}

fn bench_auto_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_step_instances");
    for &n in &[1usize, 64, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut mgr = setup(n);
            b.iter(|| {
                mgr.auto_step_instances(black_box(1.0 / 60.0))
                    .expect("step");
            });
        });
    }
    group.finish();
}

fn bench_xml_load(c: &mut Criterion) {
    let xml = animations::xml("widgets").expect("widgets fixture");
    c.bench_function("load_widgets_xml", |b| {
        b.iter(|| {
            let mut mgr = AnimationManager::default();
            mgr.load_animations_from_xml(black_box(&xml))
                .expect("load")
        });
    });
}

criterion_group!(benches, bench_auto_step, bench_xml_load);
criterion_main!(benches);
