use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::TempDir;
use tigroup::{Container, FlashContent, Platform, RegularContent, TiFiles, TigOptions};

fn sample_group() -> Container {
    let mut group = Container::new(Platform::Ti89);
    for i in 0..32 {
        let body = vec![i as u8; 16 * 1024];
        group.push_regular(format!("var{i}.89p"), RegularContent::new(Platform::Ti89, "bench", &body).unwrap()).unwrap();
    }
    group.push_flash("app.89k", FlashContent::new("bench", 0x98, 0x24, &vec![7u8; 512 * 1024])).unwrap();
    group
}

fn bench_assemble(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let opts = TigOptions::default().with_staging_dir(dir.path());
    let group = sample_group();
    let out = dir.path().join("bench.tig");

    c.bench_function("assemble_32_regular_1_flash", |b| {
        b.iter(|| group.save(black_box(&out), &TiFiles, &opts).unwrap())
    });
}

fn bench_extract(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let opts = TigOptions::default().with_staging_dir(dir.path());
    let out = dir.path().join("bench.tig");
    sample_group().save(&out, &TiFiles, &opts).unwrap();

    c.bench_function("extract_32_regular_1_flash", |b| {
        b.iter(|| {
            let group: Container = Container::open(black_box(&out), &TiFiles, &opts).unwrap();
            group.destroy(&TiFiles);
        })
    });
}

criterion_group!(benches, bench_assemble, bench_extract);
criterion_main!(benches);
