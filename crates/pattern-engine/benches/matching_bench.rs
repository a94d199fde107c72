//! 앵커 매칭 벤치마크
//!
//! 많은 파일과 많은 디스크립터에 대한 앵커 매칭, 흡수 적용 성능을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use compscan_core::types::ScannedFile;
use compscan_core::{ScanContext, WILDCARD_CHECKSUM};
use compscan_pattern_engine::ComponentPatternDescriptor;
use compscan_pattern_engine::matching::{
    ApplyOptions, ExpansionLedger, apply_matches, match_all,
};

/// `node_modules` 트리 형태의 스캔 파일 생성 (패키지당 파일 5개)
fn generate_files(packages: usize) -> Vec<ScannedFile> {
    let mut files = Vec::with_capacity(packages * 5);
    for i in 0..packages {
        let dir = format!("app/node_modules/pkg-{i}");
        files.push(ScannedFile::new(format!("{dir}/package.json"), format!("h{i}")));
        files.push(ScannedFile::new(format!("{dir}/index.js"), format!("i{i}")));
        files.push(ScannedFile::new(format!("{dir}/lib/util.js"), format!("u{i}")));
        files.push(ScannedFile::new(format!("{dir}/README.md"), format!("r{i}")));
        files.push(ScannedFile::new(format!("{dir}/LICENSE"), format!("l{i}")));
    }
    files
}

fn generate_descriptors(packages: usize) -> Vec<ComponentPatternDescriptor> {
    (0..packages)
        .map(|i| {
            ComponentPatternDescriptor::new(format!("pkg-{i}"), "1.0.0")
                .with_anchor(format!("pkg-{i}/package.json"), format!("h{i}"))
                .with_include(format!("pkg-{i}/**"))
                .with_exclude(format!("pkg-{i}/README.md"))
        })
        .collect()
}

fn bench_anchor_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("anchor_matching");

    for packages in [10usize, 100, 500] {
        let files = generate_files(packages);
        let context = ScanContext::from_scanned_files("/scan", &files);
        let descriptors = generate_descriptors(packages);

        group.throughput(Throughput::Elements((packages * packages * 5) as u64));
        group.bench_with_input(
            BenchmarkId::new("literal_anchor", packages),
            &packages,
            |b, _| b.iter(|| match_all(black_box(&descriptors), &context, false).unwrap()),
        );
    }

    let files = generate_files(500);
    let context = ScanContext::from_scanned_files("/scan", &files);
    let wildcard = ComponentPatternDescriptor::new("any", "1")
        .with_anchor("node_modules/*/package.json", WILDCARD_CHECKSUM);
    group.bench_function("wildcard_anchor_500", |b| {
        b.iter(|| match_all([black_box(&wildcard)], &context, false).unwrap())
    });

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_matches");

    for packages in [10usize, 100] {
        let files = generate_files(packages);
        let base = ScanContext::from_scanned_files("/scan", &files);
        let descriptors = generate_descriptors(packages);

        group.throughput(Throughput::Elements(packages as u64));
        group.bench_with_input(BenchmarkId::new("absorb", packages), &packages, |b, _| {
            b.iter(|| {
                let mut context = base.clone();
                let matches = match_all(&descriptors, &context, false).unwrap();
                apply_matches(
                    &matches,
                    &mut context,
                    ApplyOptions::default(),
                    &mut ExpansionLedger::new(),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_anchor_matching, bench_apply);
criterion_main!(benches);
