use cardex::extract::gameprices::{GamePricesExtractor, SceDocument};
use cardex::extract::Extractor;
use cardex::model::TIMESTAMP_FORMAT;
use cardex::store::update;
use chrono::NaiveDateTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Inventory page shaped like the live one: price blob, stock list, option list.
fn synthetic_page(games: usize, price_offset: i64) -> String {
    let blob: Vec<String> = (0..games)
        .map(|i| format!("\"{}\":[{},{}]", 10_000 + i, (i as i64 % 97) + price_offset, 5 + i % 10))
        .collect();
    let options: String = (0..games)
        .map(|i| format!("<option value=\"appid-{}\">Game number {i} &amp; friends</option>\n", 10_000 + i))
        .collect();

    format!(
        "<html><head><script>\nvar gameprices = {{{}}};\nvar stocklist = {{}};\n</script></head>\n<body><select>\n{options}</select></body></html>",
        blob.join(",")
    )
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_page");

    for games in [100, 1_000, 10_000] {
        let page = synthetic_page(games, 1);
        group.bench_with_input(BenchmarkId::from_parameter(games), &page, |b, page| {
            b.iter(|| GamePricesExtractor.extract(black_box(page)))
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let doc = SceDocument::parse(&synthetic_page(10_000, 1));

    c.bench_function("lookup_by_name", |b| {
        b.iter(|| doc.price(black_box("Game number 9999 & friends")))
    });
}

fn bench_update(c: &mut Criterion) {
    let now = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", TIMESTAMP_FORMAT).unwrap();
    let old = GamePricesExtractor.extract(&synthetic_page(10_000, 1)).snapshot;
    let new = GamePricesExtractor.extract(&synthetic_page(10_000, 2)).snapshot;
    let existing = update::compute("prices", &old, None, now).map(|r| r.record);

    c.bench_function("compute_update_10k", |b| {
        b.iter(|| update::compute("prices", black_box(&new), existing.as_ref(), now))
    });
}

criterion_group!(benches, bench_extract, bench_lookup, bench_update);
criterion_main!(benches);
