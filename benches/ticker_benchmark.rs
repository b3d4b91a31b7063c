use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use news_ticker::model::NewsRecord;
use news_ticker::ticker::TickerBuffer;

fn record(id: i64) -> NewsRecord {
    NewsRecord {
        key: format!("{id:024x}"),
        id,
        title: format!("Headline {id}"),
        category: "Technology".into(),
        details: "Benchmark story body".into(),
        created_at: Utc.timestamp_millis_opt(1_716_400_000_000 + id).unwrap(),
    }
}

fn bench_ticker_buffer(c: &mut Criterion) {
    let batch: usize = 10_000;
    let records: Vec<NewsRecord> = (0..batch as i64).map(record).collect();

    let mut group = c.benchmark_group("ticker_buffer");
    group.throughput(Throughput::Elements(batch as u64));

    group.bench_function("prepend_with_eviction", |b| {
        b.iter(|| {
            let mut buffer = TickerBuffer::new(8);
            for item in &records {
                buffer.prepend(item.clone());
            }
            assert_eq!(buffer.len(), 8);
        });
    });

    group.bench_function("rotate", |b| {
        let mut buffer = TickerBuffer::new(8);
        for item in records.iter().take(8) {
            buffer.prepend(item.clone());
        }
        b.iter(|| {
            for _ in 0..batch {
                let _ = buffer.rotate();
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_ticker_buffer);
criterion_main!(benches);
