use criterion::{criterion_group, criterion_main, Criterion};
use mission_core::{parse_chat_log, parse_content_queue, parse_observations};
use std::hint::black_box;

fn content_queue(items: usize) -> String {
    let mut text = String::new();
    for (index, heading) in ["Drafts", "In Review", "Approved", "Published"].iter().enumerate() {
        text.push_str(&format!("## {heading}\n"));
        for i in 0..items {
            text.push_str(&format!("- [Twitter] Post {index}-{i} about agents #ai #launch\n"));
        }
    }
    text
}

fn chat_log(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            format!(
                "{{\"id\":\"m{i}\",\"role\":\"user\",\"text\":\"message {i}\",\"created_at\":\"2026-01-01T00:00:00Z\",\"channel\":\"discord\"}}\n"
            )
        })
        .collect()
}

fn bench_parsers(c: &mut Criterion) {
    let queue = content_queue(250);
    c.bench_function("parsers/content_queue_1000", |b| {
        b.iter(|| black_box(parse_content_queue(black_box(&queue))).len())
    });

    let observations: String = (0..500)
        .map(|i| format!("- [2026-01-01 10:{:02}] observation {i}\n", i % 60))
        .collect();
    c.bench_function("parsers/observations_500", |b| {
        b.iter(|| black_box(parse_observations(black_box(&observations))).len())
    });

    let transcript = chat_log(1_000);
    c.bench_function("parsers/chat_log_1000", |b| {
        b.iter(|| black_box(parse_chat_log(black_box(&transcript))).len())
    });
}

criterion_group!(benches, bench_parsers);
criterion_main!(benches);
