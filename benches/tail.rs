// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use tracetail::ops::PatchMode;
use tracetail::session::TraceSession;
use tracetail::tail::lines::{complete_prefix, decode_lines};
use tracetail::tail::{MemoryLogSource, TailConfig, TailPoller};

mod fixtures;
mod profiler;

use fixtures::Case;

// Benchmark identity (keep stable):
// - Group names in this file: `tail.lines`, `tail.catch_up`
// - Case IDs must stay stable so results remain comparable over time.
fn benches_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("tail.lines");

    for (case_id, case) in [("medium", Case::Medium), ("deep_long_args", Case::DeepLongArgs)] {
        let log = fixtures::log_bytes(case);
        // Cut mid-line so framing has a partial tail to leave behind.
        let chunk = &log[..log.len() - 7];
        group.throughput(Throughput::Bytes(chunk.len() as u64));
        group.bench_function(case_id, |b| {
            b.iter(|| {
                let consumed = complete_prefix(black_box(chunk));
                let records = decode_lines(&chunk[..consumed], 0).expect("decode fixture lines");
                black_box((consumed, records.len()))
            })
        });
    }
    group.finish();
}

fn benches_catch_up(c: &mut Criterion) {
    let mut group = c.benchmark_group("tail.catch_up");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");

    let windows = [("medium_default_window", 1_000_000), ("medium_4k_window", 4_096)];
    for (case_id, max_chunk_bytes) in windows {
        let log = fixtures::log_bytes(Case::Medium);
        let config = TailConfig { max_chunk_bytes, ..TailConfig::default() };
        group.throughput(Throughput::Bytes(log.len() as u64));
        group.bench_function(case_id, |b| {
            b.iter_batched(
                || {
                    let session = TraceSession::new(fixtures::trace_id(), PatchMode::Tolerant);
                    (session, MemoryLogSource::from_bytes(log.clone()))
                },
                |(mut session, source)| {
                    runtime.block_on(async {
                        let mut poller = TailPoller::new(source, config);
                        poller.catch_up(&mut session).await.expect("catch up");
                        black_box((poller.offset(), session.tree().len()))
                    })
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_lines, benches_catch_up
}
criterion_main!(benches);
