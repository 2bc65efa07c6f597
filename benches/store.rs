// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use tracetail::ops::{ApplyResult, PatchMode};
use tracetail::store::CallTree;

mod fixtures;
mod profiler;

use fixtures::Case;

fn checksum_apply_result(result: &ApplyResult) -> u64 {
    let mut acc = 0u64;
    acc = acc.wrapping_mul(131).wrapping_add(result.new_rev);
    acc = acc.wrapping_mul(131).wrapping_add(result.applied as u64);
    acc = acc.wrapping_mul(131).wrapping_add(result.rejected.len() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(result.delta.added.len() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(result.delta.updated.len() as u64);
    acc
}

// Benchmark identity (keep stable):
// - Group name in this file: `store.apply_records`
// - Case IDs (`small`, `medium`, `deep_long_args`, `medium_per_line`) must stay stable so
//   results remain comparable over time.
fn benches_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store.apply_records");

    for (case_id, case) in
        [("small", Case::Small), ("medium", Case::Medium), ("deep_long_args", Case::DeepLongArgs)]
    {
        let records = fixtures::records(case);
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_function(case_id, |b| {
            b.iter_batched(
                || (CallTree::new(fixtures::trace_id().root_call_id()), records.clone()),
                |(mut tree, records)| {
                    let result = tree.apply_records(black_box(records), PatchMode::Tolerant);
                    black_box(checksum_apply_result(&result))
                },
                BatchSize::LargeInput,
            )
        });
    }

    // One batch per line, as when the poller trickles a live trace.
    let records = fixtures::records(Case::Medium);
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("medium_per_line", |b| {
        b.iter_batched(
            || (CallTree::new(fixtures::trace_id().root_call_id()), records.clone()),
            |(mut tree, records)| {
                let mut acc = 0u64;
                for record in records {
                    let result = tree.apply_records([record], PatchMode::Strict);
                    acc = acc.wrapping_mul(131).wrapping_add(checksum_apply_result(&result));
                }
                black_box(acc)
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_store
}
criterion_main!(benches);
