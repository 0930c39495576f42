//! Benchmarks for the fallback builders and an offline pipeline run.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use contentflow::pipeline::Pipeline;
use contentflow::providers::DisabledGenerator;
use contentflow::stages::{ContentStage, ComparisonStage, PageContentStage, QuestionStage};
use contentflow::testing::{offline_config, sample_product, sample_raw_record};
use contentflow::validators::ValidationRules;

fn fallback_benchmark(c: &mut Criterion) {
    let product = Arc::new(sample_product());
    let rules = ValidationRules::default();
    let questions = QuestionStage::new(Arc::new(DisabledGenerator), rules.questions.clone());
    let comparison = ComparisonStage::new(Arc::new(DisabledGenerator), rules.comparison.clone());
    let page = PageContentStage::new(Arc::new(DisabledGenerator), rules.page_content.clone());

    c.bench_function("question_fallback", |b| {
        b.iter(|| questions.fallback(black_box(&product)))
    });
    c.bench_function("comparison_fallback", |b| {
        b.iter(|| comparison.fallback(black_box(&product)))
    });
    c.bench_function("page_content_fallback", |b| {
        b.iter(|| page.fallback(black_box(&product)))
    });
}

fn pipeline_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("tokio runtime");
    let pipeline = Pipeline::new(Arc::new(DisabledGenerator), offline_config());
    let raw = sample_raw_record();

    c.bench_function("offline_run", |b| {
        b.iter(|| runtime.block_on(pipeline.run(black_box(&raw))))
    });
}

criterion_group!(benches, fallback_benchmark, pipeline_benchmark);
criterion_main!(benches);
