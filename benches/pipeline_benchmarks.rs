use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use casegen_domain::{Feature, PipelineStore, TestCase};
use casegen_generation::{GenerationOptions, QualityEvaluator};
use casegen_integration_tests::{seeded_pipeline, MEMORY_REQUIREMENT, MULTI_FEATURE_REQUIREMENT};
use casegen_parser::{ParameterExtractor, SentenceSplitter, Taxonomy};

// ============================================================================
// Extraction: splitting and regex passes over raw text
// ============================================================================

fn benchmark_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let taxonomy = Taxonomy::default();
    let splitter = SentenceSplitter::new();
    let extractor = ParameterExtractor::new(&taxonomy.units, &taxonomy.time_units)
        .unwrap_or_else(|e| panic!("extractor setup failed: {}", e));

    group.bench_function("split_sentences", |b| {
        b.iter(|| black_box(splitter.split(black_box(MULTI_FEATURE_REQUIREMENT))))
    });
    group.bench_function("extract_parameters", |b| {
        b.iter(|| black_box(extractor.extract(black_box(MULTI_FEATURE_REQUIREMENT))))
    });
    group.finish();
}

// ============================================================================
// Workflow: parse → generate → evaluate through the in-memory store
// ============================================================================

fn benchmark_workflow(c: &mut Criterion) {
    let mut group = c.benchmark_group("workflow");

    for (name, content) in [
        ("single_feature", MEMORY_REQUIREMENT),
        ("multi_feature", MULTI_FEATURE_REQUIREMENT),
    ] {
        let (_, orchestrator, requirement_id) =
            seeded_pipeline(content).unwrap_or_else(|e| panic!("pipeline setup failed: {}", e));

        group.bench_with_input(BenchmarkId::new("parse", name), &requirement_id, |b, id| {
            b.iter(|| black_box(orchestrator.parse_requirement(*id)))
        });
        group.bench_with_input(BenchmarkId::new("full", name), &requirement_id, |b, id| {
            b.iter(|| black_box(orchestrator.run_full_workflow(*id)))
        });
    }
    group.finish();
}

// ============================================================================
// Scoring: parallel batch evaluation
// ============================================================================

fn benchmark_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    let evaluator = QualityEvaluator::new();

    let (store, orchestrator, requirement_id) = seeded_pipeline(MULTI_FEATURE_REQUIREMENT)
        .unwrap_or_else(|e| panic!("pipeline setup failed: {}", e));
    let options = GenerationOptions::with_test_types(["performance", "security"]);
    for _ in 0..8 {
        orchestrator
            .parse_requirement(requirement_id)
            .and_then(|_| orchestrator.generate_test_cases(requirement_id, &options))
            .unwrap_or_else(|e| panic!("generation failed: {}", e));
    }
    let cases: Vec<TestCase> = store
        .list_test_cases(requirement_id)
        .unwrap_or_else(|e| panic!("listing test cases failed: {}", e));

    for size in [1usize, 25, cases.len()] {
        let pairs: Vec<(&TestCase, Option<&Feature>)> =
            cases.iter().take(size).map(|case| (case, None)).collect();
        group.bench_with_input(BenchmarkId::new("evaluate_batch", size), &pairs, |b, pairs| {
            b.iter(|| black_box(evaluator.evaluate_batch(pairs)))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_extraction, benchmark_workflow, benchmark_scoring);
criterion_main!(benches);

