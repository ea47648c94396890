use criterion::{criterion_group, criterion_main, Criterion};
use lint_matrix::config::{ExtraStep, Isolation, LintMatrix};
use lint_matrix::core::planner::{expand_matrix, plan_execution};
use lint_matrix::core::steps::{build_steps, CHECKOUT_STEP};
use lint_matrix::execution::{run_job, JobSettings};
use lint_matrix::models::{JobInstance, Step};
use std::hint::black_box;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

fn wide_matrix() -> LintMatrix {
    let mut matrix = LintMatrix::default();
    matrix.matrix.versions = (0..64).map(|minor| format!("3.{minor}")).collect();
    matrix
}

fn bench_planning(c: &mut Criterion) {
    let matrix = wide_matrix();

    c.bench_function("expand_matrix", |b| {
        b.iter(|| expand_matrix(black_box(&matrix.matrix.versions)))
    });

    c.bench_function("plan_execution_sharded", |b| {
        b.iter(|| plan_execution(black_box(&matrix), &[], Some(4), Some(1)).unwrap())
    });
}

fn bench_run_job(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let project = tempfile::tempdir().unwrap();
    std::fs::write(project.path().join("app.py"), "print('bench')\n").unwrap();

    let mut matrix = LintMatrix::default();
    matrix.environment.isolation = Isolation::None;
    matrix.extra_steps.push(ExtraStep {
        name: "echo".to_string(),
        run: "echo bench $MATRIX_VERSION".to_string(),
    });
    // Checkout plus the shell step; nothing that needs a real interpreter.
    let steps: Vec<Step> = build_steps(&matrix)
        .into_iter()
        .filter(|step| step.name == CHECKOUT_STEP || step.name == "echo")
        .collect();
    let settings = JobSettings::from_config(&matrix, project.path().to_path_buf());

    c.bench_function("run_job_checkout_and_shell", |b| {
        b.to_async(&rt).iter(|| async {
            let _ = run_job(
                JobInstance::new(0, "3.12"),
                &steps,
                &settings,
                &CancellationToken::new(),
            )
            .await;
        });
    });
}

criterion_group!(benches, bench_planning, bench_run_job);
criterion_main!(benches);
