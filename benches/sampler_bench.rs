use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hostpulse::system::delta::SystemCpuTimes;
use hostpulse::system::mock::{MockProcess, MockSystem};
use hostpulse::system::sampler::{Sampler, sort_processes};
use hostpulse::system::{ProcessSample, Snapshot};
use hostpulse::ui::process_table;
use hostpulse::ui::theme::Theme;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use std::hint::black_box;

fn make_system(n: usize) -> MockSystem {
    let os = MockSystem::new();
    os.set_memory(16 << 30, 6 << 30);
    os.set_system_times(SystemCpuTimes {
        idle: 5_000,
        kernel: 6_000,
        user: 4_000,
    });
    for i in 0..n {
        let pid = i as u32 + 1;
        os.upsert_process(
            pid,
            MockProcess::new(&format!("proc_{i}"), ((i * 7919) % n) as u64 * 4096)
                .with_times(i as u64, (i * 3) as u64)
                .with_thread(pid * 100, 1, 1),
        );
    }
    os
}

fn make_samples(n: usize) -> Vec<ProcessSample> {
    (0..n)
        .map(|i| ProcessSample {
            pid: i as u32 + 1,
            name: format!("proc_{i}"),
            memory_bytes: ((i * 7919) % n) as u64 * 4096,
            cpu_percent: (i % 100) as f64,
        })
        .collect()
}

fn bench_sampler_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler_pass_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let os = make_system(size);
        let mut sampler = Sampler::new(os);
        sampler.sample(1);
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                let snapshot: Snapshot = sampler.sample(black_box(1));
                black_box(snapshot);
            })
        });
    }

    group.finish();
}

fn bench_sort_processes(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_processes_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let samples = make_samples(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &samples, |b, samples| {
            b.iter(|| {
                let mut sorted = black_box(samples.clone());
                sort_processes(&mut sorted);
                black_box(sorted);
            })
        });
    }

    group.finish();
}

fn bench_process_table_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_table_render_500_1000_2000");
    let theme = Theme::dark();

    for size in [500usize, 1000, 2000] {
        let mut samples = make_samples(size);
        sort_processes(&mut samples);

        group.bench_with_input(BenchmarkId::from_parameter(size), &samples, |b, samples| {
            b.iter(|| {
                let backend = TestBackend::new(160, 50);
                let mut terminal = Terminal::new(backend).expect("bench terminal init failed");
                terminal
                    .draw(|frame| {
                        process_table::render(
                            frame,
                            Rect::new(0, 0, 160, 50),
                            black_box(samples),
                            size / 2,
                            Some(1),
                            &theme,
                        );
                    })
                    .expect("bench draw failed");
                black_box(terminal.backend());
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sampler_pass,
    bench_sort_processes,
    bench_process_table_render
);
criterion_main!(benches);
