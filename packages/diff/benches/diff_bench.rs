use blocksmith_diff::calculate_diff;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn section(lines: usize, edit_every: usize) -> String {
    (0..lines)
        .map(|i| {
            if edit_every > 0 && i % edit_every == 0 {
                format!("  <p class=\"edited\">{{{{ block.settings.text_{} }}}}</p>", i)
            } else {
                format!("  <p>{{{{ block.settings.text_{} }}}}</p>", i)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn diff_small_edit(c: &mut Criterion) {
    let old = section(200, 0);
    let new = section(200, 50);

    c.bench_function("diff_small_edit", |b| {
        b.iter(|| calculate_diff(black_box(&old), black_box(&new)))
    });
}

fn diff_at_ceiling(c: &mut Criterion) {
    let old = section(1000, 0);
    let new = section(1000, 7);

    c.bench_function("diff_at_ceiling", |b| {
        b.iter(|| calculate_diff(black_box(&old), black_box(&new)))
    });
}

criterion_group!(benches, diff_small_edit, diff_at_ceiling);
criterion_main!(benches);
