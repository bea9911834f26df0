use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use helioclim_converter::models::{IrradiationRow, IrradiationTable, Place};
use helioclim_converter::processors::SeriesBuilder;
use helioclim_converter::readers::HelioClimReader;
use helioclim_converter::writers::SeriesWriter;
use std::path::{Path, PathBuf};

// One year of 15-minute samples is 35,040 rows
fn create_export(years: &[i32]) -> String {
    let mut content = String::new();
    for i in 0..25 {
        content.push_str(&format!("# header {}\n", i));
    }
    for &year in years {
        for i in 0..35_040 {
            let value = ((i % 96) as f64 - 30.0) * 4.5;
            content.push_str(&format!(
                "{};01;01;{:02};{:02};{:.2}\n",
                year,
                (i / 4) % 24,
                (i % 4) * 15,
                value
            ));
        }
    }
    content
}

fn create_table(years: &[i32]) -> IrradiationTable {
    let rows = years
        .iter()
        .flat_map(|&year| {
            (0..35_040).map(move |i| IrradiationRow::new(f64::from(year), (i % 96) as f64 - 30.0))
        })
        .collect();
    IrradiationTable::new(PathBuf::from("bench.csv"), rows)
}

fn benchmark_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("helioclim_reader");
    let reader = HelioClimReader::new();

    for years in [1usize, 2, 4] {
        let selected: Vec<i32> = (2004..2004 + years as i32).collect();
        let content = create_export(&selected);

        group.bench_with_input(BenchmarkId::new("parse", years), &content, |b, content| {
            b.iter(|| {
                reader
                    .parse_str(Path::new("bench.csv"), black_box(content))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn benchmark_series(c: &mut Criterion) {
    let table = create_table(&[2004, 2005]);
    let place = Place::new("oxford").unwrap();
    let builder = SeriesBuilder::new();
    let writer = SeriesWriter::new();

    c.bench_function("build_series", |b| {
        b.iter(|| builder.build(&place, black_box(&table), 2005))
    });

    let series = builder.build(&place, &table, 2005);
    c.bench_function("render_fixed", |b| b.iter(|| writer.render(black_box(&series))));

    let scientific = SeriesWriter::scientific();
    c.bench_function("render_scientific", |b| {
        b.iter(|| scientific.render(black_box(&series)))
    });
}

criterion_group!(benches, benchmark_reader, benchmark_series);
criterion_main!(benches);
