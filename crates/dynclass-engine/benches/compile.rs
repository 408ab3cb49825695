use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dynclass_engine::{AttributeDescriptor, Builder, PropertyDescriptor, Schema, TypeRef};

fn schema(properties: usize, with_attributes: bool) -> Schema {
    (0..properties)
        .map(|i| {
            let descriptor = PropertyDescriptor::new(format!("P{}", i), TypeRef::I64).with_value(i as i64);
            if with_attributes {
                descriptor.with_attribute(AttributeDescriptor::new("Display").with_value("order", i as i32))
            } else {
                descriptor
            }
        })
        .collect()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for size in [4, 32, 256] {
        let plain = schema(size, false);
        group.bench_with_input(BenchmarkId::new("plain", size), &plain, |b, schema| {
            b.iter(|| {
                let mut builder = Builder::from_schema(black_box(schema.clone()));
                builder.compile().unwrap()
            });
        });

        let annotated = schema(size, true);
        group.bench_with_input(BenchmarkId::new("annotated", size), &annotated, |b, schema| {
            b.iter(|| {
                let mut builder = Builder::from_schema(black_box(schema.clone()));
                builder.compile().unwrap()
            });
        });
    }

    group.finish();
}

fn bench_populate(c: &mut Criterion) {
    let schema = schema(32, false);
    let mut builder = Builder::from_schema(schema.clone());
    builder.compile().unwrap();

    c.bench_function("populate_32", |b| {
        b.iter(|| builder.create_instance(Some(black_box(&schema)), true).unwrap());
    });
}

criterion_group!(benches, bench_compile, bench_populate);
criterion_main!(benches);
