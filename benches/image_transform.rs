use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{ImageFormat, RgbaImage};
use kitsune::image_optimizer::{
    CompositeParams, ImageProcessor, OutputFormat, RasterProcessor, TransformParams,
};
use std::io::Cursor;

fn create_bench_image(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = image::Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255]);
    }
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

fn params(width: u32, height: u32, crop: bool, smart_crop: bool, format: OutputFormat) -> TransformParams {
    TransformParams {
        width,
        height,
        quality: 80,
        crop,
        smart_crop,
        format,
    }
}

fn bench_transform(c: &mut Criterion) {
    let processor = RasterProcessor::default();
    let input = create_bench_image(1920, 1080);

    let mut group = c.benchmark_group("image_transform");
    group.sample_size(10); // Image ops are slow, reduce sample size

    group.bench_function("1080p_to_thumbnail_center_crop_jpeg", |b| {
        let p = params(200, 200, true, false, OutputFormat::Jpeg);
        b.iter(|| processor.transform(black_box(&input), black_box(&p)).unwrap())
    });

    group.bench_function("1080p_to_thumbnail_smart_crop_jpeg", |b| {
        let p = params(200, 200, true, true, OutputFormat::Jpeg);
        b.iter(|| processor.transform(black_box(&input), black_box(&p)).unwrap())
    });

    group.bench_function("1080p_to_800w_webp", |b| {
        let p = params(800, 0, true, false, OutputFormat::WebP);
        b.iter(|| processor.transform(black_box(&input), black_box(&p)).unwrap())
    });

    group.bench_function("1080p_to_400w_avif", |b| {
        let p = params(400, 0, true, false, OutputFormat::Avif);
        b.iter(|| processor.transform(black_box(&input), black_box(&p)).unwrap())
    });

    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let processor = RasterProcessor::default();
    let base = create_bench_image(800, 600);
    let mark = create_bench_image(160, 80);
    let p = CompositeParams {
        top: 500,
        left: 320,
        opacity: 0.5,
        format: OutputFormat::Jpeg,
        quality: 80,
    };

    c.bench_function("composite_800x600_watermark", |b| {
        b.iter(|| processor.composite(black_box(&base), black_box(&mark), black_box(&p)).unwrap())
    });
}

criterion_group!(benches, bench_transform, bench_composite);
criterion_main!(benches);
