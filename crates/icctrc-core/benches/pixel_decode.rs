//! Pixel decode benchmarks: uniform vs. non-uniform Matrix/TRC channel
//! dispatch, and closed-form vs. rasterised parametric curve evaluation.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use icctrc_core::profile::RasterOptions;
use icctrc_core::Profile;

fn s15_16(v: f64) -> [u8; 4] {
    ((v * 65536.0).round() as i32).to_be_bytes()
}

fn xyz_tag(x: f64, y: f64, z: f64) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(b"XYZ ");
    v.extend_from_slice(&[0; 4]);
    v.extend_from_slice(&s15_16(x));
    v.extend_from_slice(&s15_16(y));
    v.extend_from_slice(&s15_16(z));
    v
}

fn curv_gamma(g: f64) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(b"curv");
    v.extend_from_slice(&[0; 4]);
    v.extend_from_slice(&1u32.to_be_bytes());
    let raw = (g * 256.0).round() as u16;
    v.extend_from_slice(&raw.to_be_bytes());
    v
}

fn para_tag(func_type: u16, params: &[f64]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(b"para");
    v.extend_from_slice(&[0; 4]);
    v.extend_from_slice(&func_type.to_be_bytes());
    v.extend_from_slice(&[0; 2]);
    for &p in params {
        v.extend_from_slice(&s15_16(p));
    }
    v
}

enum TagSpec {
    Owned([u8; 4], Vec<u8>),
    Alias([u8; 4], [u8; 4]),
}

fn build_profile(tags: Vec<TagSpec>) -> Vec<u8> {
    let table_start = 132usize;
    let table_size = 12 * tags.len();

    let mut offsets: std::collections::HashMap<[u8; 4], (u32, u32)> = std::collections::HashMap::new();
    let mut data_section = Vec::new();
    let mut cursor = table_start + table_size;

    for tag in &tags {
        if let TagSpec::Owned(sig, bytes) = tag {
            let len = bytes.len();
            offsets.insert(*sig, (cursor as u32, len as u32));
            data_section.extend_from_slice(bytes);
            cursor += len;
            let pad = (4 - (cursor % 4)) % 4;
            data_section.extend(std::iter::repeat(0u8).take(pad));
            cursor += pad;
        }
    }

    let mut entries = Vec::with_capacity(tags.len());
    for tag in &tags {
        match tag {
            TagSpec::Owned(sig, _) => entries.push((*sig, offsets[sig])),
            TagSpec::Alias(sig, target) => entries.push((*sig, offsets[target])),
        }
    }

    let total_size = cursor;
    let mut buf = vec![0u8; total_size];
    buf[0..4].copy_from_slice(&(total_size as u32).to_be_bytes());
    buf[8] = 4;
    buf[9] = 0x30;
    buf[12..16].copy_from_slice(b"mntr");
    buf[16..20].copy_from_slice(b"RGB ");
    buf[20..24].copy_from_slice(b"XYZ ");
    buf[36..40].copy_from_slice(b"acsp");
    buf[68..80].copy_from_slice(&[0x00, 0x00, 0xF6, 0xD6, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0xD3, 0x2D]);
    buf[128..132].copy_from_slice(&(tags.len() as u32).to_be_bytes());

    for (i, (sig, (off, len))) in entries.iter().enumerate() {
        let e = table_start + i * 12;
        buf[e..e + 4].copy_from_slice(sig);
        buf[e + 4..e + 8].copy_from_slice(&off.to_be_bytes());
        buf[e + 8..e + 12].copy_from_slice(&len.to_be_bytes());
    }

    buf[table_start + table_size..total_size].copy_from_slice(&data_section);
    buf
}

fn uniform_profile() -> Vec<u8> {
    build_profile(vec![
        TagSpec::Owned(*b"rXYZ", xyz_tag(0.4360, 0.2225, 0.0139)),
        TagSpec::Owned(*b"gXYZ", xyz_tag(0.3851, 0.7169, 0.0971)),
        TagSpec::Owned(*b"bXYZ", xyz_tag(0.1431, 0.0606, 0.7139)),
        TagSpec::Owned(*b"wtpt", xyz_tag(0.9642, 1.0, 0.8249)),
        TagSpec::Owned(*b"rTRC", curv_gamma(2.2)),
        TagSpec::Alias(*b"gTRC", *b"rTRC"),
        TagSpec::Alias(*b"bTRC", *b"rTRC"),
    ])
}

fn non_uniform_profile() -> Vec<u8> {
    build_profile(vec![
        TagSpec::Owned(*b"rXYZ", xyz_tag(0.4360, 0.2225, 0.0139)),
        TagSpec::Owned(*b"gXYZ", xyz_tag(0.3851, 0.7169, 0.0971)),
        TagSpec::Owned(*b"bXYZ", xyz_tag(0.1431, 0.0606, 0.7139)),
        TagSpec::Owned(*b"wtpt", xyz_tag(0.9642, 1.0, 0.8249)),
        TagSpec::Owned(*b"rTRC", curv_gamma(2.19921875)),
        TagSpec::Owned(*b"gTRC", curv_gamma(2.2)),
        TagSpec::Owned(*b"bTRC", curv_gamma(2.21)),
    ])
}

fn parametric_profile(rasterize: bool) -> Profile {
    let buf = build_profile(vec![
        TagSpec::Owned(*b"rXYZ", xyz_tag(0.4360, 0.2225, 0.0139)),
        TagSpec::Owned(*b"gXYZ", xyz_tag(0.3851, 0.7169, 0.0971)),
        TagSpec::Owned(*b"bXYZ", xyz_tag(0.1431, 0.0606, 0.7139)),
        TagSpec::Owned(*b"wtpt", xyz_tag(0.9642, 1.0, 0.8249)),
        TagSpec::Owned(*b"rTRC", para_tag(3, &[2.4, 1.0 / 1.055, 0.055 / 1.055, 1.0 / 12.92, 0.04045])),
        TagSpec::Alias(*b"gTRC", *b"rTRC"),
        TagSpec::Alias(*b"bTRC", *b"rTRC"),
    ]);
    let opts = RasterOptions {
        rasterize_parametric: rasterize,
        ..RasterOptions::default()
    };
    Profile::open_with_options(&buf, &opts).expect("valid profile")
}

fn generate_pixels(count: usize) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            [t, (t * 1.5) % 1.0, (t * 2.5) % 1.0]
        })
        .collect()
}

fn bench_uniform_vs_non_uniform(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_trc_dispatch");

    let uniform = Profile::open(&uniform_profile()).expect("valid profile");
    let non_uniform = Profile::open(&non_uniform_profile()).expect("valid profile");

    for size in [100, 1_000, 10_000].iter() {
        let pixels = generate_pixels(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("uniform", size), size, |b, _| {
            b.iter(|| uniform.decode(black_box(&pixels)))
        });

        group.bench_with_input(BenchmarkId::new("non_uniform", size), size, |b, _| {
            b.iter(|| non_uniform.decode(black_box(&pixels)))
        });
    }

    group.finish();
}

fn bench_closed_form_vs_rasterized(c: &mut Criterion) {
    let mut group = c.benchmark_group("parametric_evaluation");

    let closed_form = parametric_profile(false);
    let rasterized = parametric_profile(true);

    for size in [100, 1_000, 10_000].iter() {
        let pixels = generate_pixels(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("closed_form", size), size, |b, _| {
            b.iter(|| closed_form.decode(black_box(&pixels)))
        });

        group.bench_with_input(BenchmarkId::new("rasterized", size), size, |b, _| {
            b.iter(|| rasterized.decode(black_box(&pixels)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_uniform_vs_non_uniform, bench_closed_form_vs_rasterized);
criterion_main!(benches);
