use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use std::time::Instant;

use vecmat_core::config::VECTOR_MAX_ELEMENTS;
use vecmat_core::{axpy, Vector};

use super::config::BenchConfig;
use super::report::Timing;
use super::repeat_count;

const SUITE: &str = "vector";

fn random_data(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Time every vector operation family over `config.vector_len` elements.
pub fn run_vector_bench(config: &BenchConfig) -> Result<Vec<Timing>> {
    let n = config.vector_len;
    let iters = config.iterations;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut timings = Vec::with_capacity(7);
    let mut checksum = 0.0f64;

    log::info!("[vecmat::bench] vector suite: {} elements, {} iterations", n, iters);

    // Allocation and fill
    let start = Instant::now();
    let mut v1 = Vector::alloc(n)?;
    let mut v2 = Vector::alloc(n)?;
    for i in 0..iters {
        v1.fill(10.0 + (i % 2) as f64)?;
        v2.fill(20.0 - (i % 2) as f64)?;
        let z = Vector::zeros(n)?;
        let o = Vector::ones(n)?;
        checksum += z[0] + o[0];
    }
    let raw = random_data(&mut rng, n);
    let from_raw = Vector::from_array(&raw)?;
    checksum += from_raw[n - 1];
    v1.copy_from(&from_raw)?;
    v2.copy_from(&Vector::from_array(&random_data(&mut rng, n))?)?;
    timings.push(Timing::new(SUITE, "init_alloc_fill", iters, start.elapsed()));

    // Element access and metadata
    let start = Instant::now();
    let access_iters = repeat_count(iters, 1000)?;
    for i in 0..access_iters {
        let idx = i % n;
        v1.set(idx, i as f64)?;
        checksum += v1.get(idx)?;
        checksum += v2.len() as f64;
        checksum += black_box(v2.as_slice())[0];
    }
    v1.copy_from(&from_raw)?;
    timings.push(Timing::new(SUITE, "get_set_meta", access_iters, start.elapsed()));

    // In-place arithmetic
    let start = Instant::now();
    for _ in 0..iters {
        v1.add_inplace(&v2)?;
        v1.subtract_inplace(&v2)?;
        v1.scale_inplace(1.00001);
        v2.scale_inplace(0.99999);
        axpy(0.1, &v1, &mut v2)?;
        checksum += v1[0] + v2[0];
    }
    timings.push(Timing::new(SUITE, "arith_inplace", iters, start.elapsed()));

    // Allocating arithmetic
    let start = Instant::now();
    let mut out = Vector::alloc(n)?;
    for _ in 0..iters {
        let a = v1.add(&v2)?;
        let b = v1.subtract(&v2)?;
        let c = v1.scale(1.1)?;
        let d = v1.hadamard(&v2)?;
        let e = v1.negated()?;
        v1.add_into(&v2, &mut out)?;
        checksum += a[0] + b[0] + c[0] + d[0] + e[0] + out[0];
    }
    timings.push(Timing::new(SUITE, "arith_new", iters, start.elapsed()));

    // Geometry and statistics
    let start = Instant::now();
    for _ in 0..iters {
        checksum += v1.dot(&v2)?;
        checksum += v1.norm();
        checksum += v1.distance(&v2)?;
        checksum += v1.distance_squared(&v2)?;
        checksum += v1.sum()?;
        checksum += v1.min()?;
        checksum += v1.max()?;
        checksum += v1.angle(&v2)?;
    }
    timings.push(Timing::new(SUITE, "geom_stats", iters, start.elapsed()));

    // Transformations
    let start = Instant::now();
    for _ in 0..iters {
        v1.normalize()?;
        let normalized = v2.normalized()?;
        let mapped = v1.map(|x| x.abs().sqrt())?;
        let projected = v1.project(&v2)?;
        let dup = v1.try_clone()?;
        checksum += normalized[0] + mapped[0] + projected[0] + dup[0];
    }
    timings.push(Timing::new(SUITE, "transformations", iters, start.elapsed()));

    // Equality, swap, resize and cross products
    let start = Instant::now();
    let grown = n.saturating_add(10).min(VECTOR_MAX_ELEMENTS);
    for _ in 0..iters {
        checksum += f64::from(u8::from(v1.is_equal(&v2, 1e-6)));
        v1.swap(&mut v2);
        let resized = v1.resized(grown)?;
        v2.resize(grown)?;
        v2.resize(n)?;
        checksum += resized[0];
    }
    let mut c1 = Vector::from_elem(3, 1.0)?;
    let c2 = Vector::from_elem(3, 2.0)?;
    for _ in 0..repeat_count(iters, 10_000)? {
        c1.cross_inplace(&c2)?;
        let cr = c1.cross(&c2)?;
        checksum += cr[0];
    }
    timings.push(Timing::new(SUITE, "logic_resize_cross", iters, start.elapsed()));

    log::debug!("[vecmat::bench] vector checksum: {}", black_box(checksum));
    Ok(timings)
}
