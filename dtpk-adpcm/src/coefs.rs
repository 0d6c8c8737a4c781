//! Coefficient search
//!
//! Finds the 8 predictor coefficient pairs for a whole stream. Every 14-sample
//! block contributes a second-order linear predictor (solved from its
//! autocorrelation); the predictors are then clustered into 8 groups by
//! repeated splitting and refinement, and each group's centroid becomes one
//! coefficient pair in 4.11 fixed point.

use crate::{COEF_COUNT, SAMPLES_PER_FRAME};

type Vec3 = [f64; 3];

/// Samples processed per analysis block
const BLOCK_SAMPLES: usize = 0x3800;

/// Autocorrelation of one block against its two predecessors
///
/// `hist` holds the previous block in `[0..14]` and the current one in `[14..28]`.
fn inner_product_merge(hist: &[i16; SAMPLES_PER_FRAME * 2]) -> Vec3 {
    let mut out = [0.0; 3];
    for (i, v) in out.iter_mut().enumerate() {
        for x in 0..SAMPLES_PER_FRAME {
            let base = SAMPLES_PER_FRAME + x;
            *v -= hist[base - i] as f64 * hist[base] as f64;
        }
    }
    out
}

fn outer_product_merge(hist: &[i16; SAMPLES_PER_FRAME * 2]) -> [Vec3; 3] {
    let mut mtx = [[0.0; 3]; 3];
    for x in 1..=2 {
        for y in 1..=2 {
            for z in 0..SAMPLES_PER_FRAME {
                let base = SAMPLES_PER_FRAME + z;
                mtx[x][y] += hist[base - x] as f64 * hist[base - y] as f64;
            }
        }
    }
    mtx
}

/// LU-decompose the 2x2 system with partial pivoting
///
/// Returns `None` when the system is singular or badly conditioned.
fn analyze_ranges(mtx: &mut [Vec3; 3]) -> Option<[usize; 3]> {
    let mut recips = [0.0; 3];
    let mut idxs = [0usize; 3];

    for x in 1..=2 {
        let val = mtx[x][1].abs().max(mtx[x][2].abs());
        if val < f64::EPSILON {
            return None;
        }
        recips[x] = 1.0 / val;
    }

    let mut max_index = 0;
    for i in 1..=2 {
        for x in 1..i {
            let mut tmp = mtx[x][i];
            for y in 1..x {
                tmp -= mtx[x][y] * mtx[y][i];
            }
            mtx[x][i] = tmp;
        }

        let mut val = 0.0;
        for x in i..=2 {
            let mut tmp = mtx[x][i];
            for y in 1..i {
                tmp -= mtx[x][y] * mtx[y][i];
            }
            mtx[x][i] = tmp;

            let scaled = tmp.abs() * recips[x];
            if scaled >= val {
                val = scaled;
                max_index = x;
            }
        }

        if max_index != i {
            mtx.swap(max_index, i);
            recips[max_index] = recips[i];
        }

        idxs[i] = max_index;

        if mtx[i][i] == 0.0 {
            return None;
        }

        if i != 2 {
            let tmp = 1.0 / mtx[i][i];
            for row in mtx.iter_mut().skip(i + 1) {
                row[i] *= tmp;
            }
        }
    }

    let mut min = 1.0e10;
    let mut max = 0.0;
    for i in 1..=2 {
        let tmp = mtx[i][i].abs();
        if tmp < min {
            min = tmp;
        }
        if tmp > max {
            max = tmp;
        }
    }

    if min / max < 1.0e-10 {
        return None;
    }

    Some(idxs)
}

/// Solve the decomposed system in place
fn bidirectional_filter(mtx: &[Vec3; 3], idxs: &[usize; 3], vec: &mut Vec3) {
    let mut first = 0;
    for i in 1..=2 {
        let index = idxs[i];
        let mut tmp = vec[index];
        vec[index] = vec[i];
        if first != 0 {
            for y in first..i {
                tmp -= vec[y] * mtx[i][y];
            }
        } else if tmp != 0.0 {
            first = i;
        }
        vec[i] = tmp;
    }

    for i in (1..=2).rev() {
        let mut tmp = vec[i];
        for y in i + 1..=2 {
            tmp -= vec[y] * mtx[i][y];
        }
        vec[i] = tmp / mtx[i][i];
    }

    vec[0] = 1.0;
}

/// Convert predictor to reflection form; `false` when it is unstable
fn quadratic_merge(vec: &mut Vec3) -> bool {
    let v2 = vec[2];
    let tmp = 1.0 - v2 * v2;
    if tmp == 0.0 {
        return false;
    }

    let v0 = (vec[0] - v2 * v2) / tmp;
    let v1 = (vec[1] - vec[1] * v2) / tmp;
    vec[0] = v0;
    vec[1] = v1;

    v1.abs() <= 1.0
}

fn finish_record(input: &mut Vec3) -> Vec3 {
    for v in input.iter_mut().skip(1) {
        if *v >= 1.0 {
            *v = 0.9999999999;
        } else if *v <= -1.0 {
            *v = -0.9999999999;
        }
    }
    [1.0, input[2] * input[1] + input[1], input[2]]
}

/// Reflection coefficients to autocorrelation-like vector
fn matrix_filter(src: &Vec3) -> Vec3 {
    let mut mtx = [[0.0; 3]; 3];
    mtx[2][0] = 1.0;
    for i in 1..=2 {
        mtx[2][i] = -src[i];
    }

    for i in (1..=2).rev() {
        let val = 1.0 - mtx[i][i] * mtx[i][i];
        for y in 1..=i {
            mtx[i - 1][y] = (mtx[i][i] * mtx[i][i - y] + mtx[i][y]) / val;
        }
    }

    let mut dst = [1.0, 0.0, 0.0];
    for i in 1..=2 {
        for y in 1..=i {
            dst[i] += mtx[i][y] * dst[i - y];
        }
    }
    dst
}

/// Levinson-Durbin step back to predictor form
fn merge_finish_record(src: &Vec3) -> Vec3 {
    let mut dst = [1.0, 0.0, 0.0];
    let mut tmp = [0.0; 3];
    let mut val = src[0];

    for i in 1..=2 {
        let mut v2 = 0.0;
        for y in 1..i {
            v2 += dst[y] * src[i - y];
        }

        dst[i] = if val > 0.0 { -(v2 + src[i]) / val } else { 0.0 };
        tmp[i] = dst[i];

        for y in 1..i {
            dst[y] += dst[i] * dst[i - y];
        }

        val *= 1.0 - dst[i] * dst[i];
    }

    finish_record(&mut tmp)
}

/// Distance between a candidate centroid and a block's predictor
fn contrast_vectors(a: &Vec3, b: &Vec3) -> f64 {
    let val = (b[2] * b[1] - b[1]) / (1.0 - b[2] * b[2]);
    let val1 = a[0] * a[0] + a[1] * a[1] + a[2] * a[2];
    let val2 = a[0] * a[1] + a[1] * a[2];
    let val3 = a[0] * a[2];
    val1 + 2.0 * val * val2 + 2.0 * (-b[1] * val - b[2]) * val3
}

/// Two rounds of nearest-centroid assignment and centroid update
fn filter_records(best: &mut [Vec3; 8], count: usize, records: &[Vec3]) {
    for _ in 0..2 {
        let mut sums = [[0.0; 3]; 8];
        let mut members = [0usize; 8];

        for record in records {
            let mut index = 0;
            let mut value = 1.0e30;
            for (i, candidate) in best.iter().enumerate().take(count) {
                let dist = contrast_vectors(candidate, record);
                if dist < value {
                    value = dist;
                    index = i;
                }
            }

            members[index] += 1;
            let filtered = matrix_filter(record);
            for (sum, f) in sums[index].iter_mut().zip(filtered) {
                *sum += f;
            }
        }

        for i in 0..count {
            if members[i] > 0 {
                for v in sums[i].iter_mut() {
                    *v /= members[i] as f64;
                }
            }
            best[i] = merge_finish_record(&sums[i]);
        }
    }
}

/// Quantize a predictor term to 4.11 fixed point
fn to_fixed(v: f64) -> i16 {
    let d = -v * 2048.0;
    d.round().clamp(-32768.0, 32767.0) as i16
}

/// Compute the 8 coefficient pairs for a stream
///
/// Returns `[c1_0, c2_0, c1_1, c2_1, ...]`. Streams without any usable block
/// (silence, very short input) yield all-zero coefficients.
pub fn correlate_coefs(samples: &[i16]) -> [i16; COEF_COUNT] {
    let mut records: Vec<Vec3> = Vec::with_capacity(samples.len().div_ceil(SAMPLES_PER_FRAME));
    let mut hist = [0i16; SAMPLES_PER_FRAME * 2];

    for block in samples.chunks(BLOCK_SAMPLES) {
        for frame in block.chunks(SAMPLES_PER_FRAME) {
            hist.copy_within(SAMPLES_PER_FRAME.., 0);
            for (i, slot) in hist[SAMPLES_PER_FRAME..].iter_mut().enumerate() {
                *slot = frame.get(i).copied().unwrap_or(0);
            }

            let mut vec = inner_product_merge(&hist);
            if vec[0].abs() <= 10.0 {
                continue;
            }

            let mut mtx = outer_product_merge(&hist);
            let Some(idxs) = analyze_ranges(&mut mtx) else {
                continue;
            };

            bidirectional_filter(&mtx, &idxs, &mut vec);
            if quadratic_merge(&mut vec) {
                records.push(finish_record(&mut vec));
            }
        }
    }

    if records.is_empty() {
        return [0; COEF_COUNT];
    }

    let mut mean = [1.0, 0.0, 0.0];
    for record in &records {
        let filtered = matrix_filter(record);
        mean[1] += filtered[1];
        mean[2] += filtered[2];
    }
    mean[1] /= records.len() as f64;
    mean[2] /= records.len() as f64;

    let mut best = [[0.0; 3]; 8];
    best[0] = merge_finish_record(&mean);

    // Split every centroid in two, then refine: 1 -> 2 -> 4 -> 8
    let mut count = 1;
    while count < 8 {
        for i in 0..count {
            best[count + i] = [best[i][0], best[i][1] - 0.01, best[i][2]];
        }
        count *= 2;
        filter_records(&mut best, count, &records);
    }

    let mut coefs = [0i16; COEF_COUNT];
    for (pair, vec) in best.iter().enumerate() {
        coefs[pair * 2] = to_fixed(vec[1]);
        coefs[pair * 2 + 1] = to_fixed(vec[2]);
    }
    coefs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_has_zero_coefs() {
        assert_eq!(correlate_coefs(&[0i16; 2000]), [0i16; COEF_COUNT]);
        assert_eq!(correlate_coefs(&[]), [0i16; COEF_COUNT]);
    }

    #[test]
    fn test_sine_predictor() {
        // A sampled sine obeys x[n] = 2cos(w) x[n-1] - x[n-2]
        let w = std::f64::consts::TAU * 440.0 / 44100.0;
        let samples: Vec<i16> = (0..4410)
            .map(|i| ((i as f64 * w).sin() * 12000.0) as i16)
            .collect();

        let coefs = correlate_coefs(&samples);
        let expected_c1 = (2.0 * w.cos() * 2048.0) as i32;

        assert!(
            (coefs[0] as i32 - expected_c1).abs() < 64,
            "c1 = {}, expected about {}",
            coefs[0],
            expected_c1
        );
        assert!(
            (coefs[1] as i32 + 2048).abs() < 64,
            "c2 = {}, expected about -2048",
            coefs[1]
        );
    }

    #[test]
    fn test_matrix_filter_identity() {
        assert_eq!(matrix_filter(&[1.0, 0.0, 0.0]), [1.0, 0.0, 0.0]);
    }
}
