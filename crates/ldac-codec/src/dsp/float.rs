//! 浮点信号通路.
//!
//! 时域采样以 16 位 PCM 满幅为单位 (1.0 对应 1 LSB), 比例因子索引 `idsf` 对应 `2^(idsf-15)`.
//! 变换沿用定点通路的蝶形网络与常量表, 不做块浮点.

use ldac_core::SampleFormat;

use super::{SignalPath, quant_limit, transform_tables};
use crate::consts::MAXLSU;
use crate::tables::sigproc::{IQF, IRSF, QF, RSF};

const PCM_SCALE: f32 = 32_768.0;
const Q30: f32 = (1u64 << 30) as f32;
const Q31: f32 = (1u64 << 31) as f32;

#[inline]
fn cos_sin(wcos: &[i32], wsin: &[i32], idx: usize) -> (f32, f32) {
    (wcos[idx] as f32 / Q31, wsin[idx] as f32 / Q31)
}

#[inline]
fn scale_factor(idsf: i32) -> f32 {
    2f32.powi(idsf - 15)
}

/// 浮点信号通路
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatPath;

impl SignalPath for FloatPath {
    type Sample = f32;

    const NAME: &'static str = "float";

    fn pcm_to_time(format: SampleFormat, bytes: &[u8]) -> f32 {
        format.read_f32(bytes) * PCM_SCALE
    }

    fn time_to_pcm(format: SampleFormat, sample: f32, out: &mut [u8]) {
        format.write_f32(sample / PCM_SCALE, out);
    }

    fn mdct(time: &[f32], spec: &mut [f32], nlnn: u32) {
        let n = 1usize << nlnn;
        let half = n >> 1;
        let tbl = transform_tables(nlnn);
        let w = |i: usize| tbl.fwin[i] as f32 / Q30;

        let mut fold = [0f32; MAXLSU];
        for i in 0..half {
            fold[half + i] = time[i] * w(i) - time[n - 1 - i] * w(n - 1 - i);
            fold[i] = -time[3 * half - 1 - i] * w(half + i) - time[3 * half + i] * w(half - 1 - i);
        }

        let mut wk = [0f32; MAXLSU];
        let coef = half - 1;
        for i in 0..half {
            let i0 = i << 1;
            let (a, b) = (fold[i0], fold[n - i0 - 1]);
            let (c, s) = cos_sin(tbl.wcos, tbl.wsin, coef + i);
            wk[i0] = a * c + b * s;
            wk[i0 + 1] = a * s - b * c;
        }

        for stage in (0..nlnn - 1).rev() {
            let base = (1usize << stage) - 1;
            let groups = 1usize << (nlnn - 2 - stage);
            let span = 1usize << stage;
            let step = 1usize << (stage + 1);
            let (mut i0, mut i1) = (0usize, step);
            for _ in 0..groups {
                for k in 0..span {
                    let (c, s) = cos_sin(tbl.wcos, tbl.wsin, base + k);
                    let (a0, a1, b0, b1) = (wk[i0], wk[i0 + 1], wk[i1], wk[i1 + 1]);
                    let (d0, d1) = (a0 - b0, a1 - b1);
                    wk[i0] = (a0 + b0) * 0.5;
                    wk[i0 + 1] = (a1 + b1) * 0.5;
                    wk[i1] = (d0 * c + d1 * s) * 0.5;
                    wk[i1 + 1] = (d0 * s - d1 * c) * 0.5;
                    i0 += 2;
                    i1 += 2;
                }
                i0 += step;
                i1 += step;
            }
        }

        for (out, &p) in spec[..n].iter_mut().zip(tbl.perm) {
            *out = wk[p as usize];
        }
    }

    fn imdct(spec: &[f32], time: &mut [f32], nlnn: u32) {
        let n = 1usize << nlnn;
        let half = n >> 1;
        let tbl = transform_tables(nlnn);

        let mut wk = [0f32; MAXLSU];
        for (&v, &p) in spec[..n].iter().zip(tbl.perm) {
            wk[p as usize] = v;
        }

        let mut coef = 0usize;
        for stage in 0..nlnn - 1 {
            let groups = 1usize << (nlnn - 2 - stage);
            let span = 1usize << stage;
            let step = 1usize << (stage + 1);
            let (mut i0, mut i1) = (0usize, step);
            for _ in 0..groups {
                for k in 0..span {
                    let (c, s) = cos_sin(tbl.wcos, tbl.wsin, coef + k);
                    let g2 = (wk[i1] * c + wk[i1 + 1] * s) * 0.5;
                    let g3 = (wk[i1] * s - wk[i1 + 1] * c) * 0.5;
                    let g0 = wk[i0] * 0.5;
                    let g1 = wk[i0 + 1] * 0.5;
                    wk[i0] = g0 + g2;
                    wk[i0 + 1] = g1 + g3;
                    wk[i1] = g0 - g2;
                    wk[i1 + 1] = g1 - g3;
                    i0 += 2;
                    i1 += 2;
                }
                i0 += step;
                i1 += step;
            }
            coef += span;
        }

        let mut rot = [0f32; MAXLSU];
        for i in 0..half {
            let i0 = i << 1;
            let (c, s) = cos_sin(tbl.wcos, tbl.wsin, coef + i);
            rot[i0] = wk[i0] * c + wk[i0 + 1] * s;
            rot[n - i0 - 1] = wk[i0] * s - wk[i0 + 1] * c;
        }

        let gain = (1u32 << (nlnn - 1)) as f32 / Q30;
        let w = |i: usize| tbl.bwin[i] as f32 * gain;
        for i in 0..half {
            time[i] = time[n + i] + rot[half + i] * w(i);
            time[half + i] = time[3 * half + i] - rot[n - 1 - i] * w(half + i);
            time[n + i] = -rot[half - 1 - i] * w(n - 1 - i);
            time[3 * half + i] = -rot[i] * w(half - 1 - i);
        }
    }

    fn scale_factor_index(values: &[f32]) -> i32 {
        let amax = values.iter().fold(0f32, |m, v| m.max(v.abs()));
        (0..31).find(|&i| scale_factor(i) >= amax).unwrap_or(31)
    }

    fn quantize(
        values: &[f32],
        idsf: i32,
        idwl1: i32,
        idwl2: i32,
        qspec: &mut [i32],
        rspec: &mut [i32],
    ) {
        let sf = scale_factor(idsf);
        let qf1 = QF[idwl1 as usize] as f32 / 65_536.0;
        let iqf1 = IQF[idwl1 as usize] as f32 / Q31;
        let lim1 = quant_limit(idwl1);
        let irsf = IRSF[15] as f32 / 32_768.0;
        for ((&x, q_out), r_out) in values.iter().zip(qspec.iter_mut()).zip(rspec.iter_mut()) {
            let xn = x / sf;
            let q = ((xn * qf1 + 0.5).floor() as i32).clamp(-lim1, lim1);
            *q_out = q;
            *r_out = if idwl2 > 0 {
                let err = (xn - q as f32 * iqf1) * irsf;
                let qf2 = QF[idwl2 as usize] as f32 / 65_536.0;
                let lim2 = quant_limit(idwl2);
                ((err * qf2 + 0.5).floor() as i32).clamp(-lim2, lim2)
            } else {
                0
            };
        }
    }

    fn dequantize(
        qspec: &[i32],
        rspec: &[i32],
        idsf: i32,
        idwl1: i32,
        idwl2: i32,
        out: &mut [f32],
    ) {
        let sf = scale_factor(idsf);
        let iqf1 = IQF[idwl1 as usize] as f32 / Q31;
        let rsf = RSF[15] as f32 / Q31;
        for ((&q, &r), y) in qspec.iter().zip(rspec).zip(out.iter_mut()) {
            let mut value = q as f32 * iqf1;
            if idwl2 > 0 {
                value += r as f32 * (IQF[idwl2 as usize] as f32 / Q31) * rsf;
            }
            *y = value * sf;
        }
    }

    fn magnitude(sample: f32) -> f64 {
        f64::from(sample.abs())
    }
}
