//! 定点信号通路.
//!
//! 时域采样为 Q30 满幅 (16 位 PCM 左移 15 位). 变换前按输入最大幅度做块浮点,
//! 把工作数据提升到约 28 位有效位, 变换后再移回. 所有乘法使用舍入右移.

use ldac_core::SampleFormat;
use ldac_core::fixed::{abs_max, bit_length, lsft, mul_lsftrnd, mul_rsftrnd, rsft_ro, sftrnd};

use super::{SignalPath, quant_limit, transform_tables};
use crate::consts::{
    C_BLKFLT, MAXLSU, Q_DEQUANT1, Q_DEQUANT2, Q_DEQUANT3, Q_MDCT_COS, Q_MDCT_WIN, Q_NORM, Q_SETPCM,
};
use crate::tables::sigproc::{IQF, IRSF, QF, RSF, SF};

/// 旋转因子乘法 (含蝶形中的 1/2)
const Q_BUTTERFLY: i32 = Q_MDCT_COS + 1;

/// 定点信号通路
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPath;

impl SignalPath for FixedPath {
    type Sample = i32;

    const NAME: &'static str = "fixed";

    fn pcm_to_time(format: SampleFormat, bytes: &[u8]) -> i32 {
        match format {
            SampleFormat::S16 => lsft(format.read_int(bytes), Q_SETPCM),
            SampleFormat::S24 => lsft(format.read_int(bytes), 7),
            SampleFormat::S32 => format.read_int(bytes) >> 1,
            SampleFormat::F32 => {
                let v = f64::from(format.read_f32(bytes)) * f64::from(1u32 << 30);
                v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
            }
        }
    }

    fn time_to_pcm(format: SampleFormat, sample: i32, out: &mut [u8]) {
        match format {
            SampleFormat::S16 => format.write_int(rsft_ro(sample, Q_SETPCM), out),
            SampleFormat::S24 => format.write_int(rsft_ro(sample, 7), out),
            SampleFormat::S32 => {
                let v = (i64::from(sample) << 1).clamp(i64::from(i32::MIN), i64::from(i32::MAX));
                format.write_int(v as i32, out);
            }
            SampleFormat::F32 => {
                format.write_f32((f64::from(sample) / f64::from(1u32 << 30)) as f32, out);
            }
        }
    }

    fn mdct(time: &[i32], spec: &mut [i32], nlnn: u32) {
        let n = 1usize << nlnn;
        let half = n >> 1;
        let tbl = transform_tables(nlnn);

        let amax = abs_max(&time[..2 * n]);
        if amax == 0 {
            spec[..n].fill(0);
            return;
        }
        let shift = C_BLKFLT - bit_length(amax) as i32 - 1;
        let sh = Q_MDCT_WIN - shift;

        // 加窗折叠
        let mut fold = [0i32; MAXLSU];
        for i in 0..half {
            fold[half + i] = mul_rsftrnd(time[i], tbl.fwin[i], sh)
                .saturating_sub(mul_rsftrnd(time[n - 1 - i], tbl.fwin[n - 1 - i], sh));
            fold[i] = mul_rsftrnd(time[3 * half - 1 - i], tbl.fwin[half + i], sh)
                .saturating_add(mul_rsftrnd(time[3 * half + i], tbl.fwin[half - 1 - i], sh))
                .saturating_neg();
        }

        // 前旋转
        let mut wk = [0i32; MAXLSU];
        let coef = half - 1;
        for i in 0..half {
            let i0 = i << 1;
            let (a, b) = (fold[i0], fold[n - i0 - 1]);
            let (c, s) = (tbl.wcos[coef + i], tbl.wsin[coef + i]);
            wk[i0] = mul_rsftrnd(a, c, Q_MDCT_COS).saturating_add(mul_rsftrnd(b, s, Q_MDCT_COS));
            wk[i0 + 1] =
                mul_rsftrnd(a, s, Q_MDCT_COS).saturating_sub(mul_rsftrnd(b, c, Q_MDCT_COS));
        }

        // 逆序蝶形
        for stage in (0..nlnn - 1).rev() {
            let base = (1usize << stage) - 1;
            let groups = 1usize << (nlnn - 2 - stage);
            let span = 1usize << stage;
            let step = 1usize << (stage + 1);
            let (mut i0, mut i1) = (0usize, step);
            for _ in 0..groups {
                for k in 0..span {
                    let (c, s) = (tbl.wcos[base + k], tbl.wsin[base + k]);
                    let (a0, a1, b0, b1) = (wk[i0], wk[i0 + 1], wk[i1], wk[i1 + 1]);
                    let d0 = a0.saturating_sub(b0);
                    let d1 = a1.saturating_sub(b1);
                    wk[i0] = ((i64::from(a0) + i64::from(b0)) >> 1) as i32;
                    wk[i0 + 1] = ((i64::from(a1) + i64::from(b1)) >> 1) as i32;
                    wk[i1] = mul_rsftrnd(d0, c, Q_BUTTERFLY)
                        .saturating_add(mul_rsftrnd(d1, s, Q_BUTTERFLY));
                    wk[i1 + 1] = mul_rsftrnd(d0, s, Q_BUTTERFLY)
                        .saturating_sub(mul_rsftrnd(d1, c, Q_BUTTERFLY));
                    i0 += 2;
                    i1 += 2;
                }
                i0 += step;
                i1 += step;
            }
        }

        for (out, &p) in spec[..n].iter_mut().zip(tbl.perm) {
            *out = sftrnd(wk[p as usize], shift);
        }
    }

    fn imdct(spec: &[i32], time: &mut [i32], nlnn: u32) {
        let n = 1usize << nlnn;
        let half = n >> 1;
        let tbl = transform_tables(nlnn);

        let mut shift = C_BLKFLT - bit_length(abs_max(&spec[..n])) as i32 - 1;
        let mut wk = [0i32; MAXLSU];
        if shift <= 0 {
            shift = 0;
            for (&v, &p) in spec[..n].iter().zip(tbl.perm) {
                wk[p as usize] = v;
            }
        } else {
            for (&v, &p) in spec[..n].iter().zip(tbl.perm) {
                wk[p as usize] = sftrnd(v, -shift);
            }
        }

        // 蝶形
        let mut coef = 0usize;
        for stage in 0..nlnn - 1 {
            let groups = 1usize << (nlnn - 2 - stage);
            let span = 1usize << stage;
            let step = 1usize << (stage + 1);
            let (mut i0, mut i1) = (0usize, step);
            for _ in 0..groups {
                for k in 0..span {
                    let (c, s) = (tbl.wcos[coef + k], tbl.wsin[coef + k]);
                    let g2 = mul_rsftrnd(wk[i1], c, Q_BUTTERFLY)
                        .saturating_add(mul_rsftrnd(wk[i1 + 1], s, Q_BUTTERFLY));
                    let g3 = mul_rsftrnd(wk[i1], s, Q_BUTTERFLY)
                        .saturating_sub(mul_rsftrnd(wk[i1 + 1], c, Q_BUTTERFLY));
                    let g0 = wk[i0] >> 1;
                    let g1 = wk[i0 + 1] >> 1;
                    wk[i0] = g0.saturating_add(g2);
                    wk[i0 + 1] = g1.saturating_add(g3);
                    wk[i1] = g0.saturating_sub(g2);
                    wk[i1 + 1] = g1.saturating_sub(g3);
                    i0 += 2;
                    i1 += 2;
                }
                i0 += step;
                i1 += step;
            }
            coef += span;
        }

        // 后旋转
        let mut rot = [0i32; MAXLSU];
        for i in 0..half {
            let i0 = i << 1;
            let (c, s) = (tbl.wcos[coef + i], tbl.wsin[coef + i]);
            rot[i0] = mul_rsftrnd(wk[i0], c, Q_MDCT_COS)
                .saturating_add(mul_rsftrnd(wk[i0 + 1], s, Q_MDCT_COS));
            rot[n - i0 - 1] = mul_rsftrnd(wk[i0], s, Q_MDCT_COS)
                .saturating_sub(mul_rsftrnd(wk[i0 + 1], c, Q_MDCT_COS));
        }

        // 加窗与重叠相加
        let sh = Q_MDCT_WIN + shift - (nlnn as i32 - 1);
        let w = tbl.bwin;
        for i in 0..half {
            time[i] = time[n + i].saturating_add(mul_rsftrnd(rot[half + i], w[i], sh));
            time[half + i] = time[3 * half + i]
                .saturating_add(mul_rsftrnd(rot[n - 1 - i].saturating_neg(), w[half + i], sh));
            time[n + i] = mul_rsftrnd(rot[half - 1 - i].saturating_neg(), w[n - 1 - i], sh);
            time[3 * half + i] = mul_rsftrnd(rot[i].saturating_neg(), w[half - 1 - i], sh);
        }
    }

    fn scale_factor_index(values: &[i32]) -> i32 {
        let amax = abs_max(values);
        SF.iter().position(|&sf| sf >= amax).unwrap_or(SF.len() - 1) as i32
    }

    fn quantize(
        values: &[i32],
        idsf: i32,
        idwl1: i32,
        idwl2: i32,
        qspec: &mut [i32],
        rspec: &mut [i32],
    ) {
        let qf1 = QF[idwl1 as usize];
        let iqf1 = i64::from(IQF[idwl1 as usize]);
        let lim1 = quant_limit(idwl1);
        for ((&x, q_out), r_out) in values.iter().zip(qspec.iter_mut()).zip(rspec.iter_mut()) {
            let q = mul_rsftrnd(x, qf1, idsf + Q_DEQUANT1).clamp(-lim1, lim1);
            *q_out = q;
            *r_out = if idwl2 > 0 {
                let diff = (i64::from(x) << (31 - idsf)) - i64::from(q) * iqf1;
                let diff = diff.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                let err = mul_rsftrnd(diff, IRSF[15], Q_NORM);
                let lim2 = quant_limit(idwl2);
                mul_rsftrnd(err, QF[idwl2 as usize], Q_DEQUANT3).clamp(-lim2, lim2)
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
        out: &mut [i32],
    ) {
        let shift = 31 - idsf;
        let iqf1 = IQF[idwl1 as usize];
        for ((&q, &r), y) in qspec.iter().zip(rspec).zip(out.iter_mut()) {
            let mut value = if shift > 0 {
                mul_rsftrnd(q, iqf1, shift)
            } else {
                mul_lsftrnd(q, iqf1, shift)
            };
            if idwl2 > 0 {
                let rn = mul_lsftrnd(r, IQF[idwl2 as usize], Q_DEQUANT2);
                value = value.saturating_add(mul_rsftrnd(rn, RSF[15], Q_DEQUANT3 + Q_NORM - idsf));
            }
            *y = value;
        }
    }

    fn magnitude(sample: i32) -> f64 {
        f64::from(sample).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::test_util::test_signal;

    fn roundtrip_max_error(nlnn: u32) -> i32 {
        let n = 1usize << nlnn;
        let frames = 10;
        let signal = test_signal(n * frames, 1);
        let mut enc = vec![0i32; 2 * n];
        let mut dec = vec![0i32; 2 * n];
        let mut spec = vec![0i32; n];
        let mut out = Vec::with_capacity(n * frames);
        for frame in signal.chunks(n) {
            enc.copy_within(n.., 0);
            for (dst, &s) in enc[n..].iter_mut().zip(frame) {
                *dst = i32::from(s) << 15;
            }
            FixedPath::mdct(&enc, &mut spec, nlnn);
            FixedPath::imdct(&spec, &mut dec, nlnn);
            out.extend(dec[..n].iter().map(|&v| rsft_ro(v, 15)));
        }
        // 变换延迟一帧
        signal[..n * (frames - 1)]
            .iter()
            .zip(&out[n..])
            .map(|(&a, &b)| (i32::from(a) - b).abs())
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_mdct_reconstruction_1fs() {
        let err = roundtrip_max_error(7);
        assert!(err <= 1, "128 点变换重建误差过大: {}", err);
    }

    #[test]
    fn test_mdct_reconstruction_2fs() {
        let err = roundtrip_max_error(8);
        assert!(err <= 1, "256 点变换重建误差过大: {}", err);
    }

    #[test]
    fn test_mdct_silence() {
        let time = vec![0i32; 256];
        let mut spec = vec![7i32; 128];
        FixedPath::mdct(&time, &mut spec, 7);
        assert!(spec.iter().all(|&v| v == 0), "静音输入应得到全零频谱");
    }

    #[test]
    fn test_pcm_conversion() {
        let mut buf = [0u8; 4];
        SampleFormat::S16.write_int(-1234, &mut buf);
        let v = FixedPath::pcm_to_time(SampleFormat::S16, &buf);
        assert_eq!(v, -1234 << 15);
        let mut out = [0u8; 2];
        FixedPath::time_to_pcm(SampleFormat::S16, v, &mut out);
        assert_eq!(i16::from_le_bytes(out), -1234);

        SampleFormat::S24.write_int(0x12_3456, &mut buf);
        let v = FixedPath::pcm_to_time(SampleFormat::S24, &buf[..3]);
        assert_eq!(v, 0x12_3456 << 7);

        // 超出 16 位范围的时域值输出时饱和
        FixedPath::time_to_pcm(SampleFormat::S16, i32::MAX, &mut out);
        assert_eq!(i16::from_le_bytes(out), i16::MAX);
    }

    #[test]
    fn test_scale_factor_index() {
        assert_eq!(FixedPath::scale_factor_index(&[0, 0]), 0);
        assert_eq!(FixedPath::scale_factor_index(&[1, -1]), 0);
        assert_eq!(FixedPath::scale_factor_index(&[3, -2]), 2);
        assert_eq!(FixedPath::scale_factor_index(&[1 << 20, 5]), 20);
        assert_eq!(FixedPath::scale_factor_index(&[(1 << 20) + 1]), 21);
        assert_eq!(FixedPath::scale_factor_index(&[i32::MIN]), 31);
    }

    #[test]
    fn test_quantize_dequantize_error_bound() {
        let idsf = 20;
        let values: Vec<i32> = (0..8).map(|i| (i * 130_000) - 500_000).collect();
        for idwl1 in 2..=15 {
            let mut q = [0i32; 8];
            let mut r = [0i32; 8];
            let mut y = [0i32; 8];
            FixedPath::quantize(&values, idsf, idwl1, 0, &mut q, &mut r);
            FixedPath::dequantize(&q, &r, idsf, idwl1, 0, &mut y);
            let step = (1i64 << idsf) as f64 / (f64::from(quant_limit(idwl1)) + 0.5);
            for (&x, &v) in values.iter().zip(&y) {
                let err = f64::from(x - v).abs();
                assert!(err <= step * 0.5 + 2.0, "idwl1={} 误差 {} 超过半步长 {}", idwl1, err, step);
            }
        }
    }

    #[test]
    fn test_residual_refines() {
        let idsf = 24;
        let values = [5_555_555i32, -3_333_333, 1_234_567, -7_654_321];
        let mut q = [0i32; 4];
        let mut r = [0i32; 4];
        let mut coarse = [0i32; 4];
        let mut fine = [0i32; 4];
        FixedPath::quantize(&values, idsf, 15, 0, &mut q, &mut r);
        FixedPath::dequantize(&q, &r, idsf, 15, 0, &mut coarse);
        FixedPath::quantize(&values, idsf, 15, 6, &mut q, &mut r);
        FixedPath::dequantize(&q, &r, idsf, 15, 6, &mut fine);
        let err = |y: &[i32]| -> i64 {
            values
                .iter()
                .zip(y)
                .map(|(&a, &b)| (i64::from(a) - i64::from(b)).abs())
                .sum()
        };
        assert!(err(&fine) <= err(&coarse), "残差量化后误差不应增大");
    }

    #[test]
    fn test_quantize_clamps() {
        let mut q = [0i32; 2];
        let mut r = [0i32; 2];
        FixedPath::quantize(&[1 << 10, -(1 << 10)], 10, 1, 0, &mut q, &mut r);
        assert_eq!(q, [1, -1]);
        assert_eq!(r, [0, 0]);
    }
}
