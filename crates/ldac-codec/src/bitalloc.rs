//! 比特分配.
//!
//! 编码端与解码端共用的字长重建 (梯度曲线、附加字长、主/残差字长),
//! 以及编码端的比例因子编码选择与偏移量搜索.
//!
//! 搜索顺序: 偏移量从 0 递增直到块大小 (按字节取整) 不超过预算;
//! 随后在不超预算的前提下尽量增加调整量化单元数; 仍无解时逐个减少 band, 最少 2 个.

use log::debug;

use ldac_core::{LdacError, LdacResult};

use crate::block::{AudioBlock, AudioChannel, Gradient, ScaleFactorCoding};
use crate::config::EncodeSetting;
use crate::consts::{
    BYTE_BITS, FLAG_BITS, GRADMODE_BITS, GRADOS_BITS, GRADQU0_BITS, GRADQU1_BITS, IDSF_BITS,
    MAXGRADOS, MAXGRADQU, MAXIDWL1, MAXIDWL2, MAXNQUS, MAXSFCBLEN_1_WEIGHTED, MINIDWL1,
    NADJQU_BITS, NBAND_BITS, NSFCWTBL, SFCBLEN_BITS, SFCMODE_BITS, SFCWTBL_BITS, SPEC_2DIM_BITS,
    SPEC_4DIM_BITS,
};
use crate::huffman;
use crate::tables::{NSPS, RESAMP, SFC_BITLEN_0, SFC_BITLEN_1, SFC_BITLEN_2, SFCWGT};

/// 调整量化单元数上限 (字段宽度决定)
const MAX_NADJQUS: usize = (1 << NADJQU_BITS) - 1;

/// 最少 band 数量
pub const MIN_NBANDS: usize = 2;

/// 重建梯度曲线, 写入 `grad[lqu..hqu]` 及上边界以下的部分
pub fn reconst_gradient(gradient: &Gradient, lqu: usize, hqu: usize, grad: &mut [i32; MAXGRADQU]) {
    let qu_l = gradient.qu_l() as usize;
    let qu_h = (gradient.qu_h() as usize).min(MAXGRADQU);
    let os_l = gradient.os_l() as i32;
    let os_h = gradient.os_h() as i32;

    for g in grad.iter_mut().take(qu_h).skip(lqu) {
        *g = -os_l;
    }
    for g in grad.iter_mut().take(hqu).skip(qu_h) {
        *g = -os_h;
    }

    if qu_h > qu_l {
        let resamp = &RESAMP[qu_h - qu_l - 1];
        let slope = os_h - os_l;
        if slope > 0 {
            for (g, &t) in grad[qu_l..qu_h].iter_mut().zip(resamp) {
                *g -= ((t * (slope - 1)) >> 8) + 1;
            }
        } else if slope < 0 {
            for (g, &t) in grad[qu_l..qu_h].iter_mut().zip(resamp) {
                *g += ((t * (-slope - 1)) >> 8) + 1;
            }
        }
    }
}

/// 按相邻比例因子跳变计算附加字长 (仅梯度模式 1-3)
pub fn calc_add_word_length(
    gradient: &Gradient,
    idsf: &[i32; MAXNQUS],
    nqus: usize,
    addwl: &mut [i32; MAXNQUS],
) {
    addwl.fill(0);
    if gradient.shape().is_none() {
        return;
    }
    for iqu in 1..nqus {
        let dif = idsf[iqu] - idsf[iqu - 1];
        if dif > 1 {
            addwl[iqu] += (dif - 1).min(5);
        } else if dif < -1 {
            addwl[iqu - 1] += (-dif - 1).min(5);
        }
    }
}

/// 重建主字长与残差字长
#[allow(clippy::too_many_arguments)]
pub fn reconst_word_length(
    gradient: &Gradient,
    grad: &[i32; MAXGRADQU],
    idsf: &[i32; MAXNQUS],
    addwl: &[i32; MAXNQUS],
    nqus: usize,
    nadjqus: usize,
    idwl1: &mut [i32; MAXNQUS],
    idwl2: &mut [i32; MAXNQUS],
) {
    let shape = gradient.shape();
    for iqu in 0..nqus {
        let wl = match shape {
            None => idsf[iqu] + grad[iqu],
            Some(shape) => shape.apply(idsf[iqu] + grad[iqu] + addwl[iqu]),
        };
        idwl1[iqu] = wl.max(MINIDWL1);
    }
    for wl in idwl1.iter_mut().take(nadjqus.min(nqus)) {
        *wl += 1;
    }
    for iqu in 0..nqus {
        idwl2[iqu] = 0;
        if idwl1[iqu] > MAXIDWL1 {
            idwl2[iqu] = (idwl1[iqu] - MAXIDWL1).min(MAXIDWL2);
            idwl1[iqu] = MAXIDWL1;
        }
    }
}

/// 对块内每个声道重建字长 (梯度曲线须已重建)
pub fn reconst_block_word_lengths<S>(block: &mut AudioBlock<S>) {
    let AudioBlock {
        channels,
        gradient,
        grad,
        nqus,
        nadjqus,
        ..
    } = block;
    for ch in channels.iter_mut() {
        let AudioChannel {
            idsf,
            addwl,
            idwl1,
            idwl2,
            ..
        } = ch;
        calc_add_word_length(gradient, idsf, *nqus, addwl);
        reconst_word_length(gradient, grad, idsf, addwl, *nqus, *nadjqus, idwl1, idwl2);
    }
}

/// band 信息位数
pub const fn band_info_bits() -> usize {
    (NBAND_BITS + FLAG_BITS) as usize
}

/// 梯度位数
pub const fn gradient_bits(gradient: &Gradient) -> usize {
    let bits = match gradient {
        Gradient::Explicit { .. } => {
            GRADMODE_BITS + GRADQU0_BITS * 2 + GRADOS_BITS * 2 + NADJQU_BITS
        }
        Gradient::Shaped { .. } => GRADMODE_BITS + GRADQU1_BITS + GRADOS_BITS + NADJQU_BITS,
    };
    bits as usize
}

fn weighted_range(idsf: &[i32], weight: &[i32]) -> (i32, i32) {
    idsf.iter()
        .zip(weight)
        .map(|(&v, &w)| v + w)
        .fold((i32::MAX, i32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// 模式 0 比例因子位数与参数
pub fn scale_factor_bits_differential(idsf: &[i32]) -> (usize, ScaleFactorCoding) {
    let mut best = (usize::MAX, ScaleFactorCoding::default());
    for (iwt, weight) in SFCWGT.iter().enumerate().take(NSFCWTBL) {
        let (vmin, vmax) = weighted_range(idsf, weight);
        let bitlen = SFC_BITLEN_0[((vmax - vmin) >> 1) as usize];
        let Some(table) = huffman::sf0(bitlen) else {
            continue;
        };
        let mask = table.mask();
        let mut bits = bitlen as usize;
        for iqu in 1..idsf.len() {
            let dif = (idsf[iqu] + weight[iqu]) - (idsf[iqu - 1] + weight[iqu - 1]);
            bits += table.code_length((dif & mask) as u32) as usize;
        }
        if bits < best.0 {
            best = (
                bits,
                ScaleFactorCoding::Differential {
                    bitlen,
                    offset: vmin,
                    weight: iwt,
                },
            );
        }
    }
    (
        best.0 + (SFCBLEN_BITS + IDSF_BITS + SFCWTBL_BITS) as usize,
        best.1,
    )
}

/// 模式 1 (声道 0) 比例因子位数与参数
pub fn scale_factor_bits_fixed(idsf: &[i32]) -> (usize, ScaleFactorCoding) {
    let mut best = (usize::MAX, ScaleFactorCoding::default());
    for (iwt, weight) in SFCWGT.iter().enumerate().take(NSFCWTBL) {
        let (vmin, vmax) = weighted_range(idsf, weight);
        let bitlen = SFC_BITLEN_1[((vmax - vmin) >> 1) as usize];
        let (header, weighting) = if bitlen > MAXSFCBLEN_1_WEIGHTED {
            (SFCBLEN_BITS, None)
        } else {
            (SFCBLEN_BITS + IDSF_BITS + SFCWTBL_BITS, Some((vmin, iwt)))
        };
        let bits = header as usize + bitlen as usize * idsf.len();
        if bits < best.0 {
            best = (bits, ScaleFactorCoding::Fixed { bitlen, weighting });
        }
    }
    best
}

/// 模式 1 (声道 1) 比例因子位数与参数
pub fn scale_factor_bits_relative(idsf: &[i32], reference: &[i32]) -> (usize, ScaleFactorCoding) {
    let vmax = idsf
        .iter()
        .zip(reference)
        .map(|(&a, &b)| (a - b).abs())
        .max()
        .unwrap_or(0);
    let bitlen = SFC_BITLEN_2[((vmax >> 1) as usize).min(SFC_BITLEN_2.len() - 1)];
    let mut bits = SFCBLEN_BITS as usize;
    if let Some(table) = huffman::sf1(bitlen) {
        let mask = table.mask();
        for (&a, &b) in idsf.iter().zip(reference) {
            bits += table.code_length(((a - b) & mask) as u32) as usize;
        }
    }
    (bits, ScaleFactorCoding::Relative { bitlen })
}

/// 选择比例因子编码方式, 返回位数 (含模式位)
///
/// 两种方式位数相同时取模式 0.
pub fn choose_scale_factor_coding(
    ich: usize,
    idsf: &[i32],
    reference: &[i32],
) -> (usize, ScaleFactorCoding) {
    let mode0 = scale_factor_bits_differential(idsf);
    let mode1 = if ich == 0 {
        scale_factor_bits_fixed(idsf)
    } else {
        scale_factor_bits_relative(idsf, reference)
    };
    let (bits, coding) = if mode1.0 < mode0.0 { mode1 } else { mode0 };
    (bits + SFCMODE_BITS as usize, coding)
}

/// 一个声道的频谱与残差位数
pub fn spectrum_bits(idwl1: &[i32], idwl2: &[i32], nqus: usize) -> usize {
    let mut bits = 0usize;
    for iqu in 0..nqus {
        let nsps = NSPS[iqu];
        bits += if idwl1[iqu] == 1 {
            if nsps == 2 {
                SPEC_2DIM_BITS as usize
            } else {
                (nsps >> 2) * SPEC_4DIM_BITS as usize
            }
        } else {
            (idwl1[iqu] as usize + 1) * nsps
        };
        if idwl2[iqu] > 0 {
            bits += (idwl2[iqu] as usize + 1) * nsps;
        }
    }
    bits
}

#[inline]
fn round_up_bytes(bits: usize) -> usize {
    bits.div_ceil(BYTE_BITS) * BYTE_BITS
}

/// 比特分配结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// 最终 band 数量
    pub nbands: usize,
    /// 偏移增量
    pub offset: u32,
    /// 调整量化单元数
    pub nadjqus: usize,
    /// 是否减少了 band
    pub band_reduced: bool,
}

/// 给定 band 数量下的一次分配尝试所需的固定信息
struct SideInfo {
    bits: usize,
    scale_factor: usize,
    addwl: Vec<[i32; MAXNQUS]>,
}

fn block_bits<S>(
    block: &AudioBlock<S>,
    side: &SideInfo,
    gradient: &Gradient,
    grad: &[i32; MAXGRADQU],
    nadjqus: usize,
) -> (usize, usize) {
    let mut spec = 0usize;
    let mut idwl1 = [0i32; MAXNQUS];
    let mut idwl2 = [0i32; MAXNQUS];
    for (ch, addwl) in block.channels.iter().zip(&side.addwl) {
        reconst_word_length(
            gradient, grad, &ch.idsf, addwl, block.nqus, nadjqus, &mut idwl1, &mut idwl2,
        );
        spec += spectrum_bits(&idwl1, &idwl2, block.nqus);
    }
    (round_up_bytes(side.bits + spec), spec)
}

fn side_info<S>(block: &mut AudioBlock<S>, gradient: &Gradient) -> SideInfo {
    let nqus = block.nqus;
    let reference = block.channels[0].idsf;
    let mut scale_factor = 0usize;
    let mut addwl = Vec::with_capacity(block.channels.len());
    for (ich, ch) in block.channels.iter_mut().enumerate() {
        let (bits, coding) = choose_scale_factor_coding(ich, &ch.idsf[..nqus], &reference[..nqus]);
        ch.sfc = coding;
        scale_factor += bits;
        let mut wl = [0i32; MAXNQUS];
        calc_add_word_length(gradient, &ch.idsf, nqus, &mut wl);
        addwl.push(wl);
    }
    SideInfo {
        bits: band_info_bits() + gradient_bits(gradient) + scale_factor,
        scale_factor,
        addwl,
    }
}

/// 为一个音频块分配比特
///
/// 调用前各声道的 `idsf` 须已按全部量化单元计算. 成功时块参数、梯度曲线与各声道字长均已写入.
pub fn allocate_block<S>(
    block: &mut AudioBlock<S>,
    setting: &EncodeSetting,
    budget_bits: usize,
) -> LdacResult<Allocation> {
    let mut nbands = setting.nbands;
    loop {
        block.set_nbands(nbands);
        block.gradient = setting.gradient;
        let side = side_info(block, &setting.gradient);

        let mut grad = [0i32; MAXGRADQU];
        for offset in 0..=MAXGRADOS {
            let gradient = setting.gradient.with_offset(offset);
            reconst_gradient(&gradient, 0, block.nqus, &mut grad);
            let (total, _) = block_bits(block, &side, &gradient, &grad, 0);
            if total > budget_bits {
                continue;
            }

            let max_adj = block.nqus.min(MAX_NADJQUS);
            let mut nadjqus = 0;
            while nadjqus < max_adj
                && block_bits(block, &side, &gradient, &grad, nadjqus + 1).0 <= budget_bits
            {
                nadjqus += 1;
            }
            let (total, spectrum) = block_bits(block, &side, &gradient, &grad, nadjqus);

            block.gradient = gradient;
            block.grad = grad;
            block.nadjqus = nadjqus;
            block.bits.band = band_info_bits();
            block.bits.gradient = gradient_bits(&gradient);
            block.bits.scale_factor = side.scale_factor;
            block.bits.spectrum = spectrum;
            block.bits.total = total;
            reconst_block_word_lengths(block);

            let band_reduced = nbands < setting.nbands;
            debug!(
                "比特分配: nbands={}, offset={}, nadjqus={}, bits={}/{}",
                nbands, offset, nadjqus, total, budget_bits
            );
            return Ok(Allocation {
                nbands,
                offset,
                nadjqus,
                band_reduced,
            });
        }

        if !setting.band_control || nbands <= MIN_NBANDS {
            return Err(LdacError::BitAllocation(format!(
                "预算 {} 位不足, nbands={}",
                budget_bits, nbands
            )));
        }
        nbands -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::WordLengthShape;
    use crate::config::BlockType;

    fn mono_block(idsf: i32) -> AudioBlock<i32> {
        let mut block = AudioBlock::<i32>::new(BlockType::Mono).expect("创建音频块失败");
        block.channels[0].idsf = [idsf; MAXNQUS];
        block
    }

    #[test]
    fn test_reconst_gradient_explicit() {
        let mut grad = [0i32; MAXGRADQU];
        reconst_gradient(&Gradient::default(), 0, MAXNQUS, &mut grad);
        assert_eq!(grad[0], -1);
        assert_eq!(grad[27], -9);
        assert_eq!(grad[28], -10);
        assert_eq!(grad[33], -10);
        assert!(grad[..28].windows(2).all(|w| w[0] >= w[1]), "梯度应单调下降");
    }

    #[test]
    fn test_reconst_gradient_shaped() {
        let mut grad = [0i32; MAXGRADQU];
        let g = Gradient::shaped(WordLengthShape::Half, 0, 31);
        reconst_gradient(&g, 0, 8, &mut grad);
        // 上下偏移相等时为常数
        assert!(grad[..26].iter().all(|&v| v == -31));
    }

    #[test]
    fn test_add_word_length() {
        let mut idsf = [10i32; MAXNQUS];
        idsf[1] = 14;
        idsf[2] = 8;
        let mut addwl = [0i32; MAXNQUS];
        let shaped = Gradient::shaped(WordLengthShape::Half, 0, 0);
        calc_add_word_length(&shaped, &idsf, 3, &mut addwl);
        // +4 -> 3, -6 -> 5
        assert_eq!(&addwl[..4], &[0, 8, 0, 0][..]);
        // +2 -> 1
        calc_add_word_length(&shaped, &idsf, 4, &mut addwl);
        assert_eq!(addwl[3], 1);
        calc_add_word_length(&Gradient::default(), &idsf, 4, &mut addwl);
        assert!(addwl.iter().all(|&v| v == 0), "模式 0 不使用附加字长");
    }

    #[test]
    fn test_word_length_clamp() {
        let mut idsf = [0i32; MAXNQUS];
        idsf[0] = 31;
        idsf[1] = 20;
        let grad = [0i32; MAXGRADQU];
        let addwl = [0i32; MAXNQUS];
        let mut idwl1 = [0i32; MAXNQUS];
        let mut idwl2 = [0i32; MAXNQUS];
        reconst_word_length(
            &Gradient::default(),
            &grad,
            &idsf,
            &addwl,
            4,
            1,
            &mut idwl1,
            &mut idwl2,
        );
        assert_eq!((idwl1[0], idwl2[0]), (15, 15), "残差字长上限 15");
        assert_eq!((idwl1[1], idwl2[1]), (15, 5));
        assert_eq!((idwl1[2], idwl2[2]), (1, 0), "主字长下限 1");
    }

    #[test]
    fn test_sfc_choice_is_minimal() {
        let mut idsf = [12i32; 20];
        for (i, v) in idsf.iter_mut().enumerate() {
            *v -= (i / 4) as i32;
        }
        let d = scale_factor_bits_differential(&idsf);
        let f = scale_factor_bits_fixed(&idsf);
        let (bits, _) = choose_scale_factor_coding(0, &idsf, &idsf);
        assert_eq!(bits, d.0.min(f.0) + 1);

        let r = scale_factor_bits_relative(&idsf, &idsf);
        assert_eq!(r.0, 2 + idsf.len(), "与参考相同时每个差值 1 位");
        let (bits, coding) = choose_scale_factor_coding(1, &idsf, &idsf);
        assert_eq!(bits, r.0.min(d.0) + 1);
        assert_eq!(coding.mode_bit(), u32::from(r.0 < d.0));
    }

    #[test]
    fn test_sfc_constant_costs() {
        let idsf = [7i32; 20];
        let (bits, coding) = scale_factor_bits_differential(&idsf);
        assert_eq!(bits, 3 + 19 + 10);
        assert_eq!(
            coding,
            ScaleFactorCoding::Differential {
                bitlen: 3,
                offset: 7,
                weight: 0
            }
        );
        let (bits, _) = scale_factor_bits_fixed(&idsf);
        assert_eq!(bits, 10 + 2 * 20);
    }

    #[test]
    fn test_spectrum_bits() {
        let mut idwl1 = [1i32; MAXNQUS];
        let idwl2 = [0i32; MAXNQUS];
        // 4 个 2 点单元各 3 位, 后 4 个 4 点单元各 7 位
        assert_eq!(spectrum_bits(&idwl1, &idwl2, 8), 4 * 3 + 4 * 7);
        idwl1[0] = 15;
        let mut idwl2 = idwl2;
        idwl2[0] = 3;
        assert_eq!(spectrum_bits(&idwl1, &idwl2, 1), 16 * 2 + 4 * 2);
    }

    #[test]
    fn test_allocate_generous_budget() {
        let mut block = mono_block(10);
        let setting = EncodeSetting {
            nbands: 16,
            gradient: Gradient::default(),
            band_control: true,
        };
        let result = allocate_block(&mut block, &setting, 4096);
        let alloc = result.expect("分配失败");
        assert_eq!(alloc.offset, 0);
        assert!(!alloc.band_reduced);
        assert!(block.bits.total <= 4096);
        assert_eq!(block.bits.total % 8, 0);
        assert!(block.channels[0].idwl1[..block.nqus].iter().all(|&w| (1..=15).contains(&w)));
    }

    #[test]
    fn test_allocate_reduces_bands() {
        let mut block = mono_block(20);
        let setting = EncodeSetting {
            nbands: 16,
            gradient: Gradient::default(),
            band_control: true,
        };
        let alloc = allocate_block(&mut block, &setting, 240).expect("分配失败");
        assert!(alloc.band_reduced);
        assert!(alloc.nbands < 16 && alloc.nbands >= MIN_NBANDS);
        assert!(block.bits.total <= 240);

        let mut block = mono_block(20);
        let fixed = EncodeSetting {
            band_control: false,
            ..setting
        };
        assert!(matches!(
            allocate_block(&mut block, &fixed, 240),
            Err(LdacError::BitAllocation(_))
        ));
    }

    #[test]
    fn test_allocate_impossible_budget() {
        let mut block = mono_block(5);
        let setting = EncodeSetting::for_frame_length(55, crate::config::SamplingRate::Hz48000);
        assert!(matches!(
            allocate_block(&mut block, &setting, 16),
            Err(LdacError::BitAllocation(_))
        ));
    }
}
