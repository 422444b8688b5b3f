//! 帧解包与语法校验.
//!
//! 逐块读取并立即校验, 任何一处不合法都终止整帧:
//! - 块内: band 数量、梯度边界、调整量化单元数、比例因子范围、4 维码字范围
//! - 块后: 数据不得超出帧长, 块尾对齐填充必须为 0
//! - 帧尾: 剩余字节必须全部为填充码

use ldac_core::bitreader::BitReader;
use ldac_core::fixed::sign_extend;
use ldac_core::{SyntaxError, UnpackError};

use crate::bitalloc::{calc_add_word_length, reconst_gradient, reconst_word_length};
use crate::block::{AudioBlock, AudioChannel, Gradient, ScaleFactorCoding, WordLengthShape};
use crate::config::SamplingRate;
use crate::consts::{
    BAND_OFFSET, BYTE_BITS, DEFGRADQUH, EXTMODE_BITS, EXTMODE_PAYLOAD, EXTSIZE_BITS,
    FILLCODE, GRADMODE_BITS, GRADOS_BITS, GRADQU0_BITS, GRADQU1_BITS, IDSF_BITS, MAXGRADQU,
    MAXNQUS, MINSFCBLEN_0, MINSFCBLEN_1, MINSFCBLEN_2, MAXSFCBLEN_1_WEIGHTED, N4DIMSPECDECTBL,
    NADJQU_BITS, NBAND_BITS, NIDSF, SFC_MASK, SFCBLEN_BITS, SFCMODE_BITS, SFCWTBL_BITS,
    SPEC_2DIM_BITS, SPEC_4DIM_BITS,
};
use crate::huffman;
use crate::tables::{ISP, NSPS, SFCWGT, SPEC_2DIM_DEC, SPEC_4DIM_DEC};

type SyntaxResult<T> = Result<T, SyntaxError>;

fn unpack_band_info<S>(
    br: &mut BitReader<'_>,
    block: &mut AudioBlock<S>,
    sampling_rate: SamplingRate,
) -> SyntaxResult<()> {
    let nbands = br.read_bits(NBAND_BITS) as usize + BAND_OFFSET;
    if nbands > sampling_rate.max_nbands() {
        return Err(SyntaxError::Band);
    }
    block.set_nbands(nbands);

    block.ext_flag = br.read_bit();
    block.ext_mode = 0;
    if block.ext_flag {
        block.ext_mode = br.read_bits(EXTMODE_BITS);
        if block.ext_mode == EXTMODE_PAYLOAD {
            for ch in &mut block.channels {
                ch.ext_size = br.read_bits(EXTSIZE_BITS);
                br.skip_bits(ch.ext_size as usize);
            }
        }
    }
    Ok(())
}

fn unpack_gradient<S>(br: &mut BitReader<'_>, block: &mut AudioBlock<S>) -> SyntaxResult<()> {
    let mode = br.read_bits(GRADMODE_BITS);
    block.gradient = match WordLengthShape::from_mode(mode) {
        None => {
            let qu_l = br.read_bits(GRADQU0_BITS);
            if qu_l as usize >= MAXGRADQU {
                return Err(SyntaxError::GradA);
            }
            let qu_h = br.read_bits(GRADQU0_BITS) + 1;
            if qu_h as usize >= MAXGRADQU + 1 {
                return Err(SyntaxError::GradB);
            }
            if qu_l > qu_h {
                return Err(SyntaxError::GradC);
            }
            let os_l = br.read_bits(GRADOS_BITS);
            let os_h = br.read_bits(GRADOS_BITS);
            Gradient::Explicit {
                qu_l,
                qu_h,
                os_l,
                os_h,
            }
        }
        Some(shape) => {
            let qu_l = br.read_bits(GRADQU1_BITS);
            if qu_l > DEFGRADQUH {
                return Err(SyntaxError::GradD);
            }
            let os_l = br.read_bits(GRADOS_BITS);
            Gradient::shaped(shape, qu_l, os_l)
        }
    };

    block.nadjqus = br.read_bits(NADJQU_BITS) as usize;
    if block.nadjqus > block.nqus {
        return Err(SyntaxError::GradE);
    }
    Ok(())
}

fn unpack_scale_factor_differential(
    br: &mut BitReader<'_>,
    idsf: &mut [i32; MAXNQUS],
    nqus: usize,
) -> ScaleFactorCoding {
    let bitlen = br.read_bits(SFCBLEN_BITS) + MINSFCBLEN_0;
    let offset = br.read_bits(IDSF_BITS) as i32;
    let weight = br.read_bits(SFCWTBL_BITS) as usize;
    idsf[0] = br.read_bits(bitlen) as i32;

    let wgt = &SFCWGT[weight];
    if let Some(table) = huffman::sf0(bitlen) {
        for iqu in 1..nqus {
            let dif = table.decode(br) as i32;
            idsf[iqu] = (idsf[iqu - 1] + dif) & table.mask();
            idsf[iqu - 1] += offset - wgt[iqu - 1];
        }
    }
    idsf[nqus - 1] += offset - wgt[nqus - 1];

    ScaleFactorCoding::Differential {
        bitlen,
        offset,
        weight,
    }
}

fn unpack_scale_factor_fixed(
    br: &mut BitReader<'_>,
    idsf: &mut [i32; MAXNQUS],
    nqus: usize,
) -> ScaleFactorCoding {
    let bitlen = br.read_bits(SFCBLEN_BITS) + MINSFCBLEN_1;
    if bitlen > MAXSFCBLEN_1_WEIGHTED {
        for v in idsf.iter_mut().take(nqus) {
            *v = br.read_bits(IDSF_BITS) as i32;
        }
        return ScaleFactorCoding::Fixed {
            bitlen,
            weighting: None,
        };
    }

    let offset = br.read_bits(IDSF_BITS) as i32;
    let weight = br.read_bits(SFCWTBL_BITS) as usize;
    for (v, &w) in idsf.iter_mut().take(nqus).zip(&SFCWGT[weight]) {
        *v = br.read_bits(bitlen) as i32 - w + offset;
    }
    ScaleFactorCoding::Fixed {
        bitlen,
        weighting: Some((offset, weight)),
    }
}

fn unpack_scale_factor_relative(
    br: &mut BitReader<'_>,
    idsf: &mut [i32; MAXNQUS],
    reference: &[i32; MAXNQUS],
    nqus: usize,
) -> ScaleFactorCoding {
    let bitlen = br.read_bits(SFCBLEN_BITS) + MINSFCBLEN_2;
    if let Some(table) = huffman::sf1(bitlen) {
        for iqu in 0..nqus {
            let dif = sign_extend(table.decode(br), bitlen) & SFC_MASK;
            idsf[iqu] = (reference[iqu] + dif) & SFC_MASK;
        }
    }
    ScaleFactorCoding::Relative { bitlen }
}

fn unpack_scale_factor<S>(
    br: &mut BitReader<'_>,
    ch: &mut AudioChannel<S>,
    ich: usize,
    reference: &[i32; MAXNQUS],
    nqus: usize,
) -> SyntaxResult<()> {
    ch.idsf.fill(0);
    let mode = br.read_bits(SFCMODE_BITS);
    ch.sfc = match (mode, ich) {
        (0, _) => unpack_scale_factor_differential(br, &mut ch.idsf, nqus),
        (_, 0) => unpack_scale_factor_fixed(br, &mut ch.idsf, nqus),
        _ => unpack_scale_factor_relative(br, &mut ch.idsf, reference, nqus),
    };
    if ch.idsf.iter().any(|&v| !(0..NIDSF).contains(&v)) {
        return Err(SyntaxError::Idsf);
    }
    Ok(())
}

fn unpack_spectrum<S>(
    br: &mut BitReader<'_>,
    ch: &mut AudioChannel<S>,
    nqus: usize,
) -> SyntaxResult<()> {
    ch.qspec.fill(0);
    for iqu in 0..nqus {
        let (lsp, hsp) = (ISP[iqu], ISP[iqu + 1]);
        let idwl1 = ch.idwl1[iqu];
        if idwl1 == 1 {
            if NSPS[iqu] == 2 {
                let pair = SPEC_2DIM_DEC[br.read_bits(SPEC_2DIM_BITS) as usize];
                ch.qspec[lsp..hsp].copy_from_slice(&pair);
            } else {
                for quad in ch.qspec[lsp..hsp].chunks_exact_mut(4) {
                    let code = br.read_bits(SPEC_4DIM_BITS);
                    if code >= N4DIMSPECDECTBL {
                        return Err(SyntaxError::Spec);
                    }
                    quad.copy_from_slice(&SPEC_4DIM_DEC[code as usize]);
                }
            }
        } else {
            let wl = idwl1 as u32 + 1;
            for q in &mut ch.qspec[lsp..hsp] {
                *q = br.read_signed(wl);
            }
        }
    }
    Ok(())
}

fn unpack_residual<S>(br: &mut BitReader<'_>, ch: &mut AudioChannel<S>, nqus: usize) {
    ch.rspec.fill(0);
    for iqu in 0..nqus {
        let idwl2 = ch.idwl2[iqu];
        if idwl2 > 0 {
            let wl = idwl2 as u32 + 1;
            for r in &mut ch.rspec[ISP[iqu]..ISP[iqu + 1]] {
                *r = br.read_signed(wl);
            }
        }
    }
}

/// 解包一个音频块 (不含块对齐)
pub fn unpack_block<S>(
    br: &mut BitReader<'_>,
    block: &mut AudioBlock<S>,
    sampling_rate: SamplingRate,
) -> SyntaxResult<()> {
    unpack_band_info(br, block, sampling_rate)?;
    unpack_gradient(br, block)?;

    let AudioBlock {
        channels,
        gradient,
        grad,
        nqus,
        nadjqus,
        ..
    } = block;
    reconst_gradient(gradient, 0, *nqus, grad);

    for ich in 0..channels.len() {
        let reference = channels[0].idsf;
        let ch = &mut channels[ich];
        unpack_scale_factor(br, ch, ich, &reference, *nqus)?;
        calc_add_word_length(gradient, &ch.idsf, *nqus, &mut ch.addwl);
        reconst_word_length(
            gradient,
            grad,
            &ch.idsf,
            &ch.addwl,
            *nqus,
            *nadjqus,
            &mut ch.idwl1,
            &mut ch.idwl2,
        );
        unpack_spectrum(br, ch, *nqus)?;
        unpack_residual(br, ch, *nqus);
    }
    Ok(())
}

/// 解包帧数据 (帧头之后的 `frame_length` 字节), 返回消耗的字节数
pub fn unpack_frame<S>(
    raw: &[u8],
    frame_length: usize,
    sampling_rate: SamplingRate,
    blocks: &mut [AudioBlock<S>],
) -> Result<usize, UnpackError> {
    let mut br = BitReader::new(raw);
    let limit = frame_length * BYTE_BITS;

    for block in blocks.iter_mut() {
        unpack_block(&mut br, block, sampling_rate).map_err(UnpackError::BlockFailed)?;
        if br.position() > limit {
            return Err(UnpackError::FrameLengthOver);
        }
        if br.read_alignment_padding() != 0 {
            return Err(UnpackError::BlockAlign);
        }
    }

    let used = br.position() / BYTE_BITS;
    if used > frame_length {
        return Err(UnpackError::FrameAlign);
    }
    for _ in used..frame_length {
        if br.read_bits(BYTE_BITS as u32) != u32::from(FILLCODE) {
            return Err(UnpackError::FrameAlign);
        }
    }
    if br.position() > limit {
        return Err(UnpackError::FrameAlignOver);
    }
    Ok(br.position() / BYTE_BITS)
}
