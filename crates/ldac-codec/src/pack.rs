//! 帧打包.
//!
//! 帧布局: 帧头, 然后逐块写入 band 信息、梯度、各声道的比例因子/频谱/残差,
//! 每块结束后补 0 到字节边界, 最后用填充码补足帧长.

use ldac_core::bitwriter::BitWriter;
use ldac_core::{LdacError, LdacResult};

use crate::block::{AudioBlock, AudioChannel, Gradient, ScaleFactorCoding};
use crate::config::FrameHeader;
use crate::consts::{
    BAND_OFFSET, EXTMODE_BITS, EXTMODE_PAYLOAD, EXTSIZE_BITS, FILLCODE, FLAG_BITS,
    FRAME_HEADER_BYTES, GRADMODE_BITS, GRADOS_BITS, GRADQU0_BITS, GRADQU1_BITS, IDSF_BITS,
    MINSFCBLEN_0, MINSFCBLEN_1, MINSFCBLEN_2, NADJQU_BITS, NBAND_BITS, SFCBLEN_BITS,
    SFCMODE_BITS, SFCWTBL_BITS, SPEC_2DIM_BITS, SPEC_4DIM_BITS,
};
use crate::huffman;
use crate::tables::{ISP, NSPS, SFCWGT, encode_2dim, encode_4dim};

fn huffman_missing(kind: &str, bitlen: u32) -> LdacError {
    LdacError::InvalidArgument(format!("{} 码表不支持位长 {}", kind, bitlen))
}

fn pack_band_info<S>(bw: &mut BitWriter, block: &AudioBlock<S>) {
    bw.write_bits((block.nbands - BAND_OFFSET) as u32, NBAND_BITS);
    bw.write_bits(u32::from(block.ext_flag), FLAG_BITS);
    if block.ext_flag {
        bw.write_bits(block.ext_mode, EXTMODE_BITS);
        if block.ext_mode == EXTMODE_PAYLOAD {
            for ch in &block.channels {
                bw.write_bits(ch.ext_size, EXTSIZE_BITS);
                let mut rest = ch.ext_size;
                while rest > 0 {
                    let n = rest.min(16);
                    bw.write_bits(0, n);
                    rest -= n;
                }
            }
        }
    }
}

fn pack_gradient<S>(bw: &mut BitWriter, block: &AudioBlock<S>) {
    let gradient = &block.gradient;
    bw.write_bits(gradient.mode(), GRADMODE_BITS);
    match *gradient {
        Gradient::Explicit {
            qu_l,
            qu_h,
            os_l,
            os_h,
        } => {
            bw.write_bits(qu_l, GRADQU0_BITS);
            bw.write_bits(qu_h - 1, GRADQU0_BITS);
            bw.write_bits(os_l, GRADOS_BITS);
            bw.write_bits(os_h, GRADOS_BITS);
        }
        Gradient::Shaped { qu_l, os_l, .. } => {
            bw.write_bits(qu_l, GRADQU1_BITS);
            bw.write_bits(os_l, GRADOS_BITS);
        }
    }
    bw.write_bits(block.nadjqus as u32, NADJQU_BITS);
}

fn pack_scale_factor<S>(
    bw: &mut BitWriter,
    ch: &AudioChannel<S>,
    reference: &[i32],
    nqus: usize,
) -> LdacResult<()> {
    let idsf = &ch.idsf[..nqus];
    bw.write_bits(ch.sfc.mode_bit(), SFCMODE_BITS);
    match ch.sfc {
        ScaleFactorCoding::Differential {
            bitlen,
            offset,
            weight,
        } => {
            let table = huffman::sf0(bitlen).ok_or_else(|| huffman_missing("sf0", bitlen))?;
            let wgt = &SFCWGT[weight];
            bw.write_bits(bitlen - MINSFCBLEN_0, SFCBLEN_BITS);
            bw.write_bits(offset as u32, IDSF_BITS);
            bw.write_bits(weight as u32, SFCWTBL_BITS);
            bw.write_bits((idsf[0] + wgt[0] - offset) as u32, bitlen);
            for iqu in 1..nqus {
                let dif = (idsf[iqu] + wgt[iqu]) - (idsf[iqu - 1] + wgt[iqu - 1]);
                table.encode(bw, (dif & table.mask()) as u32);
            }
        }
        ScaleFactorCoding::Fixed { bitlen, weighting } => {
            bw.write_bits(bitlen - MINSFCBLEN_1, SFCBLEN_BITS);
            match weighting {
                None => {
                    for &v in idsf {
                        bw.write_bits(v as u32, IDSF_BITS);
                    }
                }
                Some((offset, weight)) => {
                    let wgt = &SFCWGT[weight];
                    bw.write_bits(offset as u32, IDSF_BITS);
                    bw.write_bits(weight as u32, SFCWTBL_BITS);
                    for (&v, &w) in idsf.iter().zip(wgt) {
                        bw.write_bits((v + w - offset) as u32, bitlen);
                    }
                }
            }
        }
        ScaleFactorCoding::Relative { bitlen } => {
            let table = huffman::sf1(bitlen).ok_or_else(|| huffman_missing("sf1", bitlen))?;
            bw.write_bits(bitlen - MINSFCBLEN_2, SFCBLEN_BITS);
            for (&v, &r) in idsf.iter().zip(reference) {
                table.encode(bw, ((v - r) & table.mask()) as u32);
            }
        }
    }
    Ok(())
}

fn pack_spectrum<S>(bw: &mut BitWriter, ch: &AudioChannel<S>, nqus: usize) -> LdacResult<()> {
    for iqu in 0..nqus {
        let (lsp, hsp) = (ISP[iqu], ISP[iqu + 1]);
        let idwl1 = ch.idwl1[iqu];
        if idwl1 == 1 {
            if NSPS[iqu] == 2 {
                let code = encode_2dim(ch.qspec[lsp], ch.qspec[lsp + 1]).ok_or_else(|| {
                    LdacError::InvalidData(format!("量化单元 {} 出现不可编码的 (-1, -1)", iqu))
                })?;
                bw.write_bits(code, SPEC_2DIM_BITS);
            } else {
                for quad in ch.qspec[lsp..hsp].chunks_exact(4) {
                    bw.write_bits(encode_4dim([quad[0], quad[1], quad[2], quad[3]]), SPEC_4DIM_BITS);
                }
            }
        } else {
            let wl = idwl1 as u32 + 1;
            for &q in &ch.qspec[lsp..hsp] {
                bw.write_signed(q, wl);
            }
        }
    }
    Ok(())
}

fn pack_residual<S>(bw: &mut BitWriter, ch: &AudioChannel<S>, nqus: usize) {
    for iqu in 0..nqus {
        let idwl2 = ch.idwl2[iqu];
        if idwl2 > 0 {
            let wl = idwl2 as u32 + 1;
            for &r in &ch.rspec[ISP[iqu]..ISP[iqu + 1]] {
                bw.write_signed(r, wl);
            }
        }
    }
}

/// 打包一个音频块 (不含块对齐)
pub fn pack_block<S>(bw: &mut BitWriter, block: &AudioBlock<S>) -> LdacResult<()> {
    pack_band_info(bw, block);
    pack_gradient(bw, block);
    let reference = block.channels[0].idsf;
    for ch in &block.channels {
        pack_scale_factor(bw, ch, &reference[..block.nqus], block.nqus)?;
        pack_spectrum(bw, ch, block.nqus)?;
        pack_residual(bw, ch, block.nqus);
    }
    Ok(())
}

/// 打包整帧, 返回 `3 + frame_length` 字节
pub fn pack_frame<S>(header: &FrameHeader, blocks: &[AudioBlock<S>]) -> LdacResult<Vec<u8>> {
    let total = header.frame_bytes();
    let mut bw = BitWriter::with_capacity(total);
    for byte in header.write()? {
        bw.write_bits(u32::from(byte), 8);
    }
    for block in blocks {
        pack_block(&mut bw, block)?;
        bw.align_to_byte();
    }
    let used = bw.bits_written() / 8;
    if used > total {
        return Err(LdacError::InvalidData(format!(
            "帧数据 {} 字节超过帧长 {} 字节",
            used - FRAME_HEADER_BYTES,
            header.frame_length
        )));
    }
    bw.fill_to(total, FILLCODE);
    Ok(bw.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::WordLengthShape;
    use crate::config::{BlockType, ChannelConfig, SamplingRate};

    fn null_block() -> AudioBlock<i32> {
        let mut block = AudioBlock::<i32>::new(BlockType::Mono).expect("创建音频块失败");
        block.set_nbands(2);
        block.gradient = Gradient::shaped(WordLengthShape::Half, 0, 31);
        let ch = &mut block.channels[0];
        ch.idwl1 = [1; crate::consts::MAXNQUS];
        ch.sfc = ScaleFactorCoding::Fixed {
            bitlen: 2,
            weighting: Some((0, 0)),
        };
        block
    }

    #[test]
    fn test_pack_frame_fills_to_length() {
        let header = FrameHeader {
            sampling_rate: SamplingRate::Hz48000,
            channel_config: ChannelConfig::Mono,
            frame_length: 40,
            frame_status: 0,
        };
        let data = pack_frame(&header, &[null_block()]).expect("打包失败");
        assert_eq!(data.len(), 43);
        assert_eq!(&data[..3], &[0xAA, 0x20, 0x9C]);
        assert_eq!(data[42], FILLCODE, "帧尾应为填充码");
    }

    #[test]
    fn test_pack_block_bit_count() {
        let block = null_block();
        let mut bw = BitWriter::new();
        assert!(pack_block(&mut bw, &block).is_ok());
        // band 5 + 梯度 17 + 模式位 1 + 比例因子 (2+5+3+8*2) + 频谱 (4*3 + 4*7)
        assert_eq!(bw.bits_written(), 5 + 17 + 1 + 26 + 40);
    }

    #[test]
    fn test_pack_rejects_unencodable_pair() {
        let mut block = null_block();
        block.channels[0].qspec[0] = -1;
        block.channels[0].qspec[1] = -1;
        let mut bw = BitWriter::new();
        assert!(matches!(
            pack_block(&mut bw, &block),
            Err(LdacError::InvalidData(_))
        ));
    }

    #[test]
    fn test_pack_rejects_overflow() {
        let header = FrameHeader {
            sampling_rate: SamplingRate::Hz48000,
            channel_config: ChannelConfig::Mono,
            frame_length: 4,
            frame_status: 0,
        };
        assert!(pack_frame(&header, &[null_block()]).is_err());
    }
}
