//! 定点数值内核.
//!
//! 提供 Q 格式整数运算原语: 舍入移位、饱和、乘法后舍入移位、位长与绝对值最大值.
//! 右移一律采用四舍五入 (round half up), 结果饱和到 i32 范围.
//! 所有运算在 i128 中完成, 任意移位量都不会溢出.

/// 将宽整数饱和到 i32
#[inline]
fn saturate(value: i128) -> i32 {
    value.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
}

/// 对 64 位值做舍入移位并饱和
///
/// `shift > 0` 时为四舍五入右移, 否则左移 `-shift` 位.
#[inline]
pub fn sftrnd64(value: i64, shift: i32) -> i32 {
    let value = i128::from(value);
    if shift > 0 {
        let s = shift.min(100) as u32;
        saturate((value + (1i128 << (s - 1))) >> s)
    } else {
        let s = (-shift).min(64) as u32;
        saturate(value << s)
    }
}

/// 舍入移位并饱和
#[inline]
pub fn sftrnd(value: i32, shift: i32) -> i32 {
    sftrnd64(i64::from(value), shift)
}

/// 乘法后四舍五入右移
#[inline]
pub fn mul_rsftrnd(a: i32, b: i32, shift: i32) -> i32 {
    sftrnd64(i64::from(a) * i64::from(b), shift)
}

/// 乘法后左移 (`shift <= 0` 表示左移 `-shift` 位)
#[inline]
pub fn mul_lsftrnd(a: i32, b: i32, shift: i32) -> i32 {
    sftrnd64(i64::from(a) * i64::from(b), shift)
}

/// 饱和左移
#[inline]
pub fn lsft(value: i32, shift: u32) -> i32 {
    sftrnd(value, -(shift.min(64) as i32))
}

/// 算术右移 (不舍入)
#[inline]
pub fn rsft(value: i32, shift: u32) -> i32 {
    value >> shift.min(31)
}

/// 四舍五入右移
#[inline]
pub fn rsft_ro(value: i32, shift: u32) -> i32 {
    if shift == 0 {
        value
    } else {
        sftrnd(value, shift.min(64) as i32)
    }
}

/// 正数的有效位长, 非正数返回 0
#[inline]
pub fn bit_length(value: i32) -> u32 {
    if value <= 0 {
        0
    } else {
        32 - value.leading_zeros()
    }
}

/// 绝对值最大值, `i32::MIN` 饱和为 `i32::MAX`
pub fn abs_max(values: &[i32]) -> i32 {
    values
        .iter()
        .map(|v| v.unsigned_abs().min(i32::MAX as u32) as i32)
        .max()
        .unwrap_or(0)
}

/// 将 `bits` 位二进制补码扩展为 i32
#[inline]
pub fn sign_extend(value: u32, bits: u32) -> i32 {
    if bits == 0 {
        return 0;
    }
    if bits >= 32 {
        return value as i32;
    }
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}
