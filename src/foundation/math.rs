pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Round `n` up to the next multiple of `alignment` (a power of two; 0 and 1 mean no padding).
pub(crate) fn align_up(n: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return n;
    }
    debug_assert!(alignment.is_power_of_two());
    n.saturating_add(alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
