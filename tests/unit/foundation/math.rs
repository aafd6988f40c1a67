use super::*;

#[test]
fn align_up_pads_to_power_of_two() {
    assert_eq!(align_up(10, 1), 10);
    assert_eq!(align_up(10, 0), 10);
    assert_eq!(align_up(10, 16), 16);
    assert_eq!(align_up(64, 64), 64);
    assert_eq!(align_up(65, 64), 128);
    assert_eq!(align_up(0, 64), 0);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(255, 0), 0);
    assert_eq!(mul_div255_u8(255, 128), 128);
    assert_eq!(mul_div255_u8(100, 128), 50);
}
