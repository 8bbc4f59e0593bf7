//! Pure ALU operations.
//!
//! Every routine takes operand values and returns the result together with a
//! complete flag vector; nothing here touches machine state. The executor
//! decides which flags to write back (INR/DCR preserve carry, DAD touches
//! only carry, and so on).
//!
//! Subtract-class operations are performed as the chip does internally: an
//! add of the one's complement with an inverted carry-in, then the carry
//! flipped on the way out so that carry set means a borrow occurred.

use crate::flags::Flags;

/// Even-parity predicate over the low 8 bits. A set parity flag means an
/// even number of set bits.
pub fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

fn zsp(result: u8) -> Flags {
    let mut flags = Flags::default();
    flags.set_zsp(result);
    flags
}

/// ADD/ADC class: `a + operand + carry_in` with all five flags recomputed.
pub fn add(a: u8, operand: u8, carry_in: bool) -> (u8, Flags) {
    let sum = a as u16 + operand as u16 + carry_in as u16;
    let result = sum as u8;
    let flags = Flags {
        carry: sum > 0xFF,
        aux_carry: (a & 0x0F) + (operand & 0x0F) + carry_in as u8 > 0x0F,
        ..zsp(result)
    };
    (result, flags)
}

/// SUB/SBB class. `a - operand - borrow_in`; carry set means borrow.
pub fn sub(a: u8, operand: u8, borrow_in: bool) -> (u8, Flags) {
    // a - n - b == a + !n + !b at 8 bits; aux-carry comes from that
    // internal addition, carry is inverted into the borrow convention
    let (result, mut flags) = add(a, !operand, !borrow_in);
    flags.carry = !flags.carry;
    (result, flags)
}

/// CMP class: subtract flags without writing the accumulator back.
pub fn compare(a: u8, operand: u8) -> Flags {
    let (_, flags) = sub(a, operand, false);
    flags
}

fn logical(result: u8) -> (u8, Flags) {
    // logical ops always clear carry and aux-carry
    (result, zsp(result))
}

/// ANA class.
pub fn and(a: u8, operand: u8) -> (u8, Flags) {
    logical(a & operand)
}

/// XRA class.
pub fn xor(a: u8, operand: u8) -> (u8, Flags) {
    logical(a ^ operand)
}

/// ORA class.
pub fn or(a: u8, operand: u8) -> (u8, Flags) {
    logical(a | operand)
}

/// INR: increment with carry passed through untouched.
pub fn inr(value: u8, carry: bool) -> (u8, Flags) {
    let result = value.wrapping_add(1);
    let flags = Flags {
        carry,
        aux_carry: (value & 0x0F) + 1 > 0x0F,
        ..zsp(result)
    };
    (result, flags)
}

/// DCR: decrement with carry passed through untouched.
pub fn dcr(value: u8, carry: bool) -> (u8, Flags) {
    let result = value.wrapping_sub(1);
    let flags = Flags {
        carry,
        // internal add of 0xFF: bit-3 carry is present unless the low
        // nibble was zero
        aux_carry: (value & 0x0F) + 0x0F > 0x0F,
        ..zsp(result)
    };
    (result, flags)
}

/// DAD: 16-bit add into HL. Only the carry flag is derived here.
pub fn dad(hl: u16, operand: u16) -> (u16, bool) {
    let sum = hl as u32 + operand as u32;
    (sum as u16, sum > 0xFFFF)
}

/// DAA: two-stage BCD correction, low nibble first.
///
/// Stage one adds 6 when the low nibble exceeds 9 or aux-carry is set, and
/// aux-carry is recomputed from that addition. Stage two looks at the
/// (possibly corrected) high nibble and the incoming carry, adds 0x60 when
/// either triggers, and can only ever set carry, never clear it.
pub fn daa(a: u8, carry_in: bool, aux_carry_in: bool) -> (u8, Flags) {
    let mut result = a;
    let mut aux_carry = false;
    if a & 0x0F > 9 || aux_carry_in {
        aux_carry = (a & 0x0F) + 0x06 > 0x0F;
        result = result.wrapping_add(0x06);
    }
    let mut carry = carry_in;
    if result >> 4 > 9 || carry_in {
        let sum = result as u16 + 0x60;
        carry = carry_in || sum > 0xFF;
        result = sum as u8;
    }
    let flags = Flags {
        carry,
        aux_carry,
        ..zsp(result)
    };
    (result, flags)
}
