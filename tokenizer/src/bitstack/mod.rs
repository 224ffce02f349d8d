// SPDX-License-Identifier: Apache-2.0

/// A fixed-capacity stack of bits, one per open container.
///
/// `true` marks an object, `false` an array. Capacity is the bit width of the
/// backing integer, which is also the maximum nesting depth the tokenizer
/// accepts.
pub trait BitStack: Copy + core::fmt::Debug {
    /// Number of bits the stack can hold.
    const CAPACITY: u8;
    fn empty() -> Self;
    /// Pushes a bit onto the stack. Bits pushed beyond capacity are lost.
    fn push(&mut self, bit: bool);
    /// Pops the top bit off the stack.
    fn pop(&mut self) -> bool;
    /// Returns the top bit without removing it.
    fn top(&self) -> bool;
}

macro_rules! impl_bitstack {
    ($($int_ty:ty),*) => {
        $(
            impl BitStack for $int_ty {
                const CAPACITY: u8 = <$int_ty>::BITS as u8;

                fn empty() -> Self {
                    0
                }
                fn push(&mut self, bit: bool) {
                    *self = (*self << 1) | bit as $int_ty;
                }
                fn pop(&mut self) -> bool {
                    let bit = *self & 1 != 0;
                    *self >>= 1;
                    bit
                }
                fn top(&self) -> bool {
                    *self & 1 != 0
                }
            }
        )*
    };
}

impl_bitstack!(u8, u16, u32, u64, u128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitstack() {
        let mut bitstack = u32::empty();
        bitstack.push(true);
        bitstack.push(false);
        assert!(!bitstack.top());
        assert!(!bitstack.pop());
        assert!(bitstack.pop());
    }

    #[test]
    fn test_full_width_u8() {
        let mut bitstack = u8::empty();
        for i in 0..u8::CAPACITY {
            bitstack.push(i % 3 == 0);
        }
        for i in (0..u8::CAPACITY).rev() {
            assert_eq!(bitstack.pop(), i % 3 == 0);
        }
    }

    #[test]
    fn test_capacity_matches_width() {
        assert_eq!(u8::CAPACITY, 8);
        assert_eq!(u32::CAPACITY, 32);
        assert_eq!(u128::CAPACITY, 128);
    }
}
