//! 位图：每一位对应一个可分配单元，1 表示已分配。
//!
//! 位以 `u64` 分组，第 i 位是第 `i / 64` 组的第 `i % 64` 位；
//! 按小端序落盘时，与“第 i 位是第 `i / 8` 字节的第 `i % 8` 位”的字节位图逐字节一致。

/// 位图上的操作，由 `u64` 分组切片实现
pub trait Bitmap {
    /// 位图的总位数
    fn capacity(&self) -> usize;

    /// 首次适配：置位编号最小的空闲位并返回其编号。
    /// 若位图已满，则返回空。
    fn alloc(&mut self) -> Option<u32>;

    /// 编号须在位图范围内，越界则 panic
    fn set(&mut self, bit: u32);

    /// 越界的编号视为未分配
    fn is_set(&self, bit: u32) -> bool;

    /// 已分配的位数
    fn count_ones(&self) -> u32;
}

/// 位编号
struct BitId(u32);

impl Bitmap for [u64] {
    #[inline]
    fn capacity(&self) -> usize {
        self.len() * 64
    }

    fn alloc(&mut self) -> Option<u32> {
        // 寻找还有0的组，组内最低的0即为首个空闲位
        let (group_index, ingroup_index) = self
            .iter()
            .enumerate()
            .find_map(|(group_index, &bits)| {
                (bits != u64::MAX).then_some((group_index, bits.trailing_ones()))
            })?;

        self[group_index] |= 1 << ingroup_index;
        Some(BitId::encode(group_index, ingroup_index as usize))
    }

    fn set(&mut self, bit: u32) {
        let (group_index, ingroup_index) = BitId(bit).decode();
        self[group_index] |= 1 << ingroup_index;
    }

    fn is_set(&self, bit: u32) -> bool {
        let (group_index, ingroup_index) = BitId(bit).decode();
        self.get(group_index)
            .is_some_and(|bits| bits & (1 << ingroup_index) != 0)
    }

    fn count_ones(&self) -> u32 {
        self.iter().map(|bits| bits.count_ones()).sum()
    }
}

impl BitId {
    #[inline]
    fn encode(group_index: usize, ingroup_index: usize) -> u32 {
        (group_index * 64 + ingroup_index) as u32
    }

    #[inline]
    fn decode(self) -> (usize, usize) {
        let bit = self.0 as usize;
        (bit / 64, bit % 64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fit() {
        let mut bitmap = [0u64; 2];
        assert_eq!(bitmap.alloc(), Some(0));
        assert_eq!(bitmap.alloc(), Some(1));

        bitmap.set(3);
        assert_eq!(bitmap.alloc(), Some(2));
        assert_eq!(bitmap.alloc(), Some(4));
        assert_eq!(bitmap.count_ones(), 5);
    }

    #[test]
    fn crosses_group() {
        let mut bitmap = [u64::MAX, 0];
        assert_eq!(bitmap.alloc(), Some(64));
        assert!(bitmap.is_set(64));
        assert!(!bitmap.is_set(65));
    }

    #[test]
    fn exhausted() {
        let mut bitmap = [u64::MAX - 1];
        assert_eq!(bitmap.alloc(), Some(0));
        assert_eq!(bitmap.alloc(), None);
        assert_eq!(bitmap.count_ones(), 64);
    }

    #[test]
    fn out_of_range_is_clear() {
        let bitmap = [u64::MAX; 2];
        assert_eq!(bitmap.capacity(), 128);
        assert!(!bitmap.is_set(128));
        assert!(!bitmap.is_set(u32::MAX));
    }

    #[test]
    #[should_panic]
    fn set_out_of_range() {
        let mut bitmap = [0u64; 2];
        bitmap.set(128);
    }

    #[test]
    fn byte_order() {
        let mut bitmap = [0u64; 2];
        bitmap.set(0);
        bitmap.set(9);
        bitmap.set(71);

        let bytes: Vec<u8> = bitmap.iter().flat_map(|bits| bits.to_le_bytes()).collect();
        assert_eq!(bytes[0], 0b0000_0001);
        assert_eq!(bytes[1], 0b0000_0010);
        assert_eq!(bytes[8], 0b1000_0000);
    }
}
